use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::organization::OrganizationId;

/// Priority forced onto the builtin static knowledge entry on every pass.
pub const CONTEXT_PRIORITY_STATIC: i64 = 900;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AiContextId(pub Uuid);

impl AiContextId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AiContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    Static,
    Api,
}

impl ContextType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Api => "api",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "static" => Some(Self::Static),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

/// Named AI context artifact scoped to (organization, channel, name).
///
/// The builtin knowledge-base entry is the one artifact the seeder
/// overwrites on every pass: it tracks the deployed pack, not tenant edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiContext {
    pub id: AiContextId,
    pub organization_id: OrganizationId,
    pub channel: String,
    pub name: String,
    pub is_enabled: bool,
    pub priority: i64,
    pub context_type: ContextType,
    pub trigger_keywords: Vec<String>,
    pub static_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ContextType;

    #[test]
    fn context_type_round_trips_through_wire_form() {
        for context_type in [ContextType::Static, ContextType::Api] {
            assert_eq!(ContextType::parse(context_type.as_str()), Some(context_type));
        }
        assert_eq!(ContextType::parse("dynamic"), None);
    }
}
