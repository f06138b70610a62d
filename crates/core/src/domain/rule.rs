use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::organization::OrganizationId;
use crate::pack::DelayRange;

/// Priority assigned to the first builtin rule of a pack; entry `i` gets
/// `RULE_PRIORITY_BASE - i`. The base is reserved well above tenant-authored
/// priorities so a pack bump never forces renumbering of tenant rules.
pub const RULE_PRIORITY_BASE: i64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub Uuid);

impl RuleId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Stable reconciliation key for a seeded rule: `<pack-version>:<sequence>`,
/// sequence 1-based and zero-padded to three digits. Unique per (tenant,
/// pack version, sequence) and never reused for a different logical entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionTag(pub String);

impl VersionTag {
    pub fn new(pack_version: &str, sequence: usize) -> Self {
        Self(format!("{pack_version}:{sequence:03}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Regex,
    Contains,
    Exact,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Contains => "contains",
            Self::Exact => "exact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "regex" => Some(Self::Regex),
            "contains" => Some(Self::Contains),
            "exact" => Some(Self::Exact),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Text,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Structured response payload a seeded rule carries; stored as the rule's
/// `response_content` JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub body: String,
    pub delay_range: DelayRange,
    pub reply_id: String,
    pub language: String,
    pub pack: String,
}

impl ReplyPayload {
    /// Render the payload as `response_content` JSON.
    pub fn into_content(self) -> serde_json::Value {
        serde_json::json!({
            "body": self.body,
            "delay_range": { "min": self.delay_range.min, "max": self.delay_range.max },
            "reply_id": self.reply_id,
            "language": self.language,
            "pack": self.pack,
        })
    }
}

/// Tenant-owned auto-reply rule. Seeded rules carry a [`VersionTag`];
/// everything else about them is mutable by the tenant after creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub id: RuleId,
    pub organization_id: OrganizationId,
    /// Empty string scopes the rule to every channel of the tenant.
    pub channel: String,
    pub name: String,
    pub is_enabled: bool,
    pub priority: i64,
    pub keywords: Vec<String>,
    pub match_type: MatchType,
    pub case_sensitive: bool,
    pub response_type: ResponseType,
    pub response_content: serde_json::Value,
    pub version_tag: Option<VersionTag>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
