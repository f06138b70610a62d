use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::organization::OrganizationId;

/// Session timeout applied when settings are created by the seeder.
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u32 = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SettingsId(pub Uuid);

impl SettingsId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SettingsId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Per (organization, channel) chatbot settings singleton. The seeder only
/// ever touches the channel-unscoped row (`channel == ""`).
///
/// `default_response == ""` is read as "never set": the greeting seeder will
/// fill it, including after a tenant explicitly clears it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatbotSettings {
    pub id: SettingsId,
    pub organization_id: OrganizationId,
    pub channel: String,
    pub is_enabled: bool,
    pub session_timeout_minutes: u32,
    pub default_response: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
