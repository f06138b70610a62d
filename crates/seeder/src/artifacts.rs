//! Ancillary singleton artifacts seeded alongside the keyword rules.
//!
//! Two reconciliation policies live here. The greeting default is
//! create-if-absent and fills only a blank `default_response` (a blank
//! value is indistinguishable from never-set and gets refilled). The
//! knowledge entry is force-overwritten on every pass: it is canonical
//! reference material that tracks the deployed pack, not tenant state.

use chrono::Utc;

use replykit_core::domain::context::{AiContext, AiContextId, ContextType, CONTEXT_PRIORITY_STATIC};
use replykit_core::domain::organization::OrganizationId;
use replykit_core::domain::settings::{ChatbotSettings, SettingsId, DEFAULT_SESSION_TIMEOUT_MINUTES};

use crate::reconcile::{BuiltinSeeder, SeedError};

impl BuiltinSeeder {
    /// Returns `true` when the greeting text was written this pass.
    pub(crate) async fn seed_default_greeting(
        &self,
        organization: OrganizationId,
    ) -> Result<bool, SeedError> {
        let existing = self
            .settings
            .find(organization, "")
            .await
            .map_err(|source| self.organization_error(organization, 0, source))?;

        let settings = match existing {
            Some(settings) => settings,
            None => {
                let now = Utc::now();
                let settings = ChatbotSettings {
                    id: SettingsId::generate(),
                    organization_id: organization,
                    channel: String::new(),
                    is_enabled: false,
                    session_timeout_minutes: DEFAULT_SESSION_TIMEOUT_MINUTES,
                    default_response: String::new(),
                    created_at: now,
                    updated_at: now,
                };
                self.settings
                    .create(settings.clone())
                    .await
                    .map_err(|source| self.organization_error(organization, 0, source))?;
                settings
            }
        };

        if !settings.default_response.trim().is_empty() {
            return Ok(false);
        }

        self.settings
            .set_default_response(settings.id, self.pack.greeting(), Utc::now())
            .await
            .map_err(|source| self.organization_error(organization, 0, source))?;

        Ok(true)
    }

    /// Returns `true` when the knowledge entry was written (it always is,
    /// unless the pack ships no knowledge content).
    pub(crate) async fn seed_knowledge_context(
        &self,
        organization: OrganizationId,
    ) -> Result<bool, SeedError> {
        let content = self.pack.knowledge().trim();
        if content.is_empty() {
            return Ok(false);
        }

        let name = self.pack.knowledge_name();
        let existing = self
            .contexts
            .find_by_name(organization, "", &name)
            .await
            .map_err(|source| self.organization_error(organization, 0, source))?;

        let now = Utc::now();
        match existing {
            Some(context) => {
                let canonical = AiContext {
                    is_enabled: true,
                    priority: CONTEXT_PRIORITY_STATIC,
                    context_type: ContextType::Static,
                    trigger_keywords: Vec::new(),
                    static_content: content.to_string(),
                    updated_at: now,
                    ..context
                };
                self.contexts
                    .overwrite(canonical)
                    .await
                    .map_err(|source| self.organization_error(organization, 0, source))?;
            }
            None => {
                let context = AiContext {
                    id: AiContextId::generate(),
                    organization_id: organization,
                    channel: String::new(),
                    name,
                    is_enabled: true,
                    priority: CONTEXT_PRIORITY_STATIC,
                    context_type: ContextType::Static,
                    trigger_keywords: Vec::new(),
                    static_content: content.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                self.contexts
                    .create(context)
                    .await
                    .map_err(|source| self.organization_error(organization, 0, source))?;
            }
        }

        Ok(true)
    }
}
