//! Builtin pack reconciliation.
//!
//! Each pack entry maps to exactly one version tag per tenant. A rule that
//! exists under its tag is never touched again, so every tenant edit made
//! after seeding is permanent; re-running a pass only fills gaps. The
//! always-refreshed artifacts live in [`crate::artifacts`].

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use replykit_core::domain::organization::OrganizationId;
use replykit_core::domain::rule::{
    KeywordRule, MatchType, ReplyPayload, ResponseType, RuleId, RULE_PRIORITY_BASE,
};
use replykit_core::pack::{ContentPack, PackError};
use replykit_core::pattern::{compile_with_fragment_limit, DEFAULT_MAX_FRAGMENTS};
use replykit_db::{
    AiContextRepository, ChatbotSettingsRepository, KeywordRuleRepository,
    OrganizationRepository, RepositoryError,
};

use crate::invalidation::CacheInvalidator;

#[derive(Clone, Copy, Debug)]
pub struct SeederOptions {
    pub max_keyword_fragments: usize,
}

impl Default for SeederOptions {
    fn default() -> Self {
        Self { max_keyword_fragments: DEFAULT_MAX_FRAGMENTS }
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("load builtin pack: {0}")]
    Pack(#[from] PackError),
    #[error("list organizations: {0}")]
    ListOrganizations(#[source] RepositoryError),
    #[error(
        "seed organization {organization} (pack {pack_version}, \
         {rules_created} rules created before failure): {source}"
    )]
    Organization {
        organization: OrganizationId,
        pack_version: String,
        rules_created: usize,
        #[source]
        source: RepositoryError,
    },
}

#[derive(Debug)]
pub struct OrganizationSeedReport {
    pub organization: OrganizationId,
    pub rules_created: usize,
    pub greeting_filled: bool,
    pub knowledge_refreshed: bool,
}

#[derive(Debug)]
pub struct OrganizationFailure {
    pub organization: OrganizationId,
    pub error: SeedError,
}

#[derive(Debug, Default)]
pub struct SeedRunReport {
    pub organizations: usize,
    pub rules_created: usize,
    pub failures: Vec<OrganizationFailure>,
}

impl SeedRunReport {
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Reconciles one builtin content pack into tenant-scoped storage. Safe to
/// run at every startup and safe to run concurrently: the storage layer's
/// (organization, version tag) uniqueness turns create races into
/// already-seeded outcomes.
pub struct BuiltinSeeder {
    pub(crate) pack: ContentPack,
    pub(crate) organizations: Arc<dyn OrganizationRepository>,
    pub(crate) rules: Arc<dyn KeywordRuleRepository>,
    pub(crate) settings: Arc<dyn ChatbotSettingsRepository>,
    pub(crate) contexts: Arc<dyn AiContextRepository>,
    pub(crate) cache: Arc<dyn CacheInvalidator>,
    pub(crate) options: SeederOptions,
}

impl BuiltinSeeder {
    pub fn new(
        pack: ContentPack,
        organizations: Arc<dyn OrganizationRepository>,
        rules: Arc<dyn KeywordRuleRepository>,
        settings: Arc<dyn ChatbotSettingsRepository>,
        contexts: Arc<dyn AiContextRepository>,
        cache: Arc<dyn CacheInvalidator>,
        options: SeederOptions,
    ) -> Self {
        Self { pack, organizations, rules, settings, contexts, cache, options }
    }

    /// Construct with the advisor pack shipped in this binary.
    pub fn advisor(
        organizations: Arc<dyn OrganizationRepository>,
        rules: Arc<dyn KeywordRuleRepository>,
        settings: Arc<dyn ChatbotSettingsRepository>,
        contexts: Arc<dyn AiContextRepository>,
        cache: Arc<dyn CacheInvalidator>,
        options: SeederOptions,
    ) -> Result<Self, SeedError> {
        let pack = ContentPack::advisor()?;
        info!(
            event_name = "seed.pack.loaded",
            pack = pack.name(),
            pack_version = pack.version(),
            entries = pack.entries().len(),
            "builtin content pack loaded"
        );
        Ok(Self::new(pack, organizations, rules, settings, contexts, cache, options))
    }

    /// Seed one tenant: keyword rules, greeting default, knowledge entry,
    /// then cache invalidation. Idempotent; a second pass under the same
    /// pack version creates nothing.
    pub async fn seed_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<OrganizationSeedReport, SeedError> {
        let rules_created = self.seed_keyword_rules(organization).await?;
        let greeting_filled = self.seed_default_greeting(organization).await?;
        let knowledge_refreshed = self.seed_knowledge_context(organization).await?;

        self.cache.invalidate_keyword_rules(organization);
        self.cache.invalidate_chatbot_settings(organization);
        self.cache.invalidate_ai_context(organization);

        info!(
            event_name = "seed.organization.completed",
            organization = %organization,
            pack_version = self.pack.version(),
            rules_created,
            greeting_filled,
            knowledge_refreshed,
            "builtin content reconciled for organization"
        );

        Ok(OrganizationSeedReport {
            organization,
            rules_created,
            greeting_filled,
            knowledge_refreshed,
        })
    }

    /// Seed every known tenant. A failing tenant is reported and skipped;
    /// siblings still run.
    pub async fn seed_all_organizations(&self) -> Result<SeedRunReport, SeedError> {
        let organizations =
            self.organizations.list().await.map_err(SeedError::ListOrganizations)?;

        let mut report = SeedRunReport {
            organizations: organizations.len(),
            rules_created: 0,
            failures: Vec::new(),
        };

        for organization in organizations {
            match self.seed_organization(organization.id).await {
                Ok(organization_report) => {
                    report.rules_created += organization_report.rules_created;
                }
                Err(error) => {
                    warn!(
                        event_name = "seed.organization.failed",
                        organization = %organization.id,
                        pack_version = self.pack.version(),
                        error = %error,
                        "builtin seeding failed for organization"
                    );
                    report.failures.push(OrganizationFailure {
                        organization: organization.id,
                        error,
                    });
                }
            }
        }

        info!(
            event_name = "seed.run.completed",
            organizations = report.organizations,
            rules_created = report.rules_created,
            failures = report.failures.len(),
            "builtin seeding run finished"
        );

        Ok(report)
    }

    async fn seed_keyword_rules(
        &self,
        organization: OrganizationId,
    ) -> Result<usize, SeedError> {
        let mut rules_created = 0usize;

        for (index, entry) in self.pack.entries().iter().enumerate() {
            // Inert entries: no reply body, or no usable pattern.
            let Some(body) = self.pack.reply_body(&entry.reply_id, &entry.language) else {
                continue;
            };
            let pattern =
                compile_with_fragment_limit(&entry.keywords, self.options.max_keyword_fragments);
            if pattern.is_empty() {
                continue;
            }

            let tag = self.pack.version_tag_for_entry(index);
            let existing = self
                .rules
                .find_by_version_tag(organization, &tag)
                .await
                .map_err(|source| self.organization_error(organization, rules_created, source))?;
            if existing.is_some() {
                // Seed-once: the tenant owns this rule now, edits included.
                continue;
            }

            let now = Utc::now();
            let payload = ReplyPayload {
                body: body.to_string(),
                delay_range: entry.delay_range,
                reply_id: entry.reply_id.clone(),
                language: entry.language.clone(),
                pack: self.pack.name().to_string(),
            };
            let rule = KeywordRule {
                id: RuleId::generate(),
                organization_id: organization,
                channel: String::new(),
                name: format!(
                    "{} {} ({}) #{}",
                    self.pack.display_name(),
                    entry.reply_id.replace('_', " "),
                    entry.language,
                    index + 1
                ),
                is_enabled: true,
                priority: RULE_PRIORITY_BASE - index as i64,
                keywords: vec![pattern],
                match_type: MatchType::Regex,
                case_sensitive: false,
                response_type: ResponseType::Text,
                response_content: payload.into_content(),
                version_tag: Some(tag),
                created_at: now,
                updated_at: now,
            };

            match self.rules.create(rule).await {
                Ok(()) => rules_created += 1,
                // A concurrent pass created the same tag first; the row
                // exists, which is all this pass needs.
                Err(RepositoryError::UniqueViolation(_)) => {}
                Err(source) => {
                    return Err(self.organization_error(organization, rules_created, source));
                }
            }
        }

        Ok(rules_created)
    }

    pub(crate) fn organization_error(
        &self,
        organization: OrganizationId,
        rules_created: usize,
        source: RepositoryError,
    ) -> SeedError {
        SeedError::Organization {
            organization,
            pack_version: self.pack.version().to_string(),
            rules_created,
            source,
        }
    }
}
