use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use replykit_core::domain::context::AiContext;
use replykit_core::domain::organization::{Organization, OrganizationId};
use replykit_core::domain::rule::{KeywordRule, RuleId, VersionTag};
use replykit_core::domain::settings::{ChatbotSettings, SettingsId};

pub mod ai_context;
pub mod keyword_rule;
pub mod memory;
pub mod organization;
pub(crate) mod row;
pub mod settings;

pub use ai_context::SqlAiContextRepository;
pub use keyword_rule::SqlKeywordRuleRepository;
pub use memory::{
    InMemoryAiContextRepository, InMemoryChatbotSettingsRepository, InMemoryKeywordRuleRepository,
    InMemoryOrganizationRepository,
};
pub use organization::SqlOrganizationRepository;
pub use settings::SqlChatbotSettingsRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(database_error) = &error {
            if database_error.is_unique_violation() {
                return Self::UniqueViolation(database_error.message().to_string());
            }
        }
        Self::Database(error)
    }
}

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Organization>, RepositoryError>;
    async fn find_by_id(&self, id: OrganizationId)
        -> Result<Option<Organization>, RepositoryError>;
    async fn create(&self, organization: Organization) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait KeywordRuleRepository: Send + Sync {
    /// Version-tag lookup is the entire idempotence check for seeding:
    /// `Some` means the entry was seeded before and must not be touched.
    async fn find_by_version_tag(
        &self,
        organization: OrganizationId,
        tag: &VersionTag,
    ) -> Result<Option<KeywordRule>, RepositoryError>;

    async fn find_by_id(&self, id: RuleId) -> Result<Option<KeywordRule>, RepositoryError>;

    async fn list_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<KeywordRule>, RepositoryError>;

    /// Fails with [`RepositoryError::UniqueViolation`] when a rule with the
    /// same (organization, version tag) already exists.
    async fn create(&self, rule: KeywordRule) -> Result<(), RepositoryError>;

    /// Full-row update; used by tenant edit flows, never by the seeder.
    async fn update(&self, rule: KeywordRule) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ChatbotSettingsRepository: Send + Sync {
    async fn find(
        &self,
        organization: OrganizationId,
        channel: &str,
    ) -> Result<Option<ChatbotSettings>, RepositoryError>;

    async fn create(&self, settings: ChatbotSettings) -> Result<(), RepositoryError>;

    async fn set_default_response(
        &self,
        id: SettingsId,
        default_response: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AiContextRepository: Send + Sync {
    async fn find_by_name(
        &self,
        organization: OrganizationId,
        channel: &str,
        name: &str,
    ) -> Result<Option<AiContext>, RepositoryError>;

    async fn create(&self, context: AiContext) -> Result<(), RepositoryError>;

    /// Replace every mutable field of the row identified by `context.id`.
    async fn overwrite(&self, context: AiContext) -> Result<(), RepositoryError>;
}
