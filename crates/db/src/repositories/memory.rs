//! In-memory repository doubles mirroring the SQL schema's constraints,
//! used by seeder unit tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use replykit_core::domain::context::AiContext;
use replykit_core::domain::organization::{Organization, OrganizationId};
use replykit_core::domain::rule::{KeywordRule, RuleId, VersionTag};
use replykit_core::domain::settings::{ChatbotSettings, SettingsId};

use super::{
    AiContextRepository, ChatbotSettingsRepository, KeywordRuleRepository,
    OrganizationRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryOrganizationRepository {
    organizations: RwLock<Vec<Organization>>,
}

#[async_trait::async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn list(&self) -> Result<Vec<Organization>, RepositoryError> {
        Ok(self.organizations.read().await.clone())
    }

    async fn find_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        let organizations = self.organizations.read().await;
        Ok(organizations.iter().find(|organization| organization.id == id).cloned())
    }

    async fn create(&self, organization: Organization) -> Result<(), RepositoryError> {
        let mut organizations = self.organizations.write().await;
        if organizations.iter().any(|existing| existing.id == organization.id) {
            return Err(RepositoryError::UniqueViolation(format!(
                "organizations.id `{}`",
                organization.id
            )));
        }
        organizations.push(organization);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryKeywordRuleRepository {
    rules: RwLock<HashMap<RuleId, KeywordRule>>,
}

impl InMemoryKeywordRuleRepository {
    pub async fn all(&self) -> Vec<KeywordRule> {
        self.rules.read().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl KeywordRuleRepository for InMemoryKeywordRuleRepository {
    async fn find_by_version_tag(
        &self,
        organization: OrganizationId,
        tag: &VersionTag,
    ) -> Result<Option<KeywordRule>, RepositoryError> {
        let rules = self.rules.read().await;
        Ok(rules
            .values()
            .find(|rule| {
                rule.organization_id == organization && rule.version_tag.as_ref() == Some(tag)
            })
            .cloned())
    }

    async fn find_by_id(&self, id: RuleId) -> Result<Option<KeywordRule>, RepositoryError> {
        Ok(self.rules.read().await.get(&id).cloned())
    }

    async fn list_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<KeywordRule>, RepositoryError> {
        let rules = self.rules.read().await;
        let mut matching: Vec<KeywordRule> =
            rules.values().filter(|rule| rule.organization_id == organization).cloned().collect();
        matching.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.created_at.cmp(&b.created_at)));
        Ok(matching)
    }

    async fn create(&self, rule: KeywordRule) -> Result<(), RepositoryError> {
        let mut rules = self.rules.write().await;
        if let Some(tag) = &rule.version_tag {
            let duplicate = rules.values().any(|existing| {
                existing.organization_id == rule.organization_id
                    && existing.version_tag.as_ref() == Some(tag)
            });
            if duplicate {
                return Err(RepositoryError::UniqueViolation(format!(
                    "keyword_rules (organization_id, version_tag) `{tag}`"
                )));
            }
        }
        rules.insert(rule.id, rule);
        Ok(())
    }

    async fn update(&self, rule: KeywordRule) -> Result<(), RepositoryError> {
        let mut rules = self.rules.write().await;
        rules.insert(rule.id, rule);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChatbotSettingsRepository {
    settings: RwLock<Vec<ChatbotSettings>>,
}

#[async_trait::async_trait]
impl ChatbotSettingsRepository for InMemoryChatbotSettingsRepository {
    async fn find(
        &self,
        organization: OrganizationId,
        channel: &str,
    ) -> Result<Option<ChatbotSettings>, RepositoryError> {
        let settings = self.settings.read().await;
        Ok(settings
            .iter()
            .find(|entry| entry.organization_id == organization && entry.channel == channel)
            .cloned())
    }

    async fn create(&self, new_settings: ChatbotSettings) -> Result<(), RepositoryError> {
        let mut settings = self.settings.write().await;
        let duplicate = settings.iter().any(|entry| {
            entry.organization_id == new_settings.organization_id
                && entry.channel == new_settings.channel
        });
        if duplicate {
            return Err(RepositoryError::UniqueViolation(
                "chatbot_settings (organization_id, channel)".to_string(),
            ));
        }
        settings.push(new_settings);
        Ok(())
    }

    async fn set_default_response(
        &self,
        id: SettingsId,
        default_response: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut settings = self.settings.write().await;
        if let Some(entry) = settings.iter_mut().find(|entry| entry.id == id) {
            entry.default_response = default_response.to_string();
            entry.updated_at = updated_at;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAiContextRepository {
    contexts: RwLock<Vec<AiContext>>,
}

#[async_trait::async_trait]
impl AiContextRepository for InMemoryAiContextRepository {
    async fn find_by_name(
        &self,
        organization: OrganizationId,
        channel: &str,
        name: &str,
    ) -> Result<Option<AiContext>, RepositoryError> {
        let contexts = self.contexts.read().await;
        Ok(contexts
            .iter()
            .find(|context| {
                context.organization_id == organization
                    && context.channel == channel
                    && context.name == name
            })
            .cloned())
    }

    async fn create(&self, new_context: AiContext) -> Result<(), RepositoryError> {
        let mut contexts = self.contexts.write().await;
        let duplicate = contexts.iter().any(|context| {
            context.organization_id == new_context.organization_id
                && context.channel == new_context.channel
                && context.name == new_context.name
        });
        if duplicate {
            return Err(RepositoryError::UniqueViolation(
                "ai_contexts (organization_id, channel, name)".to_string(),
            ));
        }
        contexts.push(new_context);
        Ok(())
    }

    async fn overwrite(&self, updated: AiContext) -> Result<(), RepositoryError> {
        let mut contexts = self.contexts.write().await;
        if let Some(context) = contexts.iter_mut().find(|context| context.id == updated.id) {
            context.is_enabled = updated.is_enabled;
            context.priority = updated.priority;
            context.context_type = updated.context_type;
            context.trigger_keywords = updated.trigger_keywords;
            context.static_content = updated.static_content;
            context.updated_at = updated.updated_at;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use replykit_core::domain::organization::{Organization, OrganizationId};
    use replykit_core::domain::rule::{KeywordRule, MatchType, ResponseType, RuleId, VersionTag};

    use super::{InMemoryKeywordRuleRepository, InMemoryOrganizationRepository};
    use crate::repositories::{KeywordRuleRepository, OrganizationRepository, RepositoryError};

    fn tagged_rule(organization: OrganizationId, tag: &str) -> KeywordRule {
        KeywordRule {
            id: RuleId::generate(),
            organization_id: organization,
            channel: String::new(),
            name: "Advisor welcome info (en) #1".to_string(),
            is_enabled: true,
            priority: 1000,
            keywords: vec!["(?i)(info)".to_string()],
            match_type: MatchType::Regex,
            case_sensitive: false,
            response_type: ResponseType::Text,
            response_content: json!({"body": "Advisor is..."}),
            version_tag: Some(VersionTag(tag.to_string())),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_rule_repo_enforces_the_version_tag_constraint() {
        let repo = InMemoryKeywordRuleRepository::default();
        let organization = OrganizationId::generate();

        let rule = tagged_rule(organization, "builtin:advisor:keywords:v1:001");
        repo.create(rule.clone()).await.expect("first create");

        let error = repo
            .create(tagged_rule(organization, "builtin:advisor:keywords:v1:001"))
            .await
            .expect_err("duplicate tag must fail");
        assert!(matches!(error, RepositoryError::UniqueViolation(_)));

        // Same tag under a different organization is fine.
        repo.create(tagged_rule(OrganizationId::generate(), "builtin:advisor:keywords:v1:001"))
            .await
            .expect("other organization");

        let found = repo
            .find_by_version_tag(organization, &VersionTag("builtin:advisor:keywords:v1:001".to_string()))
            .await
            .expect("find by tag");
        assert_eq!(found, Some(rule));
    }

    #[tokio::test]
    async fn in_memory_organization_repo_round_trip() {
        let repo = InMemoryOrganizationRepository::default();
        let organization = Organization {
            id: OrganizationId::generate(),
            name: "Acme".to_string(),
            created_at: Utc::now(),
        };

        repo.create(organization.clone()).await.expect("create organization");
        let found = repo.find_by_id(organization.id).await.expect("find organization");
        assert_eq!(found, Some(organization.clone()));
        assert_eq!(repo.list().await.expect("list"), vec![organization]);
    }
}
