use sqlx::{sqlite::SqliteRow, Row};

use replykit_core::domain::organization::OrganizationId;
use replykit_core::domain::rule::{KeywordRule, MatchType, ResponseType, RuleId, VersionTag};

use super::row::{parse_json, parse_string_list, parse_timestamp, parse_uuid};
use super::{KeywordRuleRepository, RepositoryError};
use crate::DbPool;

const RULE_COLUMNS: &str = "id, organization_id, channel, name, is_enabled, priority, \
     keywords_json, match_type, case_sensitive, response_type, response_content_json, \
     version_tag, created_at, updated_at";

pub struct SqlKeywordRuleRepository {
    pool: DbPool,
}

impl SqlKeywordRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl KeywordRuleRepository for SqlKeywordRuleRepository {
    async fn find_by_version_tag(
        &self,
        organization: OrganizationId,
        tag: &VersionTag,
    ) -> Result<Option<KeywordRule>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM keyword_rules
             WHERE organization_id = ? AND version_tag = ?"
        ))
        .bind(organization.0.to_string())
        .bind(tag.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(rule_from_row).transpose()
    }

    async fn find_by_id(&self, id: RuleId) -> Result<Option<KeywordRule>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {RULE_COLUMNS} FROM keyword_rules WHERE id = ?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(rule_from_row).transpose()
    }

    async fn list_for_organization(
        &self,
        organization: OrganizationId,
    ) -> Result<Vec<KeywordRule>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM keyword_rules
             WHERE organization_id = ?
             ORDER BY priority DESC, created_at ASC"
        ))
        .bind(organization.0.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(rule_from_row).collect()
    }

    async fn create(&self, rule: KeywordRule) -> Result<(), RepositoryError> {
        let keywords_json = serde_json::to_string(&rule.keywords)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let response_content_json = serde_json::to_string(&rule.response_content)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO keyword_rules (
                id, organization_id, channel, name, is_enabled, priority,
                keywords_json, match_type, case_sensitive, response_type,
                response_content_json, version_tag, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rule.id.0.to_string())
        .bind(rule.organization_id.0.to_string())
        .bind(&rule.channel)
        .bind(&rule.name)
        .bind(rule.is_enabled)
        .bind(rule.priority)
        .bind(keywords_json)
        .bind(rule.match_type.as_str())
        .bind(rule.case_sensitive)
        .bind(rule.response_type.as_str())
        .bind(response_content_json)
        .bind(rule.version_tag.as_ref().map(VersionTag::as_str))
        .bind(rule.created_at.to_rfc3339())
        .bind(rule.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, rule: KeywordRule) -> Result<(), RepositoryError> {
        let keywords_json = serde_json::to_string(&rule.keywords)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        let response_content_json = serde_json::to_string(&rule.response_content)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "UPDATE keyword_rules SET
                channel = ?,
                name = ?,
                is_enabled = ?,
                priority = ?,
                keywords_json = ?,
                match_type = ?,
                case_sensitive = ?,
                response_type = ?,
                response_content_json = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&rule.channel)
        .bind(&rule.name)
        .bind(rule.is_enabled)
        .bind(rule.priority)
        .bind(keywords_json)
        .bind(rule.match_type.as_str())
        .bind(rule.case_sensitive)
        .bind(rule.response_type.as_str())
        .bind(response_content_json)
        .bind(rule.updated_at.to_rfc3339())
        .bind(rule.id.0.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn rule_from_row(row: SqliteRow) -> Result<KeywordRule, RepositoryError> {
    let match_type_raw = row.try_get::<String, _>("match_type")?;
    let match_type = MatchType::parse(&match_type_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown match type `{match_type_raw}`")))?;

    let response_type_raw = row.try_get::<String, _>("response_type")?;
    let response_type = ResponseType::parse(&response_type_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown response type `{response_type_raw}`"))
    })?;

    Ok(KeywordRule {
        id: RuleId(parse_uuid("id", row.try_get("id")?)?),
        organization_id: OrganizationId(parse_uuid(
            "organization_id",
            row.try_get("organization_id")?,
        )?),
        channel: row.try_get("channel")?,
        name: row.try_get("name")?,
        is_enabled: row.try_get("is_enabled")?,
        priority: row.try_get("priority")?,
        keywords: parse_string_list("keywords_json", row.try_get("keywords_json")?)?,
        match_type,
        case_sensitive: row.try_get("case_sensitive")?,
        response_type,
        response_content: parse_json(
            "response_content_json",
            row.try_get("response_content_json")?,
        )?,
        version_tag: row.try_get::<Option<String>, _>("version_tag")?.map(VersionTag),
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}
