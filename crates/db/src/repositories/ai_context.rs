use sqlx::{sqlite::SqliteRow, Row};

use replykit_core::domain::context::{AiContext, AiContextId, ContextType};
use replykit_core::domain::organization::OrganizationId;

use super::row::{parse_string_list, parse_timestamp, parse_uuid};
use super::{AiContextRepository, RepositoryError};
use crate::DbPool;

pub struct SqlAiContextRepository {
    pool: DbPool,
}

impl SqlAiContextRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AiContextRepository for SqlAiContextRepository {
    async fn find_by_name(
        &self,
        organization: OrganizationId,
        channel: &str,
        name: &str,
    ) -> Result<Option<AiContext>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, organization_id, channel, name, is_enabled, priority, context_type,
                    trigger_keywords_json, static_content, created_at, updated_at
             FROM ai_contexts
             WHERE organization_id = ? AND channel = ? AND name = ?",
        )
        .bind(organization.0.to_string())
        .bind(channel)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(context_from_row).transpose()
    }

    async fn create(&self, context: AiContext) -> Result<(), RepositoryError> {
        let trigger_keywords_json = serde_json::to_string(&context.trigger_keywords)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO ai_contexts (
                id, organization_id, channel, name, is_enabled, priority, context_type,
                trigger_keywords_json, static_content, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(context.id.0.to_string())
        .bind(context.organization_id.0.to_string())
        .bind(&context.channel)
        .bind(&context.name)
        .bind(context.is_enabled)
        .bind(context.priority)
        .bind(context.context_type.as_str())
        .bind(trigger_keywords_json)
        .bind(&context.static_content)
        .bind(context.created_at.to_rfc3339())
        .bind(context.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn overwrite(&self, context: AiContext) -> Result<(), RepositoryError> {
        let trigger_keywords_json = serde_json::to_string(&context.trigger_keywords)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "UPDATE ai_contexts SET
                is_enabled = ?,
                priority = ?,
                context_type = ?,
                trigger_keywords_json = ?,
                static_content = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(context.is_enabled)
        .bind(context.priority)
        .bind(context.context_type.as_str())
        .bind(trigger_keywords_json)
        .bind(&context.static_content)
        .bind(context.updated_at.to_rfc3339())
        .bind(context.id.0.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn context_from_row(row: SqliteRow) -> Result<AiContext, RepositoryError> {
    let context_type_raw = row.try_get::<String, _>("context_type")?;
    let context_type = ContextType::parse(&context_type_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown context type `{context_type_raw}`"))
    })?;

    Ok(AiContext {
        id: AiContextId(parse_uuid("id", row.try_get("id")?)?),
        organization_id: OrganizationId(parse_uuid(
            "organization_id",
            row.try_get("organization_id")?,
        )?),
        channel: row.try_get("channel")?,
        name: row.try_get("name")?,
        is_enabled: row.try_get("is_enabled")?,
        priority: row.try_get("priority")?,
        context_type,
        trigger_keywords: parse_string_list(
            "trigger_keywords_json",
            row.try_get("trigger_keywords_json")?,
        )?,
        static_content: row.try_get("static_content")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}
