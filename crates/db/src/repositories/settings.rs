use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use replykit_core::domain::organization::OrganizationId;
use replykit_core::domain::settings::{ChatbotSettings, SettingsId};

use super::row::{parse_timestamp, parse_u32, parse_uuid};
use super::{ChatbotSettingsRepository, RepositoryError};
use crate::DbPool;

pub struct SqlChatbotSettingsRepository {
    pool: DbPool,
}

impl SqlChatbotSettingsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ChatbotSettingsRepository for SqlChatbotSettingsRepository {
    async fn find(
        &self,
        organization: OrganizationId,
        channel: &str,
    ) -> Result<Option<ChatbotSettings>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, organization_id, channel, is_enabled, session_timeout_minutes,
                    default_response, created_at, updated_at
             FROM chatbot_settings
             WHERE organization_id = ? AND channel = ?",
        )
        .bind(organization.0.to_string())
        .bind(channel)
        .fetch_optional(&self.pool)
        .await?;

        row.map(settings_from_row).transpose()
    }

    async fn create(&self, settings: ChatbotSettings) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO chatbot_settings (
                id, organization_id, channel, is_enabled, session_timeout_minutes,
                default_response, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(settings.id.0.to_string())
        .bind(settings.organization_id.0.to_string())
        .bind(&settings.channel)
        .bind(settings.is_enabled)
        .bind(i64::from(settings.session_timeout_minutes))
        .bind(&settings.default_response)
        .bind(settings.created_at.to_rfc3339())
        .bind(settings.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_default_response(
        &self,
        id: SettingsId,
        default_response: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE chatbot_settings SET default_response = ?, updated_at = ? WHERE id = ?",
        )
        .bind(default_response)
        .bind(updated_at.to_rfc3339())
        .bind(id.0.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn settings_from_row(row: SqliteRow) -> Result<ChatbotSettings, RepositoryError> {
    Ok(ChatbotSettings {
        id: SettingsId(parse_uuid("id", row.try_get("id")?)?),
        organization_id: OrganizationId(parse_uuid(
            "organization_id",
            row.try_get("organization_id")?,
        )?),
        channel: row.try_get("channel")?,
        is_enabled: row.try_get("is_enabled")?,
        session_timeout_minutes: parse_u32(
            "session_timeout_minutes",
            row.try_get("session_timeout_minutes")?,
        )?,
        default_response: row.try_get("default_response")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use replykit_core::domain::organization::OrganizationId;
    use replykit_core::domain::settings::{ChatbotSettings, SettingsId};

    use super::SqlChatbotSettingsRepository;
    use crate::repositories::{ChatbotSettingsRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool_with_org(organization: OrganizationId) -> DbPool {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");

        sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES (?, 'Test Org', ?)")
            .bind(organization.0.to_string())
            .bind("2026-03-01T08:00:00Z")
            .execute(&pool)
            .await
            .expect("insert organization");

        pool
    }

    fn parse_ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).expect("valid rfc3339").with_timezone(&Utc)
    }

    fn default_scope_settings(organization: OrganizationId) -> ChatbotSettings {
        ChatbotSettings {
            id: SettingsId::generate(),
            organization_id: organization,
            channel: String::new(),
            is_enabled: false,
            session_timeout_minutes: 30,
            default_response: String::new(),
            created_at: parse_ts("2026-03-01T09:00:00Z"),
            updated_at: parse_ts("2026-03-01T09:00:00Z"),
        }
    }

    #[tokio::test]
    async fn round_trips_the_channel_unscoped_singleton() {
        let organization = OrganizationId::generate();
        let pool = setup_pool_with_org(organization).await;
        let repo = SqlChatbotSettingsRepository::new(pool.clone());

        assert_eq!(repo.find(organization, "").await.expect("find"), None);

        let settings = default_scope_settings(organization);
        repo.create(settings.clone()).await.expect("create settings");

        let found = repo.find(organization, "").await.expect("find again");
        assert_eq!(found, Some(settings));

        pool.close().await;
    }

    #[tokio::test]
    async fn one_singleton_per_channel_scope() {
        let organization = OrganizationId::generate();
        let pool = setup_pool_with_org(organization).await;
        let repo = SqlChatbotSettingsRepository::new(pool.clone());

        repo.create(default_scope_settings(organization)).await.expect("first create");
        let error = repo
            .create(default_scope_settings(organization))
            .await
            .expect_err("same scope must fail");
        assert!(matches!(error, RepositoryError::UniqueViolation(_)));

        pool.close().await;
    }

    #[tokio::test]
    async fn set_default_response_updates_only_that_field() {
        let organization = OrganizationId::generate();
        let pool = setup_pool_with_org(organization).await;
        let repo = SqlChatbotSettingsRepository::new(pool.clone());

        let settings = default_scope_settings(organization);
        repo.create(settings.clone()).await.expect("create settings");

        let later = parse_ts("2026-03-02T09:00:00Z");
        repo.set_default_response(settings.id, "Hello from Advisor", later)
            .await
            .expect("set default response");

        let found = repo.find(organization, "").await.expect("find").expect("settings exist");
        assert_eq!(found.default_response, "Hello from Advisor");
        assert_eq!(found.updated_at, later);
        assert_eq!(found.session_timeout_minutes, settings.session_timeout_minutes);
        assert_eq!(found.is_enabled, settings.is_enabled);

        pool.close().await;
    }
}
