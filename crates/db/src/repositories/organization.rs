use sqlx::{sqlite::SqliteRow, Row};

use replykit_core::domain::organization::{Organization, OrganizationId};

use super::row::{parse_timestamp, parse_uuid};
use super::{OrganizationRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrganizationRepository {
    pool: DbPool,
}

impl SqlOrganizationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl OrganizationRepository for SqlOrganizationRepository {
    async fn list(&self) -> Result<Vec<Organization>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, created_at FROM organizations ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(organization_from_row).collect()
    }

    async fn find_by_id(
        &self,
        id: OrganizationId,
    ) -> Result<Option<Organization>, RepositoryError> {
        let row = sqlx::query("SELECT id, name, created_at FROM organizations WHERE id = ?")
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(organization_from_row).transpose()
    }

    async fn create(&self, organization: Organization) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO organizations (id, name, created_at) VALUES (?, ?, ?)")
            .bind(organization.id.0.to_string())
            .bind(&organization.name)
            .bind(organization.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn organization_from_row(row: SqliteRow) -> Result<Organization, RepositoryError> {
    Ok(Organization {
        id: OrganizationId(parse_uuid("id", row.try_get("id")?)?),
        name: row.try_get("name")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use replykit_core::domain::organization::{Organization, OrganizationId};

    use super::SqlOrganizationRepository;
    use crate::repositories::{OrganizationRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup_pool() -> DbPool {
        let pool =
            connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }

    fn parse_ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).expect("valid rfc3339").with_timezone(&Utc)
    }

    #[tokio::test]
    async fn round_trips_and_lists_in_creation_order() {
        let pool = setup_pool().await;
        let repo = SqlOrganizationRepository::new(pool.clone());

        let first = Organization {
            id: OrganizationId::generate(),
            name: "Acme Telecom".to_string(),
            created_at: parse_ts("2026-03-01T08:00:00Z"),
        };
        let second = Organization {
            id: OrganizationId::generate(),
            name: "Globex Retail".to_string(),
            created_at: parse_ts("2026-03-02T08:00:00Z"),
        };

        repo.create(second.clone()).await.expect("create second");
        repo.create(first.clone()).await.expect("create first");

        let found = repo.find_by_id(first.id).await.expect("find first");
        assert_eq!(found, Some(first.clone()));

        let listed = repo.list().await.expect("list organizations");
        assert_eq!(listed, vec![first, second]);

        pool.close().await;
    }

    #[tokio::test]
    async fn duplicate_id_is_a_unique_violation() {
        let pool = setup_pool().await;
        let repo = SqlOrganizationRepository::new(pool.clone());

        let organization = Organization {
            id: OrganizationId::generate(),
            name: "Acme".to_string(),
            created_at: parse_ts("2026-03-01T08:00:00Z"),
        };

        repo.create(organization.clone()).await.expect("first create");
        let error = repo.create(organization).await.expect_err("second create must fail");
        assert!(matches!(error, RepositoryError::UniqueViolation(_)));

        pool.close().await;
    }
}
