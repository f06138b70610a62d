use std::sync::Arc;

use uuid::Uuid;

use replykit_core::config::{AppConfig, LoadOptions};
use replykit_core::domain::organization::OrganizationId;
use replykit_db::{
    connect_with_settings, migrations, OrganizationRepository, SqlAiContextRepository,
    SqlChatbotSettingsRepository, SqlKeywordRuleRepository, SqlOrganizationRepository,
};
use replykit_seeder::{BuiltinSeeder, SeederOptions, TracingCacheInvalidator};

use crate::commands::{init_logging, CommandResult};

pub fn run(organization: Option<String>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_logging(&config);

    let target = match organization.as_deref().map(parse_organization_id).transpose() {
        Ok(target) => target,
        Err(error) => {
            return CommandResult::failure("seed", "invalid_argument", error, 2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let organizations = Arc::new(SqlOrganizationRepository::new(pool.clone()));
        let seeder = BuiltinSeeder::advisor(
            organizations.clone(),
            Arc::new(SqlKeywordRuleRepository::new(pool.clone())),
            Arc::new(SqlChatbotSettingsRepository::new(pool.clone())),
            Arc::new(SqlAiContextRepository::new(pool.clone())),
            Arc::new(TracingCacheInvalidator),
            SeederOptions { max_keyword_fragments: config.seeder.max_keyword_fragments },
        )
        .map_err(|error| ("pack_load", error.to_string(), 5u8))?;

        let outcome = match target {
            Some(organization_id) => {
                let known = organizations
                    .find_by_id(organization_id)
                    .await
                    .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
                if known.is_none() {
                    return Err((
                        "unknown_organization",
                        format!("organization {organization_id} does not exist"),
                        6u8,
                    ));
                }

                let report = seeder
                    .seed_organization(organization_id)
                    .await
                    .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
                format!(
                    "seeded organization {}: {} rules created, greeting {}, knowledge {}",
                    report.organization,
                    report.rules_created,
                    if report.greeting_filled { "filled" } else { "kept" },
                    if report.knowledge_refreshed { "refreshed" } else { "skipped" },
                )
            }
            None => {
                let report = seeder
                    .seed_all_organizations()
                    .await
                    .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

                if !report.all_succeeded() {
                    let failed = report
                        .failures
                        .iter()
                        .map(|failure| format!("{}: {}", failure.organization, failure.error))
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err((
                        "seed_partial_failure",
                        format!(
                            "seeded {} rules across {} organizations, but {} failed ({failed})",
                            report.rules_created,
                            report.organizations - report.failures.len(),
                            report.failures.len(),
                        ),
                        6u8,
                    ));
                }

                format!(
                    "seeded {} organizations, {} rules created",
                    report.organizations, report.rules_created
                )
            }
        };

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(outcome)
    });

    match result {
        Ok(message) => CommandResult::success("seed", message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn parse_organization_id(raw: &str) -> Result<OrganizationId, String> {
    Uuid::parse_str(raw.trim())
        .map(OrganizationId)
        .map_err(|_| format!("`{raw}` is not a valid organization id (expected a UUID)"))
}
