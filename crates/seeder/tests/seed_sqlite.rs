//! End-to-end seeding contract against real SQLite storage: the advisor
//! pack seeds once, re-runs create nothing, tenant edits stick, and the
//! knowledge artifact snaps back to canonical on every pass.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;

use replykit_core::domain::organization::{Organization, OrganizationId};
use replykit_core::domain::settings::DEFAULT_SESSION_TIMEOUT_MINUTES;
use replykit_core::pack::ContentPack;
use replykit_db::{
    connect_with_settings, migrations, AiContextRepository, ChatbotSettingsRepository,
    DbPool, KeywordRuleRepository, OrganizationRepository, SqlAiContextRepository,
    SqlChatbotSettingsRepository, SqlKeywordRuleRepository, SqlOrganizationRepository,
};
use replykit_seeder::{BuiltinSeeder, NoopCacheInvalidator, SeederOptions};

struct Harness {
    pool: DbPool,
    organizations: Arc<SqlOrganizationRepository>,
    rules: Arc<SqlKeywordRuleRepository>,
    settings: Arc<SqlChatbotSettingsRepository>,
    contexts: Arc<SqlAiContextRepository>,
    seeder: BuiltinSeeder,
}

async fn harness() -> Harness {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("run migrations");

    let organizations = Arc::new(SqlOrganizationRepository::new(pool.clone()));
    let rules = Arc::new(SqlKeywordRuleRepository::new(pool.clone()));
    let settings = Arc::new(SqlChatbotSettingsRepository::new(pool.clone()));
    let contexts = Arc::new(SqlAiContextRepository::new(pool.clone()));

    let seeder = BuiltinSeeder::advisor(
        organizations.clone(),
        rules.clone(),
        settings.clone(),
        contexts.clone(),
        Arc::new(NoopCacheInvalidator),
        SeederOptions::default(),
    )
    .expect("advisor pack must load");

    Harness { pool, organizations, rules, settings, contexts, seeder }
}

async fn add_organization(harness: &Harness, name: &str) -> OrganizationId {
    let organization = Organization {
        id: OrganizationId::generate(),
        name: name.to_string(),
        created_at: Utc::now(),
    };
    harness.organizations.create(organization.clone()).await.expect("create organization");
    organization.id
}

#[tokio::test]
async fn advisor_pack_seeds_once_per_organization() {
    let harness = harness().await;
    let organization = add_organization(&harness, "Acme Brokerage").await;

    let pack = ContentPack::advisor().expect("pack loads");
    let expected = pack.entries().len();

    let first = harness.seeder.seed_organization(organization).await.expect("first pass");
    assert_eq!(first.rules_created, expected, "every shipped advisor entry is eligible");
    assert!(first.greeting_filled);
    assert!(first.knowledge_refreshed);

    let second = harness.seeder.seed_organization(organization).await.expect("second pass");
    assert_eq!(second.rules_created, 0);

    let rules = harness.rules.list_for_organization(organization).await.expect("list rules");
    assert_eq!(rules.len(), expected);

    // Every persisted pattern must be accepted by the match engine.
    for rule in &rules {
        let pattern = rule.keywords.first().expect("one compiled pattern per rule");
        Regex::new(pattern).expect("seeded pattern compiles");
    }

    harness.pool.close().await;
}

#[tokio::test]
async fn seeding_all_organizations_covers_every_tenant() {
    let harness = harness().await;
    let first = add_organization(&harness, "Acme Brokerage").await;
    let second = add_organization(&harness, "Globex Capital").await;

    let report = harness.seeder.seed_all_organizations().await.expect("fan-out");
    assert_eq!(report.organizations, 2);
    assert!(report.all_succeeded());

    let pack = ContentPack::advisor().expect("pack loads");
    for organization in [first, second] {
        let rules =
            harness.rules.list_for_organization(organization).await.expect("list rules");
        assert_eq!(rules.len(), pack.entries().len());
    }

    // Startup re-run: nothing new anywhere.
    let rerun = harness.seeder.seed_all_organizations().await.expect("fan-out rerun");
    assert_eq!(rerun.rules_created, 0);
    assert!(rerun.all_succeeded());

    harness.pool.close().await;
}

#[tokio::test]
async fn tenant_edits_survive_but_knowledge_snaps_back() {
    let harness = harness().await;
    let organization = add_organization(&harness, "Acme Brokerage").await;

    harness.seeder.seed_organization(organization).await.expect("seed");

    let pack = ContentPack::advisor().expect("pack loads");
    let tag = pack.version_tag_for_entry(0);

    // Tenant reworks a seeded rule entirely.
    let mut edited = harness
        .rules
        .find_by_version_tag(organization, &tag)
        .await
        .expect("lookup")
        .expect("seeded rule");
    edited.name = "Custom greeting".to_string();
    edited.is_enabled = false;
    edited.priority = 1;
    edited.keywords = vec!["(?i)custom".to_string()];
    edited.updated_at = Utc::now();
    harness.rules.update(edited.clone()).await.expect("tenant edit");

    // Tenant also drifts the knowledge artifact.
    let mut drifted = harness
        .contexts
        .find_by_name(organization, "", &pack.knowledge_name())
        .await
        .expect("lookup context")
        .expect("knowledge artifact");
    drifted.is_enabled = false;
    drifted.priority = 10;
    drifted.trigger_keywords = vec!["custom".to_string()];
    drifted.static_content = "custom content".to_string();
    drifted.updated_at = Utc::now();
    harness.contexts.overwrite(drifted).await.expect("tenant drift");

    harness.seeder.seed_organization(organization).await.expect("reseed");

    let rule_after = harness
        .rules
        .find_by_version_tag(organization, &tag)
        .await
        .expect("lookup")
        .expect("rule still present");
    assert_eq!(rule_after.name, "Custom greeting");
    assert!(!rule_after.is_enabled);
    assert_eq!(rule_after.priority, 1);
    assert_eq!(rule_after.keywords, vec!["(?i)custom".to_string()]);

    let knowledge_after = harness
        .contexts
        .find_by_name(organization, "", &pack.knowledge_name())
        .await
        .expect("lookup context")
        .expect("knowledge artifact");
    assert!(knowledge_after.is_enabled, "knowledge is always restored to canonical");
    assert_eq!(knowledge_after.priority, 900);
    assert!(knowledge_after.trigger_keywords.is_empty());
    assert_eq!(knowledge_after.static_content, pack.knowledge().trim());

    harness.pool.close().await;
}

#[tokio::test]
async fn greeting_default_fills_only_blank_responses() {
    let harness = harness().await;
    let organization = add_organization(&harness, "Acme Brokerage").await;

    let first = harness.seeder.seed_organization(organization).await.expect("seed");
    assert!(first.greeting_filled);

    let pack = ContentPack::advisor().expect("pack loads");
    let settings =
        harness.settings.find(organization, "").await.expect("find settings").expect("created");
    assert!(!settings.is_enabled, "settings are created disabled");
    assert_eq!(settings.session_timeout_minutes, DEFAULT_SESSION_TIMEOUT_MINUTES);
    assert_eq!(settings.default_response, pack.greeting());

    // A tenant-authored greeting is left alone.
    harness
        .settings
        .set_default_response(settings.id, "We reply within one business day.", Utc::now())
        .await
        .expect("tenant greeting");
    let second = harness.seeder.seed_organization(organization).await.expect("reseed");
    assert!(!second.greeting_filled);

    let kept =
        harness.settings.find(organization, "").await.expect("find settings").expect("present");
    assert_eq!(kept.default_response, "We reply within one business day.");

    // Clearing the field is indistinguishable from never-set: it refills.
    harness
        .settings
        .set_default_response(settings.id, "", Utc::now())
        .await
        .expect("clear greeting");
    let third = harness.seeder.seed_organization(organization).await.expect("reseed again");
    assert!(third.greeting_filled);

    let refilled =
        harness.settings.find(organization, "").await.expect("find settings").expect("present");
    assert_eq!(refilled.default_response, pack.greeting());

    harness.pool.close().await;
}
