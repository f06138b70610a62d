use replykit_core::domain::organization::OrganizationId;

/// Tells the cache layer which tenant views went stale after a seeding
/// pass. Fire-and-forget: no return value is consumed and delivery is
/// best-effort; cached views converge when the call lands.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_keyword_rules(&self, organization: OrganizationId);
    fn invalidate_chatbot_settings(&self, organization: OrganizationId);
    fn invalidate_ai_context(&self, organization: OrganizationId);
}

/// For deployments without a cache layer wired in.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCacheInvalidator;

impl CacheInvalidator for NoopCacheInvalidator {
    fn invalidate_keyword_rules(&self, _organization: OrganizationId) {}
    fn invalidate_chatbot_settings(&self, _organization: OrganizationId) {}
    fn invalidate_ai_context(&self, _organization: OrganizationId) {}
}

/// Emits a debug event per invalidation; the CLI uses this so operators can
/// see which views an external cache would have dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingCacheInvalidator;

impl CacheInvalidator for TracingCacheInvalidator {
    fn invalidate_keyword_rules(&self, organization: OrganizationId) {
        tracing::debug!(
            event_name = "cache.invalidate.keyword_rules",
            organization = %organization,
            "keyword rule cache invalidated"
        );
    }

    fn invalidate_chatbot_settings(&self, organization: OrganizationId) {
        tracing::debug!(
            event_name = "cache.invalidate.chatbot_settings",
            organization = %organization,
            "chatbot settings cache invalidated"
        );
    }

    fn invalidate_ai_context(&self, organization: OrganizationId) {
        tracing::debug!(
            event_name = "cache.invalidate.ai_context",
            organization = %organization,
            "ai context cache invalidated"
        );
    }
}
