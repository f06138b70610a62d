pub mod config;
pub mod domain;
pub mod pack;
pub mod pattern;

pub use chrono;

pub use domain::context::{AiContext, AiContextId, ContextType, CONTEXT_PRIORITY_STATIC};
pub use domain::organization::{Organization, OrganizationId};
pub use domain::rule::{
    KeywordRule, MatchType, ReplyPayload, ResponseType, RuleId, VersionTag, RULE_PRIORITY_BASE,
};
pub use domain::settings::{ChatbotSettings, SettingsId, DEFAULT_SESSION_TIMEOUT_MINUTES};
pub use pack::{ContentPack, DelayRange, KeywordEntry, PackError};
pub use pattern::{compile_keyword_pattern, compile_with_fragment_limit, DEFAULT_MAX_FRAGMENTS};
