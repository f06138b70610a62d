pub mod artifacts;
pub mod invalidation;
pub mod reconcile;

pub use invalidation::{CacheInvalidator, NoopCacheInvalidator, TracingCacheInvalidator};
pub use reconcile::{
    BuiltinSeeder, OrganizationFailure, OrganizationSeedReport, SeedError, SeedRunReport,
    SeederOptions,
};
