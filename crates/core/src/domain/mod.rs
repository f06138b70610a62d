pub mod context;
pub mod organization;
pub mod rule;
pub mod settings;
