pub mod analytics;
pub mod components;
pub mod config;
pub mod error;
pub mod templates;

pub use analytics::{AnalyticsConfig, AnalyticsSource};
pub use components::{ComponentDescriptor, ComponentRef};
pub use config::Config;
pub use error::ConfigError;
