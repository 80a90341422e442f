/*!
common/src/lib.rs

Shared configuration for Newspress.

This crate provides:
- Environment inference from config file names (`environment`)
- Secret placeholders and the per-environment key store (`secret`)
- The validated `Configuration` record and its async loader (`config`)
*/

pub mod config;
pub mod environment;
pub mod error;
pub mod secret;

pub use config::{
    load_config, AiConfig, ConfigLoader, Configuration, EngineConfig, WordpressConfig,
    DEFAULT_KEY_STORE_FILE,
};
pub use environment::{infer_environment, EnvironmentTag, ENVIRONMENT_PATTERNS};
pub use error::ConfigError;
pub use secret::{ApiKey, KeyStore, Secret, PLACEHOLDER_SENTINEL};
