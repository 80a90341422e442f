use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a configuration load.
///
/// Every variant names the offending file, field or identifier. None of them is
/// recoverable inside the loader: a failed load never yields a partial configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot infer environment from '{identifier}': no known environment pattern matches")]
    UnrecognizedEnvironment { identifier: String },

    #[error("configuration document not found: {}", path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed configuration document {}: {source}", path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing API key for engine '{engine}' in environment '{environment}'")]
    MissingApiKey { engine: String, environment: String },

    #[error("invalid configuration at '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
