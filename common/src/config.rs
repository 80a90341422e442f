//! Configuration documents, the key-store merge and validation.
//!
//! A load reads the base document, then the key store, then merges and validates. The
//! result is shared behind an `Arc` and never changes afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::environment::{infer_environment, EnvironmentTag};
use crate::error::ConfigError;
use crate::secret::{ApiKey, KeyScope, KeyStore, Secret};

/// File name of the key store looked up next to the base document.
pub const DEFAULT_KEY_STORE_FILE: &str = "api_keys.json";

// Template documents, as checked in.

const CONFIG_FIELDS: &[&str] = &["wordpress", "ai"];
const ENGINE_FIELDS: &[&str] = &[
    "apiKey",
    "provider",
    "model",
    "baseUrl",
    "temperature",
    "maxTokens",
    "timeoutSeconds",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    wordpress: RawWordpressConfig,
    ai: RawAiConfig,
    #[serde(skip)]
    extra: Map<String, Value>,
}

impl RawConfig {
    /// Typed view of a base document. Sections and engine fields this crate does not
    /// interpret are collected into `extra` as-is.
    fn from_document(document: &Value) -> Result<Self, ConfigError> {
        let mut raw: RawConfig =
            serde_path_to_error::deserialize(document).map_err(schema_error)?;
        raw.extra = unknown_fields(document, CONFIG_FIELDS);

        if let Some(engines) = document.pointer("/ai/engines").and_then(Value::as_object) {
            for (name, engine) in raw.ai.engines.iter_mut() {
                if let Some(value) = engines.get(name) {
                    engine.extra = unknown_fields(value, ENGINE_FIELDS);
                }
            }
        }
        Ok(raw)
    }
}

fn unknown_fields(value: &Value, known: &[&str]) -> Map<String, Value> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(key, _)| !known.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWordpressConfig {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    username: String,
    #[serde(default = "unset_secret")]
    password: Secret,
    #[serde(default = "default_true")]
    enabled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAiConfig {
    enabled: bool,
    default_engine: String,
    #[serde(default)]
    engine: Option<String>,
    #[serde(default)]
    engines: BTreeMap<String, RawEngineConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEngineConfig {
    api_key: Secret,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    max_tokens: Option<usize>,
    #[serde(default)]
    timeout_seconds: Option<u64>,
    #[serde(skip)]
    extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn unset_secret() -> Secret {
    Secret::Value(String::new())
}

// Resolved configuration.

/// Settings for one AI engine, secrets resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub api_key: ApiKey,
    /// Engine variant when the `ai.engines` key is an alias (e.g. `"fast": { "provider": "deepseek" }`).
    pub provider: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub timeout_seconds: Option<u64>,
    /// Any other engine-specific fields, kept verbatim.
    pub extra: Map<String, Value>,
}

/// AI section
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub enabled: bool,
    pub default_engine: String,
    pub engine: Option<String>,
    pub engines: BTreeMap<String, EngineConfig>,
}

impl AiConfig {
    /// `engine` overrides `default_engine` when set.
    pub fn active_engine(&self) -> &str {
        self.engine.as_deref().unwrap_or(&self.default_engine)
    }

    pub fn active_engine_config(&self) -> Option<&EngineConfig> {
        self.engines.get(self.active_engine())
    }
}

/// Publishing target credentials. Opaque to this crate beyond validation.
#[derive(Debug, Clone, PartialEq)]
pub struct WordpressConfig {
    pub url: Option<String>,
    pub username: String,
    pub password: ApiKey,
    /// Whether publishing is enabled downstream; credentials are only required when it is.
    pub enabled: bool,
}

/// Fully merged, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub wordpress: WordpressConfig,
    pub ai: AiConfig,
    /// Top-level sections this crate does not interpret (scraping, scheduling, ...).
    pub extra: Map<String, Value>,
    environment: EnvironmentTag,
    source: PathBuf,
}

impl Configuration {
    /// Merge and validate already-parsed documents, without touching the file system.
    pub fn from_documents(
        base: Value,
        key_store: &KeyStore,
        environment: EnvironmentTag,
    ) -> Result<Arc<Configuration>, ConfigError> {
        resolve(base, key_store, &environment, PathBuf::new()).map(Arc::new)
    }

    /// Environment whose key-store scope was merged in.
    pub fn environment(&self) -> &EnvironmentTag {
        &self.environment
    }

    /// Base document this configuration was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }
}

/// Builder for a single configuration load.
///
/// ```no_run
/// # async fn demo() -> Result<(), common::ConfigError> {
/// use common::ConfigLoader;
///
/// let config = ConfigLoader::new("config/config.remote-230.json").load().await?;
/// println!("engine: {}", config.ai.active_engine());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    environment: Option<EnvironmentTag>,
    key_store: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            environment: None,
            key_store: None,
        }
    }

    /// Use this environment instead of inferring it from the file name.
    pub fn environment(mut self, environment: EnvironmentTag) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Read secrets from this document instead of `api_keys.json` next to the base document.
    pub fn key_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_store = Some(path.into());
        self
    }

    pub fn key_store_path(&self) -> PathBuf {
        match &self.key_store {
            Some(path) => path.clone(),
            None => self
                .path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(DEFAULT_KEY_STORE_FILE),
        }
    }

    pub async fn load(self) -> Result<Arc<Configuration>, ConfigError> {
        let environment = match &self.environment {
            Some(env) => env.clone(),
            None => infer_environment(&self.path.to_string_lossy())?,
        };
        debug!(path = %self.path.display(), %environment, "loading configuration");

        let base: Value = read_document(&self.path).await?;

        let key_store_path = self.key_store_path();
        let key_store: KeyStore = read_document(&key_store_path).await?;
        debug!(path = %key_store_path.display(), "key store read");

        let config = resolve(base, &key_store, &environment, self.path)?;

        info!(
            %environment,
            engine = %config.ai.active_engine(),
            ai_enabled = config.ai.enabled,
            engines = config.ai.engines.len(),
            "configuration loaded"
        );
        Ok(Arc::new(config))
    }
}

/// Load and validate the configuration at `path`.
///
/// When `env` is `None` the environment is inferred from the file name.
pub async fn load_config(
    path: impl AsRef<Path>,
    env: Option<EnvironmentTag>,
) -> Result<Arc<Configuration>, ConfigError> {
    let mut loader = ConfigLoader::new(path.as_ref());
    if let Some(env) = env {
        loader = loader.environment(env);
    }
    loader.load().await
}

async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// Map a well-formed document with the wrong shape to the dotted path of the offending field.
fn schema_error(err: serde_path_to_error::Error<serde_json::Error>) -> ConfigError {
    let path = err.path().to_string();
    let reason = err.into_inner().to_string();
    // a missing field is reported at its parent: "missing field `defaultEngine`" at `ai`
    let missing = reason
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split('`').next());
    let field = match missing {
        Some(name) if path == "." => name.to_string(),
        Some(name) => format!("{path}.{name}"),
        None => path,
    };
    ConfigError::invalid(field, reason)
}

fn resolve(
    base: Value,
    key_store: &KeyStore,
    environment: &EnvironmentTag,
    source: PathBuf,
) -> Result<Configuration, ConfigError> {
    let raw = RawConfig::from_document(&base)?;
    let config = merge(raw, key_store.scope(environment), environment, source)?;
    validate(&config)?;
    Ok(config)
}

fn merge(
    raw: RawConfig,
    scope: Option<&KeyScope>,
    environment: &EnvironmentTag,
    source: PathBuf,
) -> Result<Configuration, ConfigError> {
    let missing = |engine: &str| ConfigError::MissingApiKey {
        engine: engine.to_string(),
        environment: environment.to_string(),
    };

    let mut engines = BTreeMap::new();
    for (name, engine) in raw.ai.engines {
        let overlay = scope.and_then(|s| s.engine_key(&name));
        let api_key = engine.api_key.resolve(overlay).ok_or_else(|| missing(&name))?;
        engines.insert(
            name,
            EngineConfig {
                api_key,
                provider: engine.provider,
                model: engine.model,
                base_url: engine.base_url,
                temperature: engine.temperature,
                max_tokens: engine.max_tokens,
                timeout_seconds: engine.timeout_seconds,
                extra: engine.extra,
            },
        );
    }

    let overlay = scope.and_then(KeyScope::wordpress_password);
    let password = raw
        .wordpress
        .password
        .resolve(overlay)
        .ok_or_else(|| missing("wordpress"))?;

    Ok(Configuration {
        wordpress: WordpressConfig {
            url: raw.wordpress.url,
            username: raw.wordpress.username,
            password,
            enabled: raw.wordpress.enabled,
        },
        ai: AiConfig {
            enabled: raw.ai.enabled,
            default_engine: raw.ai.default_engine,
            engine: raw.ai.engine.filter(|e| !e.trim().is_empty()),
            engines,
        },
        extra: raw.extra,
        environment: environment.clone(),
        source,
    })
}

fn validate(config: &Configuration) -> Result<(), ConfigError> {
    let ai = &config.ai;
    if ai.default_engine.trim().is_empty() {
        return Err(ConfigError::invalid("ai.defaultEngine", "must not be empty"));
    }
    if !ai.engines.contains_key(&ai.default_engine) {
        return Err(ConfigError::invalid(
            "ai.defaultEngine",
            format!("engine '{}' is not defined under ai.engines", ai.default_engine),
        ));
    }
    if let Some(engine) = &ai.engine {
        if !ai.engines.contains_key(engine) {
            return Err(ConfigError::invalid(
                "ai.engine",
                format!("engine '{}' is not defined under ai.engines", engine),
            ));
        }
    }

    for (name, engine) in &ai.engines {
        if engine.timeout_seconds == Some(0) {
            return Err(ConfigError::invalid(
                format!("ai.engines.{name}.timeoutSeconds"),
                "must be greater than zero",
            ));
        }
        if let Some(t) = engine.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::invalid(
                    format!("ai.engines.{name}.temperature"),
                    format!("{t} is outside 0.0..=2.0"),
                ));
            }
        }
        if let Some(base_url) = &engine.base_url {
            check_http_url(base_url, &format!("ai.engines.{name}.baseUrl"))?;
        }
    }

    let wp = &config.wordpress;
    if let Some(url) = &wp.url {
        check_http_url(url, "wordpress.url")?;
    }
    if wp.enabled {
        if wp.username.trim().is_empty() {
            return Err(ConfigError::invalid(
                "wordpress.username",
                "required when publishing is enabled",
            ));
        }
        if wp.password.is_empty() {
            return Err(ConfigError::invalid(
                "wordpress.password",
                "required when publishing is enabled",
            ));
        }
    }

    Ok(())
}

fn check_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::invalid(
            field,
            format!("unsupported URL scheme '{other}'"),
        )),
    }
}
