//! Secret values and the key-store overlay.
//!
//! Checked-in config templates carry [`PLACEHOLDER_SENTINEL`] wherever a real secret
//! belongs. Templates deserialize those fields into [`Secret`]; the loader then turns
//! every `Secret` into an [`ApiKey`] using the [`KeyStore`] scope of the active
//! environment. The final configuration types only hold `ApiKey`, so an unresolved
//! placeholder cannot survive a load.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::environment::EnvironmentTag;

/// Literal marking a template field as "resolve from the key store".
pub const PLACEHOLDER_SENTINEL: &str = "FROM_API_KEYS_CONFIG";

/// A secret field as written in a config template.
#[derive(Clone, PartialEq, Eq)]
pub enum Secret {
    /// The template holds the placeholder sentinel.
    Unresolved,
    /// The template holds a literal value, used as-is.
    Value(String),
}

impl Secret {
    /// Resolve against an overlay lookup. Literal values win; placeholders need an
    /// overlay value that is neither empty nor the sentinel itself.
    pub fn resolve(self, overlay: Option<&str>) -> Option<ApiKey> {
        match self {
            Secret::Value(value) => Some(ApiKey(value)),
            Secret::Unresolved => overlay
                .filter(|value| !value.is_empty() && *value != PLACEHOLDER_SENTINEL)
                .map(|value| ApiKey(value.to_string())),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Secret::Unresolved)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Unresolved => f.write_str("Secret::Unresolved"),
            Secret::Value(_) => f.write_str("Secret::Value(***)"),
        }
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == PLACEHOLDER_SENTINEL {
            Ok(Secret::Unresolved)
        } else {
            Ok(Secret::Value(raw))
        }
    }
}

/// A resolved secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Secret values for one entry (an engine, or `wordpress`) in one environment.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyEntry")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// All secrets of one environment, keyed by engine name (plus `wordpress`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct KeyScope(BTreeMap<String, KeyEntry>);

impl KeyScope {
    pub fn engine_key(&self, engine: &str) -> Option<&str> {
        self.0.get(engine).and_then(|e| e.api_key.as_deref())
    }

    pub fn wordpress_password(&self) -> Option<&str> {
        self.0.get("wordpress").and_then(|e| e.password.as_deref())
    }
}

/// Parsed key-store document: `{ "<env>": { "<engine>": { "apiKey": "..." } } }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct KeyStore(BTreeMap<String, KeyScope>);

impl KeyStore {
    pub fn scope(&self, env: &EnvironmentTag) -> Option<&KeyScope> {
        self.0.get(env.as_str())
    }

    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_deserializes_as_unresolved() {
        let s: Secret = serde_json::from_str("\"FROM_API_KEYS_CONFIG\"").unwrap();
        assert!(s.is_unresolved());
        let s: Secret = serde_json::from_str("\"sk-literal\"").unwrap();
        assert_eq!(s, Secret::Value("sk-literal".into()));
    }

    #[test]
    fn literal_values_ignore_the_overlay() {
        let key = Secret::Value("sk-literal".into()).resolve(Some("sk-overlay")).unwrap();
        assert_eq!(key.expose(), "sk-literal");
    }

    #[test]
    fn placeholders_need_a_non_empty_overlay_value() {
        assert!(Secret::Unresolved.resolve(None).is_none());
        assert!(Secret::Unresolved.resolve(Some("")).is_none());
        assert!(Secret::Unresolved.resolve(Some(PLACEHOLDER_SENTINEL)).is_none());
        let key = Secret::Unresolved.resolve(Some("sk-test123")).unwrap();
        assert_eq!(key.expose(), "sk-test123");
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = Secret::Unresolved.resolve(Some("sk-test123")).unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey(***)");
        assert!(!format!("{:?}", Secret::Value("sk-test123".into())).contains("sk-test123"));
    }

    #[test]
    fn key_store_scopes_by_environment() {
        let store: KeyStore = serde_json::from_str(
            r#"{
                "remote-230": {
                    "openai": { "apiKey": "sk-test123" },
                    "wordpress": { "password": "wp-secret" }
                },
                "local": { "deepseek": { "apiKey": "ds-local" } }
            }"#,
        )
        .unwrap();

        let env: EnvironmentTag = "remote-230".parse().unwrap();
        let scope = store.scope(&env).unwrap();
        assert_eq!(scope.engine_key("openai"), Some("sk-test123"));
        assert_eq!(scope.engine_key("deepseek"), None);
        assert_eq!(scope.wordpress_password(), Some("wp-secret"));
        assert!(!format!("{scope:?}").contains("sk-test123"));

        let remote: EnvironmentTag = "remote".parse().unwrap();
        assert!(store.scope(&remote).is_none());
        assert_eq!(store.environments().collect::<Vec<_>>(), ["local", "remote-230"]);
    }
}
