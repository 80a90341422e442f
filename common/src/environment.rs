//! Deployment environment resolution.
//!
//! A config file carries its environment in its name: `config.<tag>.json`. The tag
//! selects which key-store scope gets merged into the config, so an unknown tag is an
//! error rather than a fallback to some default environment.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Known environments as `(name, pattern)` rows, tried in order.
/// Patterns are anchored and matched against the whole tag.
pub const ENVIRONMENT_PATTERNS: &[(&str, &str)] = &[
    ("local", r"^local$"),
    ("test", r"^test$"),
    ("remote", r"^remote$"),
    ("remote-host", r"^remote-[a-z0-9][a-z0-9_]*$"),
    ("aliyun", r"^aliyun$"),
];

static COMPILED_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    ENVIRONMENT_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect()
});

/// Logical deployment environment, e.g. `local`, `remote` or `remote-230`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EnvironmentTag(String);

impl EnvironmentTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the pattern row that accepted this tag.
    pub fn pattern_name(&self) -> &'static str {
        classify(&self.0).unwrap_or("unknown")
    }
}

impl fmt::Display for EnvironmentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EnvironmentTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for EnvironmentTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match classify(s) {
            Some(_) => Ok(EnvironmentTag(s.to_string())),
            None => Err(ConfigError::UnrecognizedEnvironment {
                identifier: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for EnvironmentTag {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EnvironmentTag> for String {
    fn from(tag: EnvironmentTag) -> Self {
        tag.0
    }
}

fn classify(token: &str) -> Option<&'static str> {
    COMPILED_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(token))
        .map(|(name, _)| *name)
}

/// Extract the candidate tag from a `*.json` path: the segment between the last two
/// dots of the file name, or the whole stem when the name has a single dot.
fn environment_token(identifier: &str) -> Option<&str> {
    let file_name = Path::new(identifier).file_name()?.to_str()?;
    let stem = file_name.strip_suffix(".json")?;
    Some(match stem.rsplit_once('.') {
        Some((_, token)) => token,
        None => stem,
    })
}

/// Infer the environment a config file belongs to from its name alone. No I/O.
///
/// ```
/// use common::infer_environment;
///
/// let env = infer_environment("config/config.remote-230.json").unwrap();
/// assert_eq!(env.as_str(), "remote-230");
/// ```
pub fn infer_environment(identifier: &str) -> Result<EnvironmentTag, ConfigError> {
    environment_token(identifier)
        .and_then(|token| classify(token).map(|_| EnvironmentTag(token.to_string())))
        .ok_or_else(|| ConfigError::UnrecognizedEnvironment {
            identifier: identifier.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_patterns_compile() {
        assert_eq!(COMPILED_PATTERNS.len(), ENVIRONMENT_PATTERNS.len());
    }

    #[test]
    fn infers_tag_from_file_name() {
        let cases = [
            ("config/config.remote-230.json", "remote-230"),
            ("config/config.remote-aliyun.json", "remote-aliyun"),
            ("config.remote.json", "remote"),
            ("/etc/newspress/config.local.json", "local"),
            ("config.aliyun.json", "aliyun"),
            ("remote.json", "remote"),
            ("settings.v2.test.json", "test"),
        ];
        for (path, expected) in cases {
            let env = infer_environment(path).unwrap_or_else(|e| panic!("{path}: {e}"));
            assert_eq!(env.as_str(), expected, "path {path}");
        }
    }

    #[test]
    fn rejects_unknown_names() {
        for path in [
            "config.json",
            "config/config.staging.json",
            "config.REMOTE.json",
            "config.remote-.json",
            "config.remote.yaml",
            "config.local.json.bak",
            "remote",
            "config.remote-230",
            "config",
            "",
            "config/",
        ] {
            match infer_environment(path) {
                Err(ConfigError::UnrecognizedEnvironment { identifier }) => {
                    assert_eq!(identifier, path)
                }
                other => panic!("{path}: expected UnrecognizedEnvironment, got {other:?}"),
            }
        }
    }

    #[test]
    fn inference_is_deterministic() {
        let a = infer_environment("config.remote-230.json").unwrap();
        let b = infer_environment("config.remote-230.json").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.pattern_name(), "remote-host");
    }

    #[test]
    fn explicit_tags_use_the_same_table() {
        assert_eq!("remote-aliyun".parse::<EnvironmentTag>().unwrap().as_str(), "remote-aliyun");
        assert!("production".parse::<EnvironmentTag>().is_err());
    }

    #[test]
    fn tag_deserializes_with_validation() {
        let tag: EnvironmentTag = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(tag.to_string(), "local");
        assert!(serde_json::from_str::<EnvironmentTag>("\"nowhere\"").is_err());
    }
}
