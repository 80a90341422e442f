use std::fmt;
use std::str::FromStr;

/// Supported AI backends.
///
/// Every variant has exactly one constructor in [`AiFactory`](super::AiFactory);
/// adding a variant without one does not compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    OpenAi,
    DeepSeek,
    /// Alibaba Cloud DashScope, OpenAI-compatible mode.
    Qwen,
    Gemini,
    Ollama,
}

impl EngineKind {
    pub const ALL: [EngineKind; 5] = [
        EngineKind::OpenAi,
        EngineKind::DeepSeek,
        EngineKind::Qwen,
        EngineKind::Gemini,
        EngineKind::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::OpenAi => "openai",
            EngineKind::DeepSeek => "deepseek",
            EngineKind::Qwen => "qwen",
            EngineKind::Gemini => "gemini",
            EngineKind::Ollama => "ollama",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            EngineKind::OpenAi => "https://api.openai.com/v1/chat/completions",
            EngineKind::DeepSeek => "https://api.deepseek.com/chat/completions",
            EngineKind::Qwen => {
                "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions"
            }
            EngineKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            EngineKind::Ollama => "http://localhost:11434/v1/chat/completions",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            EngineKind::OpenAi => "gpt-4o-mini",
            EngineKind::DeepSeek => "deepseek-chat",
            EngineKind::Qwen => "qwen-plus",
            EngineKind::Gemini => "gemini-1.5-flash",
            EngineKind::Ollama => "llama3.1",
        }
    }

    /// Whether the backend rejects requests without an API key.
    pub fn requires_api_key(self) -> bool {
        !matches!(self, EngineKind::Ollama)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(EngineKind::OpenAi),
            "deepseek" => Ok(EngineKind::DeepSeek),
            "qwen" | "dashscope" | "aliyun" => Ok(EngineKind::Qwen),
            "gemini" => Ok(EngineKind::Gemini),
            "ollama" => Ok(EngineKind::Ollama),
            other => Err(format!(
                "'{}' is not a supported engine (expected one of: {})",
                other,
                EngineKind::ALL.map(EngineKind::as_str).join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.as_str().parse::<EngineKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parsing_is_case_insensitive_and_knows_aliases() {
        assert_eq!("OpenAI".parse::<EngineKind>().unwrap(), EngineKind::OpenAi);
        assert_eq!("dashscope".parse::<EngineKind>().unwrap(), EngineKind::Qwen);
        assert_eq!(" aliyun ".parse::<EngineKind>().unwrap(), EngineKind::Qwen);
    }

    #[test]
    fn unknown_names_list_the_supported_ones() {
        let err = "claude".parse::<EngineKind>().unwrap_err();
        assert!(err.contains("'claude'"));
        assert!(err.contains("openai, deepseek, qwen, gemini, ollama"));
    }
}
