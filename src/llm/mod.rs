pub mod chat;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant";

/// Which completion endpoint a client talks to. Each flavor carries its own
/// fixed model and sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFlavor {
    Chat,
    Completion,
}

impl ApiFlavor {
    pub fn default_model(&self) -> &'static str {
        match self {
            ApiFlavor::Chat => "gpt-3.5-turbo",
            ApiFlavor::Completion => "text-davinci-002",
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            ApiFlavor::Chat => "/v1/chat/completions",
            ApiFlavor::Completion => "/v1/completions",
        }
    }

    pub fn temperature(&self) -> f32 {
        match self {
            ApiFlavor::Chat => 0.7,
            ApiFlavor::Completion => 0.5,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        match self {
            ApiFlavor::Chat => 150,
            ApiFlavor::Completion => 100,
        }
    }
}

impl fmt::Display for ApiFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiFlavor::Chat => write!(f, "chat"),
            ApiFlavor::Completion => write!(f, "completion"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseApiFlavorError {
    message: String,
}

impl fmt::Display for ParseApiFlavorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseApiFlavorError {}

impl FromStr for ApiFlavor {
    type Err = ParseApiFlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(ApiFlavor::Chat),
            "completion" | "completions" | "legacy" => Ok(ApiFlavor::Completion),
            _ =>
                Err(ParseApiFlavorError {
                    message: format!("Invalid API flavor: '{}'", s),
                }),
        }
    }
}

/// Everything a completion client needs; built once at startup and handed to
/// the client constructor.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub flavor: ApiFlavor,
    pub api_key: String,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub system_prompt: String,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            flavor: ApiFlavor::Chat,
            api_key: api_key.into(),
            completion_model: None,
            base_url: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_flavor() {
        assert_eq!("chat".parse::<ApiFlavor>().unwrap(), ApiFlavor::Chat);
        assert_eq!("Completion".parse::<ApiFlavor>().unwrap(), ApiFlavor::Completion);
        assert_eq!("legacy".parse::<ApiFlavor>().unwrap(), ApiFlavor::Completion);
        let err = "stream".parse::<ApiFlavor>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid API flavor: 'stream'");
    }

    #[test]
    fn test_flavor_parameters_are_fixed() {
        assert_eq!(ApiFlavor::Completion.default_model(), "text-davinci-002");
        assert_eq!(ApiFlavor::Completion.max_tokens(), 100);
        assert_eq!(ApiFlavor::Chat.route(), "/v1/chat/completions");
    }

    #[test]
    fn test_new_config_uses_default_system_prompt() {
        let config = LlmConfig::new("sk-test");
        assert_eq!(config.flavor, ApiFlavor::Chat);
        assert_eq!(config.system_prompt, "You are a helpful assistant");
        assert!(config.base_url.is_none());
    }
}
