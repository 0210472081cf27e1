use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Credential Args ---
    /// Path to the INI file holding `OPENAI_API_KEY` under its [DEFAULT] section.
    #[arg(long, env = "CONFIG_PATH", default_value = "config.ini")]
    pub config_path: String,

    /// API key for the completion provider. When set, the config file is not read.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // --- History Store Args ---
    /// History chat store type (json, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "json")]
    pub history_type: String,

    /// Location of the JSON conversation log.
    #[arg(long, env = "HISTORY_PATH", default_value = "chat_history.json")]
    pub history_path: String,

    /// Print the stored conversation before the first prompt.
    #[arg(long, env = "SHOW_HISTORY", default_value = "false")]
    pub show_history: bool,

    // --- Chat LLM Provider Args ---
    /// Completion endpoint flavor (chat, completion)
    #[arg(long, env = "API_FLAVOR", default_value = "chat")]
    pub api_flavor: String,

    /// Model name (e.g., gpt-3.5-turbo, text-davinci-002). Defaults per flavor.
    #[arg(long, env = "CHAT_MODEL")] // No default, rely on flavor defaults if None
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API (e.g., https://api.openai.com)
    #[arg(long, env = "CHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// System instruction sent with every chat request.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = "You are a helpful assistant")]
    pub system_prompt: String,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["chat-bridge"]);
        assert_eq!(args.config_path, "config.ini");
        assert_eq!(args.history_type, "json");
        assert_eq!(args.history_path, "chat_history.json");
        assert_eq!(args.api_flavor, "chat");
        assert_eq!(args.system_prompt, "You are a helpful assistant");
        assert!(!args.show_history);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "chat-bridge",
            "--api-flavor",
            "completion",
            "--history-type",
            "memory",
            "--base-url",
            "http://localhost:9000",
            "--debug",
        ]);
        assert_eq!(args.api_flavor, "completion");
        assert_eq!(args.history_type, "memory");
        assert_eq!(args.base_url.as_deref(), Some("http://localhost:9000"));
        assert!(args.debug);
    }
}
