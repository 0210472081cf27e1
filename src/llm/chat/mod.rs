pub mod openai;

use async_trait::async_trait;
use log::{ debug, warn };
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;
use super::LlmConfig;
use self::openai::OpenAIChatClient;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

/// Failure of a single completion call. `Display` is the text shown to the
/// user after the `Error: ` prefix.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Invalid API key")]
    Authentication,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("{message} (status {status})")]
    Api {
        status: u16,
        message: String,
    },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("No choices returned by the completion API")]
    EmptyResponse,
}

impl CompletionError {
    /// The pseudo-response recorded and displayed in place of a bot reply.
    pub fn to_reply(&self) -> String {
        format!("Error: {}", self)
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// One stateless round trip: the message is the only user turn sent.
    async fn complete(&self, message: &str) -> Result<CompletionResponse, CompletionError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

/// Completion call that never fails outward: provider and transport errors
/// come back as the text shown in place of the bot reply.
pub async fn respond(client: &dyn ChatClient, message: &str) -> String {
    match client.complete(message).await {
        Ok(resp) => {
            debug!("Received {} chars from {}", resp.response.len(), client.get_model());
            resp.response
        }
        Err(e) => {
            warn!("Completion request failed: {}", e);
            e.to_reply()
        }
    }
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_and_rate_limit_replies_are_fixed() {
        assert_eq!(CompletionError::Authentication.to_reply(), "Error: Invalid API key");
        assert_eq!(CompletionError::RateLimited.to_reply(), "Error: Rate limit exceeded");
    }

    #[test]
    fn test_api_error_reply_embeds_description() {
        let err = CompletionError::Api {
            status: 500,
            message: "The server had an error".to_string(),
        };
        assert_eq!(err.to_reply(), "Error: The server had an error (status 500)");
    }

    struct Scripted(fn() -> Result<CompletionResponse, CompletionError>);

    #[async_trait]
    impl ChatClient for Scripted {
        async fn complete(&self, _message: &str) -> Result<CompletionResponse, CompletionError> {
            (self.0)()
        }

        fn get_model(&self) -> String {
            "scripted".to_string()
        }

        fn get_base_url(&self) -> String {
            String::new()
        }
    }

    #[tokio::test]
    async fn test_respond_passes_success_through() {
        let client = Scripted(|| Ok(CompletionResponse { response: "Hi there!".to_string() }));
        assert_eq!(respond(&client, "Hello").await, "Hi there!");
    }

    #[tokio::test]
    async fn test_respond_turns_errors_into_text() {
        let auth = Scripted(|| Err(CompletionError::Authentication));
        assert_eq!(respond(&auth, "Hello").await, "Error: Invalid API key");

        let limited = Scripted(|| Err(CompletionError::RateLimited));
        assert_eq!(respond(&limited, "Hello").await, "Error: Rate limit exceeded");

        let empty = Scripted(|| Err(CompletionError::EmptyResponse));
        assert_eq!(respond(&empty, "Hello").await, "Error: No choices returned by the completion API");
    }

    #[test]
    fn test_new_client_rejects_unusable_key() {
        let config = LlmConfig::new("bad\nkey");
        assert!(new_client(&config).is_err());
    }
}
