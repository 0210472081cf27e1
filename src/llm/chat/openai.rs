use async_trait::async_trait;
use log::{ debug, warn };
use reqwest::{ Client as HttpClient, Response, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use url::Url;

use super::{ ChatClient, CompletionError, CompletionResponse };
use crate::llm::{ ApiFlavor, LlmConfig, DEFAULT_BASE_URL };

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    flavor: ApiFlavor,
    system_prompt: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct OpenAICompletionRequest {
    model: String,
    prompt: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChatChoice>,
}

#[derive(Deserialize)]
struct OpenAIChatChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAICompletionChoice>,
}

#[derive(Deserialize)]
struct OpenAICompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct OpenAIErrorBody {
    error: OpenAIErrorDetail,
}

#[derive(Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: &str,
        flavor: ApiFlavor,
        model: Option<String>,
        base_url: Option<String>,
        system_prompt: String
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| flavor.default_model().to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&api_url).map_err(|e| format!("Invalid base URL '{}': {}", api_url, e))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|e|
            format!("Invalid API key format: {}", e)
        )?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model: chat_model,
            base_url: api_url,
            flavor,
            system_prompt,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.api_key.trim().is_empty() {
            return Err("OpenAI API key is required".into());
        }
        Self::new(
            &config.api_key,
            config.flavor,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.system_prompt.clone()
        )
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.flavor.route())
    }

    async fn complete_chat(&self, message: &str) -> Result<String, CompletionError> {
        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                }
            ],
            temperature: self.flavor.temperature(),
            max_tokens: self.flavor.max_tokens(),
        };

        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        let body = check_status(resp).await?.json::<OpenAIChatResponse>().await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }

    async fn complete_text(&self, message: &str) -> Result<String, CompletionError> {
        let req = OpenAICompletionRequest {
            model: self.model.clone(),
            prompt: message.to_string(),
            temperature: self.flavor.temperature(),
            max_tokens: self.flavor.max_tokens(),
        };

        let resp = self.http.post(self.endpoint()).json(&req).send().await?;
        let body = check_status(resp).await?.json::<OpenAICompletionResponse>().await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or(CompletionError::EmptyResponse)
    }
}

async fn check_status(resp: Response) -> Result<Response, CompletionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(CompletionError::Authentication),
        StatusCode::TOO_MANY_REQUESTS => Err(CompletionError::RateLimited),
        _ => {
            let raw = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<OpenAIErrorBody>(&raw) {
                Ok(body) => body.error.message,
                Err(_) if raw.trim().is_empty() => status.to_string(),
                Err(_) => raw,
            };
            warn!("Completion API returned {}: {}", status, message);
            Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, message: &str) -> Result<CompletionResponse, CompletionError> {
        debug!("Sending {} request to {} (model {})", self.flavor, self.endpoint(), self.model);
        let content = match self.flavor {
            ApiFlavor::Chat => self.complete_chat(message).await?,
            ApiFlavor::Completion => self.complete_text(message).await?,
        };
        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
