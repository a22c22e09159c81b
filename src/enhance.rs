//! Client for the external enhancement service.
//!
//! The service is treated as an opaque text-to-text transformation: it gets
//! captured markup (see [`WebsiteContent::enhancement_input`]) and returns
//! new markup. Endpoint and credentials come from an explicit
//! [`EnhancerConfig`].
//!
//! [`WebsiteContent::enhancement_input`]: crate::results::WebsiteContent::enhancement_input

use crate::error::{CaptureError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert web developer and designer. \
Enhance the provided website content with a modern, responsive and accessible design \
while keeping the original content. Return ONLY a complete HTML file with embedded CSS.";

static HTML_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```html\s*\n(.*?)\n?```").ok());

/// Connection settings for a chat-completions style enhancement service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancerConfig {
    /// Full URL of the chat completions endpoint
    pub endpoint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sent as the `CustomerId` header when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,

    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_max_tokens() -> u32 {
    8000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_ms() -> u64 {
    120_000
}

/// Text-to-text enhancement service
#[async_trait]
pub trait Enhancer: Send + Sync {
    /// Turn captured markup into enhanced markup
    async fn enhance(&self, content: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// [`Enhancer`] that talks to an OpenAI-compatible `/chat/completions` endpoint
pub struct ChatCompletionsEnhancer {
    config: EnhancerConfig,
    client: Client,
}

impl ChatCompletionsEnhancer {
    pub fn new(config: EnhancerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CaptureError::Enhancement(format!("client init failed: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Enhancer for ChatCompletionsEnhancer {
    async fn enhance(&self, content: &str) -> Result<String> {
        let system_prompt = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SYSTEM_PROMPT);
        let user_prompt = format!("Please enhance this website content:\n\n{}", content);

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        ::log::info!(
            "Requesting enhancement from {} ({} chars of input)",
            self.config.model,
            content.len()
        );

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(customer_id) = &self.config.customer_id {
            request = request.header("CustomerId", customer_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CaptureError::Enhancement(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Enhancement(format!(
                "service answered {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| CaptureError::Enhancement(format!("bad response body: {}", e)))?;

        let text = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| CaptureError::Enhancement("no response from model".to_string()))?;

        Ok(extract_html_block(&text))
    }
}

/// Unwrap a fenced ```` ```html ```` block if the reply has one; otherwise
/// return the trimmed reply
pub fn extract_html_block(text: &str) -> String {
    let fenced = HTML_FENCE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    fenced.unwrap_or(text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_html_block() {
        let reply = "Here you go:\n```html\n<!DOCTYPE html>\n<html></html>\n```\nEnjoy!";
        assert_eq!(extract_html_block(reply), "<!DOCTYPE html>\n<html></html>");

        assert_eq!(extract_html_block("  <html></html>\n"), "<html></html>");
    }

    #[test]
    fn test_config_defaults() {
        let config: EnhancerConfig = serde_json::from_str(
            r#"{ "endpoint": "https://llm.example.com/chat/completions", "model": "m" }"#,
        )
        .unwrap();
        assert_eq!(config.max_tokens, 8000);
        assert_eq!(config.timeout_ms, 120_000);
        assert!(config.api_key.is_none());
        assert!(config.system_prompt.is_none());
    }
}
