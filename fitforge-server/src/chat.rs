use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Chat;
use crate::upstream::{check_status, http_client, UpstreamError};

const SYSTEM_PROMPT: &str = "You are FitForge Coach, a friendly personal trainer. \
Give safe, practical advice about workouts, recovery and nutrition. Keep answers short.";

/// Text completion for the premium coaching chat
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String, UpstreamError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponseBody {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl ChatResponseBody {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .message
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Cohere v2 chat client
pub struct CohereClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl CohereClient {
    pub fn new(settings: &Chat) -> Self {
        Self {
            client: http_client(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
        }
    }
}

#[async_trait]
impl ChatProvider for CohereClient {
    async fn reply(&self, message: &str) -> Result<String, UpstreamError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("Cohere API key"))?;

        let body = ChatRequestBody {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/v2/chat", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatResponseBody = check_status(response).await?.json().await?;
        parsed
            .into_text()
            .ok_or_else(|| UpstreamError::Malformed("empty chat response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joined() {
        let parsed: ChatResponseBody = serde_json::from_str(
            r#"{"id":"x","message":{"role":"assistant","content":[
                {"type":"text","text":"Warm up first. "},
                {"type":"text","text":"Then squat."}]}}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("Warm up first. Then squat."));
    }

    #[test]
    fn test_empty_response_is_none() {
        let parsed: ChatResponseBody =
            serde_json::from_str(r#"{"message":{"content":[]}}"#).unwrap();
        assert_eq!(parsed.into_text(), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let client = CohereClient::new(&Chat {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "command-r-plus".to_string(),
            api_key: None,
        });
        assert!(matches!(
            client.reply("hello").await,
            Err(UpstreamError::NotConfigured(_))
        ));
    }
}
