use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use crate::config::AssistantConfig;
use crate::core::{AssistantPayload, ChatClient};
use crate::error::ClientError;

/// Body returned by the chat endpoint. `reply` is the canonical field; `text`
/// is only read for older servers that still send it.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ChatResponse {
    fn into_reply(self) -> Option<String> {
        let non_empty = |s: &String| !s.trim().is_empty();
        self.reply
            .filter(non_empty)
            .or_else(|| self.text.filter(non_empty))
    }
}

/// Delegates replies to `POST {base_url}/api/chat`
#[derive(Debug, Clone)]
pub struct HttpClient {
    endpoint: String,
    client: Client,
}

impl HttpClient {
    pub fn new(config: &AssistantConfig) -> Self {
        let endpoint = config.chat_endpoint();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Client::new()
            });

        info!(endpoint = %endpoint, timeout_secs = config.timeout.as_secs(), "Creating new chat HTTP client");
        Self { endpoint, client }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for HttpClient {
    #[instrument(skip(self, payload), fields(endpoint = %self.endpoint, message_len = payload.message.len()))]
    async fn ask(&self, payload: &AssistantPayload) -> Result<String, ClientError> {
        debug!("Sending request to chat endpoint");
        let response = self
            .client
            .post(&self.endpoint)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ClientError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from chat endpoint");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %body, "Chat endpoint error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read chat response body");
            ClientError::Http(e.to_string())
        })?;

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse chat response JSON");
            ClientError::MalformedBody(e.to_string())
        })?;

        match parsed.into_reply() {
            Some(reply) => {
                info!(reply_len = reply.len(), "Successfully received chat reply");
                Ok(reply)
            }
            None => Err(ClientError::EmptyReply),
        }
    }

    fn clone_box(&self) -> Box<dyn ChatClient> {
        Box::new(self.clone())
    }
}
