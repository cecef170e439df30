//! OpenAI-compatible `chat/completions` client.
use crate::client::{AssistantError, ChatClient, ChatMessage, Completion};
use async_trait::async_trait;
use curalink_http::{Auth, HttpClient, RequestOpts};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatClient {
    client: HttpClient,
    auth_token: Option<String>,
    model: String,
}

impl std::fmt::Debug for OpenAiChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiChatClient")
            .field("endpoint", &self.client.base_url().as_str())
            .field("model", &self.model)
            .field("auth", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAiChatClient {
    /// `endpoint` is the API root (`https://api.openai.com/v1`) or a proxy
    /// exposing the same route. Without `auth_token` no `Authorization`
    /// header is sent.
    pub fn new(
        endpoint: &str,
        model: impl Into<String>,
        auth_token: Option<String>,
    ) -> Result<Self, AssistantError> {
        let client = HttpClient::new(endpoint)?;
        Ok(Self {
            client,
            auth_token,
            model: model.into(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.client = self.client.with_retries(retries);
        self
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
    ) -> Result<Completion, AssistantError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
        };
        let opts = RequestOpts {
            auth: self.auth_token.as_deref().map(Auth::Bearer),
            ..Default::default()
        };

        debug!(model = %self.model, turns = messages.len(), ?max_tokens, "assistant.openai.request");
        let resp: ChatCompletionResponse = self
            .client
            .post_json_opts("chat/completions", &req, opts)
            .await?;

        let text = resp
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| AssistantError::Malformed("no message content in first choice".into()))?;

        Ok(Completion {
            text,
            model: resp.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_absent_token_cap() {
        let messages = [ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatCompletionRequest {
            model: "m",
            messages: &messages,
            max_tokens: None,
        })
        .unwrap();
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn debug_output_hides_the_token() {
        let client =
            OpenAiChatClient::new("http://localhost:1", "m", Some("sk-secret".into())).unwrap();
        let shown = format!("{client:?}");
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("<redacted>"));
    }
}
