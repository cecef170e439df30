//! Conversational assistant with local fallback.
//!
//! Every call resolves to an [`AssistantReply`]; remote failures are turned
//! into [`AssistantReply::Degraded`] carrying canned text and the reason.
use crate::client::{AssistantError, ChatClient, ChatMessage};
use crate::fallback;
use crate::openai::OpenAiChatClient;
use curalink_config::AssistantConfig;
use curalink_http::HttpError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const CHAT_SYSTEM_PROMPT: &str = "You are CuraLink AI Assistant, helping patients and researchers find medical information, experts, clinical trials, and publications. Be helpful, concise, and empathetic.";
const PUBLICATION_SYSTEM_PROMPT: &str = "You are a medical expert who explains complex research in simple, patient-friendly language. Keep summaries under 100 words.";
const TRIAL_SYSTEM_PROMPT: &str = "Summarize clinical trials in clear, accessible language focusing on what patients need to know.";

pub const PUBLICATION_SUMMARY_MAX_TOKENS: u32 = 150;
pub const TRIAL_SUMMARY_MAX_TOKENS: u32 = 120;

/// Host that always needs a bearer token; proxies may not.
const OPENAI_HOST: &str = "api.openai.com";

/// Why the remote model was not used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DegradeReason {
    /// The assistant is disabled or has no usable endpoint.
    NotConfigured,
    /// A token is required but absent, blank, or an unexpanded `${VAR}`.
    MissingCredentials,
    /// The configured token cannot be sent as a header; no request was made.
    InvalidCredentials { detail: String },
    /// No response was received.
    Network { detail: String },
    /// The endpoint answered with a non-2xx status.
    Api { status: u16 },
    /// The response body had no usable content.
    Malformed { detail: String },
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::NotConfigured => f.write_str("assistant not configured"),
            DegradeReason::MissingCredentials => f.write_str("missing credentials"),
            DegradeReason::InvalidCredentials { detail } => {
                write!(f, "invalid credentials: {detail}")
            }
            DegradeReason::Network { detail } => write!(f, "network failure: {detail}"),
            DegradeReason::Api { status } => write!(f, "endpoint returned status {status}"),
            DegradeReason::Malformed { detail } => write!(f, "malformed response: {detail}"),
        }
    }
}

impl From<AssistantError> for DegradeReason {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Http(HttpError::Api { status, .. }) => DegradeReason::Api {
                status: status.as_u16(),
            },
            AssistantError::Http(HttpError::Decode(detail, _)) => {
                DegradeReason::Malformed { detail }
            }
            AssistantError::Http(HttpError::Auth(detail)) => {
                DegradeReason::InvalidCredentials { detail }
            }
            AssistantError::Http(HttpError::Url(_)) | AssistantError::Config(_) => {
                DegradeReason::NotConfigured
            }
            AssistantError::Http(other) => DegradeReason::Network {
                detail: other.to_string(),
            },
            AssistantError::Malformed(detail) => DegradeReason::Malformed { detail },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Generated { text: String, model: String },
    Degraded { text: String, reason: DegradeReason },
}

impl AssistantReply {
    pub fn text(&self) -> &str {
        match self {
            AssistantReply::Generated { text, .. } | AssistantReply::Degraded { text, .. } => text,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AssistantReply::Degraded { .. })
    }
}

#[derive(Clone)]
enum Backend {
    Ready(Arc<dyn ChatClient>),
    Unavailable(DegradeReason),
}

#[derive(Clone)]
pub struct Assistant {
    backend: Backend,
    chat_max_tokens: Option<u32>,
}

impl fmt::Debug for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match &self.backend {
            Backend::Ready(client) => format!("ready({})", client.model_name()),
            Backend::Unavailable(reason) => format!("unavailable({reason})"),
        };
        f.debug_struct("Assistant")
            .field("backend", &backend)
            .field("chat_max_tokens", &self.chat_max_tokens)
            .finish()
    }
}

fn unexpanded(token: &str) -> bool {
    token.trim().is_empty() || token.contains("${")
}

impl Assistant {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            backend: Backend::Ready(client),
            chat_max_tokens: None,
        }
    }

    /// An assistant that always answers from the canned replies.
    pub fn unavailable(reason: DegradeReason) -> Self {
        Self {
            backend: Backend::Unavailable(reason),
            chat_max_tokens: None,
        }
    }

    /// Build from settings, degrading instead of failing when the settings
    /// are unusable.
    pub fn from_config(cfg: &AssistantConfig) -> Self {
        match Self::client_from_config(cfg) {
            Ok(client) => {
                info!(endpoint = %cfg.endpoint, model = %cfg.model, "assistant.ready");
                Self::new(Arc::new(client)).with_chat_max_tokens(cfg.max_tokens)
            }
            Err(reason) => {
                warn!(%reason, "assistant.unavailable");
                Self::unavailable(reason)
            }
        }
    }

    fn client_from_config(cfg: &AssistantConfig) -> Result<OpenAiChatClient, DegradeReason> {
        if !cfg.enabled || cfg.endpoint.trim().is_empty() {
            return Err(DegradeReason::NotConfigured);
        }
        let token = match cfg.auth_token.as_deref() {
            Some(raw) if unexpanded(raw) => return Err(DegradeReason::MissingCredentials),
            Some(raw) => Some(raw.trim().to_string()),
            None if cfg.endpoint.contains(OPENAI_HOST) => {
                return Err(DegradeReason::MissingCredentials)
            }
            None => None,
        };
        let client = OpenAiChatClient::new(cfg.endpoint.trim(), cfg.model.clone(), token)
            .map_err(DegradeReason::from)?
            .with_timeout(Duration::from_secs(cfg.timeout_secs))
            .with_retries(cfg.retries);
        Ok(client)
    }

    /// Cap applied to chat replies (summaries carry their own caps).
    pub fn with_chat_max_tokens(mut self, cap: Option<u32>) -> Self {
        self.chat_max_tokens = cap;
        self
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    /// Answer `message` given the prior turns.
    pub async fn respond(&self, message: &str, history: &[ChatMessage]) -> AssistantReply {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(history.iter().filter(|m| m.role != crate::Role::System).cloned());
        messages.push(ChatMessage::user(message));

        self.generate("chat", &messages, self.chat_max_tokens, || {
            fallback::chat_fallback(message)
        })
        .await
    }

    /// Patient-friendly summary of a publication abstract.
    pub async fn summarize_publication(&self, abstract_text: &str) -> AssistantReply {
        let messages = [
            ChatMessage::system(PUBLICATION_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Simplify this medical research abstract for a patient to understand: {abstract_text}"
            )),
        ];
        self.generate(
            "summary.publication",
            &messages,
            Some(PUBLICATION_SUMMARY_MAX_TOKENS),
            || fallback::PUBLICATION_SUMMARY_UNAVAILABLE.to_string(),
        )
        .await
    }

    pub async fn summarize_trial(&self, description: &str) -> AssistantReply {
        let messages = [
            ChatMessage::system(TRIAL_SYSTEM_PROMPT),
            ChatMessage::user(format!("Summarize this clinical trial: {description}")),
        ];
        self.generate(
            "summary.trial",
            &messages,
            Some(TRIAL_SUMMARY_MAX_TOKENS),
            || fallback::TRIAL_SUMMARY_UNAVAILABLE.to_string(),
        )
        .await
    }

    async fn generate(
        &self,
        purpose: &'static str,
        messages: &[ChatMessage],
        max_tokens: Option<u32>,
        fallback: impl FnOnce() -> String,
    ) -> AssistantReply {
        let reason = match &self.backend {
            Backend::Unavailable(reason) => reason.clone(),
            Backend::Ready(client) => match client.complete(messages, max_tokens).await {
                Ok(done) => {
                    info!(purpose, model = %done.model, chars = done.text.len(), "assistant.generated");
                    return AssistantReply::Generated {
                        text: done.text,
                        model: done.model,
                    };
                }
                Err(err) => DegradeReason::from(err),
            },
        };
        warn!(purpose, %reason, "assistant.degraded");
        AssistantReply::Degraded {
            text: fallback(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AssistantConfig {
        AssistantConfig {
            endpoint: "http://localhost:8787/v1".into(),
            ..AssistantConfig::default()
        }
    }

    #[test]
    fn disabled_assistant_is_not_configured() {
        let a = Assistant::from_config(&AssistantConfig {
            enabled: false,
            ..cfg()
        });
        assert!(!a.is_available());
    }

    #[test]
    fn proxy_endpoint_needs_no_token() {
        assert!(Assistant::client_from_config(&cfg()).is_ok());
    }

    #[test]
    fn hosted_endpoint_without_token_is_missing_credentials() {
        let err = Assistant::client_from_config(&AssistantConfig::default()).unwrap_err();
        assert_eq!(err, DegradeReason::MissingCredentials);
    }

    #[test]
    fn unexpanded_placeholder_is_missing_credentials() {
        let err = Assistant::client_from_config(&AssistantConfig {
            auth_token: Some("${OPENAI_API_KEY}".into()),
            ..cfg()
        })
        .unwrap_err();
        assert_eq!(err, DegradeReason::MissingCredentials);
    }

    #[test]
    fn invalid_endpoint_is_not_configured() {
        let err = Assistant::client_from_config(&AssistantConfig {
            endpoint: "not a url".into(),
            ..cfg()
        })
        .unwrap_err();
        assert_eq!(err, DegradeReason::NotConfigured);
    }

    #[tokio::test]
    async fn unavailable_trial_summary_uses_short_fallback() {
        let a = Assistant::unavailable(DegradeReason::NotConfigured);
        let reply = a.summarize_trial("anything").await;
        assert_eq!(
            reply,
            AssistantReply::Degraded {
                text: "Summary not available.".into(),
                reason: DegradeReason::NotConfigured,
            }
        );
    }
}
