//! Fire-and-forget product analytics.
//!
//! Events are POSTed as `{eventType, payload, timestamp, userId}` to a
//! configured webhook (an automation workflow, typically). Delivery problems
//! are logged and never reach the caller.
use chrono::{SecondsFormat, Utc};
use curalink_http::{HttpClient, HttpError, RequestOpts};
use reqwest::Url;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const ANONYMOUS: &str = "anonymous";
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    UserSignup,
    ExpertFollowed,
    TrialFavorited,
    PublicationSaved,
    MeetingRequested,
    ForumPostCreated,
    SearchPerformed,
    AiChatMessage,
    AccountTypeChanged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::UserSignup => "user_signup",
            EventKind::ExpertFollowed => "expert_followed",
            EventKind::TrialFavorited => "trial_favorited",
            EventKind::PublicationSaved => "publication_saved",
            EventKind::MeetingRequested => "meeting_requested",
            EventKind::ForumPostCreated => "forum_post_created",
            EventKind::SearchPerformed => "search_performed",
            EventKind::AiChatMessage => "ai_chat_message",
            EventKind::AccountTypeChanged => "account_type_changed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductEvent {
    pub kind: EventKind,
    pub payload: Value,
}

impl ProductEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }

    pub fn user_signup(profile: Value) -> Self {
        Self::new(EventKind::UserSignup, profile)
    }

    pub fn expert_followed(expert_id: &str, expert_name: &str) -> Self {
        Self::new(
            EventKind::ExpertFollowed,
            json!({ "expertId": expert_id, "expertName": expert_name }),
        )
    }

    pub fn trial_favorited(trial_id: &str, trial_title: &str) -> Self {
        Self::new(
            EventKind::TrialFavorited,
            json!({ "trialId": trial_id, "trialTitle": trial_title }),
        )
    }

    pub fn publication_saved(publication_id: &str, publication_title: &str) -> Self {
        Self::new(
            EventKind::PublicationSaved,
            json!({ "publicationId": publication_id, "publicationTitle": publication_title }),
        )
    }

    pub fn meeting_requested(expert_id: &str, expert_name: &str, details: Value) -> Self {
        Self::new(
            EventKind::MeetingRequested,
            json!({ "expertId": expert_id, "expertName": expert_name, "requestDetails": details }),
        )
    }

    pub fn forum_post_created(post_id: &str, post_title: &str, category: &str) -> Self {
        Self::new(
            EventKind::ForumPostCreated,
            json!({ "postId": post_id, "postTitle": post_title, "category": category }),
        )
    }

    pub fn search_performed(search_type: &str, query: &str, results_count: usize) -> Self {
        Self::new(
            EventKind::SearchPerformed,
            json!({ "searchType": search_type, "query": query, "resultsCount": results_count }),
        )
    }

    pub fn ai_chat_message(message: &str, response: &str) -> Self {
        Self::new(
            EventKind::AiChatMessage,
            json!({ "message": message, "response": response }),
        )
    }

    pub fn account_type_changed(from: &str, to: &str) -> Self {
        Self::new(
            EventKind::AccountTypeChanged,
            json!({ "fromType": from, "toType": to }),
        )
    }
}

/// Wire envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    event_type: &'static str,
    payload: &'a Value,
    timestamp: String,
    user_id: &'a str,
}

/// Outcome of one delivery attempt, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No webhook configured.
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    target: Option<(HttpClient, String)>,
}

impl WebhookNotifier {
    /// Notifier posting to `url`. The client is rooted at the URL's origin so
    /// the full path and query are preserved verbatim.
    pub fn new(url: &str) -> Result<Self, HttpError> {
        let parsed = Url::parse(url.trim()).map_err(|e| HttpError::Url(e.to_string()))?;
        let origin = parsed.origin().ascii_serialization();
        let mut path = parsed.path().trim_start_matches('/').to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }
        let client = HttpClient::new(&origin)?.with_timeout(WEBHOOK_TIMEOUT);
        Ok(Self {
            target: Some((client, path)),
        })
    }

    pub fn disabled() -> Self {
        Self { target: None }
    }

    /// Build from an optional configured URL. An invalid URL disables the
    /// notifier with a warning.
    pub fn from_url(url: Option<&str>) -> Self {
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            None => Self::disabled(),
            Some(u) => Self::new(u).unwrap_or_else(|e| {
                warn!(error = %e, "events.webhook.invalid_url");
                Self::disabled()
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }

    pub async fn notify(&self, event: &ProductEvent, user_id: Option<&str>) -> Delivery {
        let Some((client, path)) = &self.target else {
            debug!(event = %event.kind, "events.skipped");
            return Delivery::Skipped;
        };

        let envelope = Envelope {
            event_type: event.kind.as_str(),
            payload: &event.payload,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user_id: user_id.filter(|u| !u.is_empty()).unwrap_or(ANONYMOUS),
        };

        match client.post_discard(path, &envelope, RequestOpts::default()).await {
            Ok(status) => {
                debug!(event = %event.kind, status = status.as_u16(), "events.sent");
                Delivery::Sent
            }
            Err(e) => {
                warn!(event = %event.kind, error = %e, "events.failed");
                Delivery::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_snake_case_tag() {
        assert_eq!(
            serde_json::to_value(EventKind::AccountTypeChanged).unwrap(),
            json!("account_type_changed")
        );
        assert_eq!(EventKind::AiChatMessage.to_string(), "ai_chat_message");
    }

    #[test]
    fn url_path_and_query_are_kept() {
        let n = WebhookNotifier::new("http://localhost:5678/webhook/curalink?src=cli").unwrap();
        let (client, path) = n.target.unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5678/");
        assert_eq!(path, "webhook/curalink?src=cli");
    }

    #[test]
    fn blank_or_invalid_url_disables() {
        assert!(!WebhookNotifier::from_url(Some("  ")).is_enabled());
        assert!(!WebhookNotifier::from_url(Some("::nope")).is_enabled());
        assert!(!WebhookNotifier::from_url(None).is_enabled());
    }
}
