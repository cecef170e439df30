//! Small JSON-over-HTTP client shared by the assistant backend and the
//! webhook notifier.
//!
//! Requests carry a per-call timeout and optional bearer auth. Token values
//! never reach the logs. Rate limits (429), 5xx responses and transport
//! failures are retried with exponential backoff, honouring `Retry-After`,
//! but only when the caller configured a retry budget.
//!
//! ```no_run
//! # async fn demo() -> Result<(), curalink_http::HttpError> {
//! use curalink_http::{HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://api.example.com/v1/")?;
//! let body = serde_json::json!({ "ping": true });
//! let got: serde_json::Value = client.post_json_opts("echo", &body, RequestOpts::default()).await?;
//! # Ok(()) }
//! ```

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const SNIPPET_LEN: usize = 500;
const BACKOFF_BASE_MS: u64 = 200;
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("unusable credentials: {0}")]
    Auth(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

impl HttpError {
    /// True when no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, HttpError::Network(_))
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// How a request authenticates.
///
/// ```
/// use curalink_http::Auth;
///
/// let bearer = Auth::Bearer("token");
/// assert!(matches!(bearer, Auth::Bearer("token")));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    Bearer(&'a str),
    None,
}

/// Per-request overrides. Unset fields fall back to the client defaults.
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn request_id(&self) -> String {
        ["x-request-id", "x-correlation-id"]
            .iter()
            .find_map(|name| self.headers.get(*name))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string()
    }

    fn into_error(self) -> HttpError {
        HttpError::Api {
            status: self.status,
            message: extract_error_message(&self.body),
            request_id: self.request_id(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    timeout: Duration,
    retries: usize,
}

impl HttpClient {
    /// A client rooted at `base`. Relative paths join underneath it, so a
    /// missing trailing slash is added.
    ///
    /// ```
    /// use curalink_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://api.example.com/v1")?;
    /// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1/");
    /// assert_eq!(client.timeout(), Duration::from_secs(15));
    /// assert_eq!(client.retries(), 0);
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let mut base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            timeout: DEFAULT_TIMEOUT,
            retries: 0,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra attempts after the first one.
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Shorthand for [`post_json_opts`](Self::post_json_opts) with only a
    /// bearer token.
    pub async fn post_json<B, T>(
        &self,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let opts = RequestOpts {
            auth: bearer.map(Auth::Bearer),
            ..Default::default()
        };
        self.post_json_opts(path, body, opts).await
    }

    /// POST `body` and decode the JSON response.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let reply = self.send(Method::POST, path, Some(body), &opts).await?;
        serde_json::from_slice(&reply.body).map_err(|e| {
            let snippet = snip_body(&reply.body);
            warn!(
                serde_err = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// POST `body` and ignore whatever comes back, for endpoints that answer
    /// with plain text or nothing.
    pub async fn post_discard<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<StatusCode, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let reply = self.send(Method::POST, path, Some(body), &opts).await?;
        Ok(reply.status)
    }

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: &RequestOpts<'_>,
    ) -> Result<Reply, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))?;
        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        let token = match &opts.auth {
            Some(Auth::Bearer(raw)) => Some(sanitize_api_key(raw)?),
            _ => None,
        };
        let timeout = opts.timeout.unwrap_or(self.timeout);
        let budget = opts.retries.unwrap_or(self.retries);
        let req_id = format!("r{}", Uuid::new_v4().simple());

        let mut attempt = 0usize;
        loop {
            let mut request = self.inner.request(method.clone(), url.clone()).timeout(timeout);
            if let Some(headers) = &opts.headers {
                request = request.headers(headers.clone());
            }
            if let Some(bytes) = &payload {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes.clone());
            }
            if let Some(token) = &token {
                request = request.bearer_auth(token);
            }

            debug!(
                %req_id,
                attempt = attempt + 1,
                %method,
                path = url.path(),
                authed = token.is_some(),
                "http.request.start"
            );
            let started = Instant::now();
            let outcome = match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let headers = resp.headers().clone();
                    match resp.bytes().await {
                        Ok(bytes) => Ok(Reply {
                            status,
                            headers,
                            body: bytes.to_vec(),
                        }),
                        Err(e) => Err(e.to_string()),
                    }
                }
                Err(e) => Err(e.to_string()),
            };
            let retry_left = attempt < budget;
            attempt += 1;

            let reply = match outcome {
                Ok(reply) => reply,
                Err(message) if retry_left => {
                    let delay = backoff_delay(attempt);
                    warn!(%req_id, attempt, backoff_ms = delay.as_millis() as u64, %message, "http.retrying.network");
                    sleep(delay).await;
                    continue;
                }
                Err(message) => {
                    warn!(%req_id, attempt, %message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };

            debug!(
                %req_id,
                status = %reply.status,
                duration_ms = started.elapsed().as_millis() as u64,
                body_len = reply.body.len(),
                "http.response"
            );

            if reply.status.is_success() {
                return Ok(reply);
            }
            if retry_left && is_retryable(reply.status) {
                let delay = retry_delay(&reply, attempt);
                warn!(%req_id, status = %reply.status, attempt, backoff_ms = delay.as_millis() as u64, "http.retrying");
                sleep(delay).await;
                continue;
            }

            let err = reply.into_error();
            warn!(%req_id, error = %err, "http.error");
            return Err(err);
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff_delay(attempt: usize) -> Duration {
    let shift = attempt.saturating_sub(1).min(10) as u32;
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(1u64 << shift))
}

/// `Retry-After` seconds when the server sent them, otherwise backoff. Rate
/// limits wait at least [`RATE_LIMIT_FLOOR`].
fn retry_delay(reply: &Reply, attempt: usize) -> Duration {
    let advertised = reply
        .headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    match advertised {
        Some(secs) => Duration::from_secs(secs),
        None if reply.status == StatusCode::TOO_MANY_REQUESTS => {
            backoff_delay(attempt).max(RATE_LIMIT_FLOOR)
        }
        None => backoff_delay(attempt),
    }
}

/// Best human-readable message from the usual error body shapes.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorBody {
        Nested { error: Nested },
        Flat {
            #[serde(default)]
            message: String,
            #[serde(default)]
            detail: String,
            #[serde(default)]
            error: String,
        },
    }
    #[derive(Deserialize)]
    struct Nested {
        message: String,
    }

    let found = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => Some(error.message),
        Ok(ErrorBody::Flat {
            message,
            detail,
            error,
        }) => [message, detail, error].into_iter().find(|s| !s.is_empty()),
        Err(_) => None,
    };
    found.unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= SNIPPET_LEN {
        return text.into_owned();
    }
    let mut cut = SNIPPET_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

/// Strip quotes and whitespace that sneak in from env files, then make sure
/// the result is a valid header value.
fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if token.is_empty() {
        return Err(HttpError::Auth("API key is empty".into()));
    }
    if !token.is_ascii() || token.bytes().any(|b| b.is_ascii_control()) {
        return Err(HttpError::Auth(
            "API key contains non-printable characters".into(),
        ));
    }
    HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|e| HttpError::Auth(format!("invalid Authorization header: {e}")))?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_quotes_and_whitespace() {
        assert_eq!(sanitize_api_key(" \"sk-abc\n\" ").unwrap(), "sk-abc");
        assert!(sanitize_api_key("   ").is_err());
        assert!(matches!(sanitize_api_key("sk-é"), Err(HttpError::Auth(_))));
    }

    #[test]
    fn error_message_prefers_nested_envelope() {
        let body = br#"{"error":{"message":"invalid api key","type":"auth"}}"#;
        assert_eq!(extract_error_message(body), "invalid api key");

        let flat = br#"{"detail":"slow down"}"#;
        assert_eq!(extract_error_message(flat), "slow down");

        assert_eq!(extract_error_message(b"gateway exploded"), "gateway exploded");
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(1), Duration::from_millis(200));
        assert_eq!(backoff_delay(2), Duration::from_millis(400));
        assert_eq!(backoff_delay(3), Duration::from_millis(800));
    }

    #[test]
    fn rate_limits_wait_at_least_the_floor() {
        let reply = Reply {
            status: StatusCode::TOO_MANY_REQUESTS,
            headers: HeaderMap::new(),
            body: Vec::new(),
        };
        assert_eq!(retry_delay(&reply, 1), RATE_LIMIT_FLOOR);

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        let reply = Reply { headers, ..reply };
        assert_eq!(retry_delay(&reply, 1), Duration::from_secs(3));
    }

    #[test]
    fn base_gains_trailing_slash() {
        let client = HttpClient::new("http://localhost:8080/v1?x=1").unwrap();
        assert_eq!(client.base_url().path(), "/v1/");
    }

    #[test]
    fn snippet_is_truncated_on_char_boundary() {
        let body = "é".repeat(400);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_LEN + 3);
    }
}
