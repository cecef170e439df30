//! Loader for CuraLink configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults (every section is optional)
//! 2. an optional `curalink.yaml` file, or inline YAML in tests
//! 3. `CURALINK__`-prefixed environment variables, `__` separating levels
//!    (`CURALINK__ASSISTANT__MODEL=gpt-4o-mini`)
//!
//! String values may reference environment variables as `${VAR}`; these are
//! expanded after merging, so secrets never need to live in the file itself.
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://curalink.db";
pub const DEFAULT_ASSISTANT_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CuralinkConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Artificial latency applied to every mock lookup.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

/// Remote text-generation settings.
///
/// `endpoint` may point at a proxy that injects the credential server-side,
/// in which case `auth_token` stays unset and no `Authorization` header is
/// sent.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_enabled")]
    pub enabled: bool,
    #[serde(default = "default_assistant_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_assistant_model")]
    pub model: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: default_assistant_enabled(),
            endpoint: default_assistant_endpoint(),
            model: default_assistant_model(),
            auth_token: None,
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
            retries: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            filter: default_log_filter(),
            log_dir: None,
            stderr: false,
        }
    }
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.into()
}
fn default_latency_ms() -> u64 {
    500
}
fn default_assistant_enabled() -> bool {
    true
}
fn default_assistant_endpoint() -> String {
    DEFAULT_ASSISTANT_ENDPOINT.into()
}
fn default_assistant_model() -> String {
    DEFAULT_ASSISTANT_MODEL.into()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_log_format() -> String {
    "text".into()
}
fn default_log_filter() -> String {
    "info".into()
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct CuralinkConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for CuralinkConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CuralinkConfigLoader {
    /// Start with defaults; `CURALINK__` environment overrides are applied last.
    ///
    /// ```
    /// use curalink_config::CuralinkConfigLoader;
    ///
    /// let config = CuralinkConfigLoader::new()
    ///     .with_yaml_str("version: '1'\nsearch:\n  latency_ms: 0")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.search.latency_ms, 0);
    /// assert_eq!(config.assistant.model, "gpt-3.5-turbo");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: "CURALINK".to_string(),
        }
    }

    /// Use a different environment prefix (tests use this to stay isolated).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so a bare environment is enough.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use curalink_config::CuralinkConfigLoader;
    ///
    /// temp_env::with_var("DOCTEST_OPENAI_KEY", Some("injected-from-env"), || {
    ///     let config = CuralinkConfigLoader::new()
    ///         .with_yaml_str(r#"
    /// assistant:
    ///   model: "gpt-4o-mini"
    ///   auth_token: "${DOCTEST_OPENAI_KEY}"
    /// "#)
    ///         .load()
    ///         .expect("valid configuration");
    ///
    ///     assert_eq!(config.assistant.model, "gpt-4o-mini");
    ///     assert_eq!(config.assistant.auth_token.as_deref(), Some("injected-from-env"));
    ///     assert_eq!(config.assistant.endpoint, "https://api.openai.com/v1");
    /// });
    /// ```
    pub fn load(self) -> Result<CuralinkConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("CURALINK_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${CURALINK_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_inside_nested_sections() {
        temp_env::with_vars(
            [("CL_HOST", Some("proxy.local")), ("CL_PORT", Some("8080"))],
            || {
                let mut v = json!({
                    "assistant": { "endpoint": "http://${CL_HOST}:${CL_PORT}/v1" },
                    "search": { "latency_ms": 10 }
                });
                expand_env_in_value(&mut v);
                assert_eq!(v["assistant"]["endpoint"], "http://proxy.local:8080/v1");
                assert_eq!(v["search"]["latency_ms"], 10);
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars([("CL_A", Some("${CL_B}")), ("CL_B", Some("${CL_A}"))], || {
            let mut v = json!("x=${CL_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${CURALINK_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${CURALINK_DOES_NOT_EXIST}"));
    }

    #[test]
    fn empty_sources_yield_defaults() {
        let cfg = CuralinkConfigLoader::new()
            .with_env_prefix("CURALINK_EMPTY_TEST")
            .load()
            .unwrap();
        assert_eq!(cfg.storage.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.search.latency_ms, 500);
        assert!(cfg.assistant.enabled);
        assert!(cfg.assistant.auth_token.is_none());
        assert_eq!(cfg.assistant.retries, 0);
        assert!(cfg.events.webhook_url.is_none());
        assert_eq!(cfg.logging.filter, "info");
    }
}
