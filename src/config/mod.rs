//! 网关配置快照 — YAML 文件与环境变量
//!
//! Static configuration snapshot for the gateway.
//!
//! A [`GatewayConfig`] is read once (YAML, environment, or any key lookup) and
//! handed to the registry. Nothing re-reads it after construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::provider::{CredentialField, ProviderKind};
use crate::{Error, ErrorContext};

pub const ENV_HTTP_TIMEOUT_SECS: &str = "AI_GATEWAY_HTTP_TIMEOUT_SECS";
pub const ENV_HTTP_POOL_MAX_IDLE_PER_HOST: &str = "AI_GATEWAY_HTTP_POOL_MAX_IDLE_PER_HOST";
pub const ENV_HTTP_POOL_IDLE_TIMEOUT_SECS: &str = "AI_GATEWAY_HTTP_POOL_IDLE_TIMEOUT_SECS";
pub const ENV_PROXY_URL: &str = "AI_GATEWAY_PROXY_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        let context = match &err {
            ConfigError::Io { path, .. } => ErrorContext::new().with_field_path(path.clone()),
            ConfigError::InvalidValue { key, .. } => ErrorContext::new().with_field_path(key.clone()),
            ConfigError::Yaml(_) => ErrorContext::new(),
        };
        Error::configuration_with_context(err.to_string(), context.with_source("config_loader"))
    }
}

/// Per-provider credentials and overrides. Every field is optional; which
/// ones are required depends on the provider kind.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
    pub app_id: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub region: Option<String>,
}

impl ProviderSettings {
    /// Credential value by slot, treating blank strings as absent.
    pub fn credential(&self, field: CredentialField) -> Option<&str> {
        let value = match field {
            CredentialField::ApiKey => self.api_key.as_deref(),
            CredentialField::SecretId => self.secret_id.as_deref(),
            CredentialField::SecretKey => self.secret_key.as_deref(),
            CredentialField::AppId => self.app_id.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn is_empty(&self) -> bool {
        *self == ProviderSettings::default()
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(v: &Option<String>) -> Option<&'static str> {
            v.as_ref().map(|_| "<redacted>")
        }
        f.debug_struct("ProviderSettings")
            .field("api_key", &redact(&self.api_key))
            .field("secret_id", &redact(&self.secret_id))
            .field("secret_key", &redact(&self.secret_key))
            .field("app_id", &redact(&self.app_id))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("region", &self.region)
            .finish()
    }
}

/// Knobs for the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
    pub proxy_url: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            pool_max_idle_per_host: 32,
            pool_idle_timeout_secs: 90,
            proxy_url: None,
        }
    }
}

impl HttpSettings {
    /// Apply `AI_GATEWAY_*` overrides from `lookup`. Unparseable numbers are errors.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.timeout_secs = parse_number(ENV_HTTP_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(ENV_HTTP_POOL_MAX_IDLE_PER_HOST) {
            self.pool_max_idle_per_host = parse_number(ENV_HTTP_POOL_MAX_IDLE_PER_HOST, &v)?;
        }
        if let Some(v) = lookup(ENV_HTTP_POOL_IDLE_TIMEOUT_SECS) {
            self.pool_idle_timeout_secs = parse_number(ENV_HTTP_POOL_IDLE_TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(ENV_PROXY_URL).filter(|v| !v.trim().is_empty()) {
            self.proxy_url = Some(v);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Whole-gateway configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub providers: BTreeMap<ProviderKind, ProviderSettings>,
    pub http: HttpSettings,
}

impl GatewayConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load YAML from disk, then apply HTTP overrides from the process environment.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml_str(&raw)?;
        config.http.apply_overrides(|k| std::env::var(k).ok())?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Assemble from `<PREFIX>_<FIELD>` keys, e.g. `DEEPSEEK_API_KEY`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = GatewayConfig::default();
        for kind in ProviderKind::ALL {
            let prefix = kind.env_prefix();
            let get = |suffix: &str| {
                lookup(format!("{}_{}", prefix, suffix).as_str()).filter(|v| !v.trim().is_empty())
            };
            let settings = ProviderSettings {
                api_key: get("API_KEY"),
                secret_id: get("SECRET_ID"),
                secret_key: get("SECRET_KEY"),
                app_id: get("APP_ID"),
                base_url: get("BASE_URL"),
                model: get("MODEL"),
                region: get("REGION"),
            };
            if !settings.is_empty() {
                config.providers.insert(kind, settings);
            }
        }
        config.http.apply_overrides(&lookup)?;
        Ok(config)
    }

    pub fn with_provider(mut self, kind: ProviderKind, settings: ProviderSettings) -> Self {
        self.providers.insert(kind, settings);
        self
    }

    /// Settings for `kind`, or empty settings when unconfigured.
    pub fn provider(&self, kind: ProviderKind) -> ProviderSettings {
        self.providers.get(&kind).cloned().unwrap_or_default()
    }
}
