//! Provider 适配层 — 通过 trait 实现多厂商 API 适配的动态分发
//!
//! Provider descriptors and the adapter abstraction.
//! Uses `Arc<dyn ProviderAdapter>` for runtime polymorphism so the dispatch
//! engine can walk heterogeneous backends through one interface. Adapters
//! compose a shared helper ([`bearer::BearerCaller`] or the signing module)
//! instead of extending a base type.

pub mod bearer;
pub mod hunyuan;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::ProviderSettings;
use crate::context::RequestContext;
use crate::error::AdapterError;
use crate::types::{UnifiedRequest, UnifiedResponse};
use crate::{Error, ErrorContext};

pub use bearer::{BearerAdapter, BearerCaller};
pub use hunyuan::HunyuanAdapter;

/// Fallback `max_tokens` when the request leaves it unset.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// One value per upstream backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Tencent,
    DeepSeek,
    AimlApi,
    AiTools,
    Groq,
    Xunfei,
    Baidu,
    Bytedance,
    SiliconFlow,
    Together,
    OpenRouter,
}

/// How an adapter authenticates and shapes its wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterFamily {
    /// OpenAI-compatible body, `Authorization: Bearer <key>`.
    Bearer,
    /// Backend-native body, TC3 canonical-request signature per call.
    Signed,
}

/// Named credential slots a provider may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialField {
    ApiKey,
    SecretId,
    SecretKey,
    AppId,
}

impl CredentialField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialField::ApiKey => "api_key",
            CredentialField::SecretId => "secret_id",
            CredentialField::SecretKey => "secret_key",
            CredentialField::AppId => "app_id",
        }
    }
}

impl ProviderKind {
    /// Every known kind, in default precedence order.
    pub const ALL: [ProviderKind; 11] = [
        ProviderKind::Tencent,
        ProviderKind::DeepSeek,
        ProviderKind::AimlApi,
        ProviderKind::AiTools,
        ProviderKind::Groq,
        ProviderKind::Xunfei,
        ProviderKind::Baidu,
        ProviderKind::Bytedance,
        ProviderKind::SiliconFlow,
        ProviderKind::Together,
        ProviderKind::OpenRouter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Tencent => "tencent",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::AimlApi => "aimlapi",
            ProviderKind::AiTools => "aitools",
            ProviderKind::Groq => "groq",
            ProviderKind::Xunfei => "xunfei",
            ProviderKind::Baidu => "baidu",
            ProviderKind::Bytedance => "bytedance",
            ProviderKind::SiliconFlow => "siliconflow",
            ProviderKind::Together => "together",
            ProviderKind::OpenRouter => "openrouter",
        }
    }

    pub fn family(&self) -> AdapterFamily {
        match self {
            ProviderKind::Tencent => AdapterFamily::Signed,
            _ => AdapterFamily::Bearer,
        }
    }

    /// Fields that must all be non-empty for the provider to be usable.
    pub fn required_credentials(&self) -> &'static [CredentialField] {
        match self {
            ProviderKind::Tencent => &[CredentialField::SecretId, CredentialField::SecretKey],
            ProviderKind::Xunfei => &[CredentialField::ApiKey, CredentialField::AppId],
            ProviderKind::Baidu => &[CredentialField::ApiKey, CredentialField::SecretKey],
            _ => &[CredentialField::ApiKey],
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::Tencent => "https://hunyuan.tencentcloudapi.com",
            ProviderKind::DeepSeek => "https://api.deepseek.com/v1",
            ProviderKind::AimlApi => "https://api.aimlapi.com/v1",
            ProviderKind::AiTools => "https://api.aitools.cfd/v1",
            ProviderKind::Groq => "https://api.groq.com/openai/v1",
            ProviderKind::Xunfei => "https://spark-api-open.xf-yun.com/v1",
            ProviderKind::Baidu => "https://qianfan.baidubce.com/v2",
            ProviderKind::Bytedance => "https://ark.cn-beijing.volces.com/api/v3",
            ProviderKind::SiliconFlow => "https://api.siliconflow.cn/v1",
            ProviderKind::Together => "https://api.together.xyz/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Model substituted for `"auto"` when settings do not name one.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Tencent => Some("hunyuan-lite"),
            ProviderKind::DeepSeek => Some("deepseek-chat"),
            ProviderKind::AimlApi => Some("gpt-3.5-turbo"),
            _ => None,
        }
    }

    /// Advertised models for discovery endpoints.
    pub fn catalog_models(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Tencent => &["hunyuan-lite", "hunyuan-standard"],
            ProviderKind::DeepSeek => &["deepseek-chat", "deepseek-coder"],
            ProviderKind::AimlApi => &["gpt-3.5-turbo", "gpt-4", "claude-3"],
            _ => &["auto"],
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProviderKind::Tencent => "Tencent Hunyuan, stable regional access",
            ProviderKind::DeepSeek => "DeepSeek, strong general-purpose models",
            ProviderKind::AimlApi => "AIMLAPI aggregator, multiple model families",
            _ => "Automatic model selection",
        }
    }

    /// Environment variable prefix, e.g. `DEEPSEEK` for `DEEPSEEK_API_KEY`.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Tencent => "TENCENT",
            ProviderKind::DeepSeek => "DEEPSEEK",
            ProviderKind::AimlApi => "AIMLAPI",
            ProviderKind::AiTools => "AITOOLS",
            ProviderKind::Groq => "GROQ",
            ProviderKind::Xunfei => "XUNFEI",
            ProviderKind::Baidu => "BAIDU",
            ProviderKind::Bytedance => "BYTEDANCE",
            ProviderKind::SiliconFlow => "SILICONFLOW",
            ProviderKind::Together => "TOGETHER",
            ProviderKind::OpenRouter => "OPENROUTER",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ProviderKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    format!("unknown provider '{}'", needle),
                    ErrorContext::new().with_source("provider_kind"),
                )
            })
    }
}

/// Immutable description of one configured backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub base_endpoint: String,
    credentials: BTreeMap<CredentialField, String>,
    pub model: Option<String>,
    pub region: Option<String>,
}

impl ProviderDescriptor {
    pub fn new(kind: ProviderKind, base_endpoint: impl Into<String>) -> Self {
        Self {
            kind,
            base_endpoint: base_endpoint.into(),
            credentials: BTreeMap::new(),
            model: None,
            region: None,
        }
    }

    /// Build from settings, filling in the kind's default endpoint.
    pub fn from_settings(kind: ProviderKind, settings: &ProviderSettings) -> Self {
        let base_endpoint = settings
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(kind.default_base_url())
            .trim_end_matches('/')
            .to_string();

        let mut descriptor = Self::new(kind, base_endpoint);
        for field in [
            CredentialField::ApiKey,
            CredentialField::SecretId,
            CredentialField::SecretKey,
            CredentialField::AppId,
        ] {
            if let Some(value) = settings.credential(field) {
                descriptor.credentials.insert(field, value.to_string());
            }
        }
        descriptor.model = settings.model.clone().filter(|m| !m.trim().is_empty());
        descriptor.region = settings.region.clone().filter(|r| !r.trim().is_empty());
        descriptor
    }

    pub fn with_credential(mut self, field: CredentialField, value: impl Into<String>) -> Self {
        self.credentials.insert(field, value.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Non-empty credential value.
    pub fn credential(&self, field: CredentialField) -> Option<&str> {
        self.credentials
            .get(&field)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn missing_credentials(&self) -> Vec<CredentialField> {
        self.kind
            .required_credentials()
            .iter()
            .copied()
            .filter(|f| self.credential(*f).is_none())
            .collect()
    }

    /// All required credential fields are non-empty.
    pub fn is_available(&self) -> bool {
        self.kind
            .required_credentials()
            .iter()
            .all(|f| self.credential(*f).is_some())
    }

    /// Model to put on the wire for this request.
    pub fn resolve_model(&self, request: &UnifiedRequest) -> String {
        if !request.wants_auto_model() {
            return request.model.clone();
        }
        self.model
            .clone()
            .or_else(|| self.kind.default_model().map(String::from))
            .unwrap_or_else(|| request.model.clone())
    }

    pub fn resolve_max_tokens(&self, request: &UnifiedRequest) -> u32 {
        request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let present: Vec<&str> = self
            .credentials
            .keys()
            .filter(|k| self.credential(**k).is_some())
            .map(|k| k.as_str())
            .collect();
        f.debug_struct("ProviderDescriptor")
            .field("kind", &self.kind)
            .field("base_endpoint", &self.base_endpoint)
            .field("credentials", &present)
            .field("model", &self.model)
            .field("region", &self.region)
            .finish()
    }
}

/// Capability set every backend adapter implements.
///
/// Implementations must be safe for concurrent use: they hold no per-call
/// mutable state beyond a shared HTTP transport.
#[async_trait]
pub trait ProviderAdapter: Send + Sync + std::fmt::Debug {
    /// Which backend this adapter talks to.
    fn identity(&self) -> ProviderKind;

    /// Cheap, side-effect-free credential check.
    fn is_available(&self) -> bool;

    /// One attempt against the backend. No retries happen inside.
    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &UnifiedRequest,
    ) -> Result<UnifiedResponse, AdapterError>;
}
