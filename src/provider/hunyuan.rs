//! 腾讯混元适配器 — TC3-HMAC-SHA256 签名调用
//!
//! Signed-family adapter. Every call translates the unified request into the
//! backend's PascalCase body, signs it with a fresh timestamp and maps the
//! `{"Response": {...}}` envelope back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CredentialField, ProviderAdapter, ProviderDescriptor, ProviderKind};
use crate::context::RequestContext;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::signing::SigningContext;
use crate::transport::{HttpTransport, RawResponse};
use crate::types::{Choice, Message, MessageRole, UnifiedRequest, UnifiedResponse, Usage};

pub const ACTION: &str = "ChatCompletions";
pub const API_VERSION: &str = "2023-09-01";
pub const SERVICE: &str = "hunyuan";
pub const DEFAULT_REGION: &str = "ap-beijing";
const CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NativeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct NativeRequest<'a> {
    model: String,
    messages: Vec<NativeMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Envelope {
    response: NativeResponse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct NativeResponse {
    id: Option<String>,
    created: Option<i64>,
    choices: Vec<NativeChoice>,
    usage: NativeUsage,
    error: Option<NativeError>,
    request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NativeChoice {
    message: NativeReply,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NativeReply {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct NativeUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NativeError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: String,
}

/// Adapter for the TC3-signed Hunyuan endpoint.
#[derive(Debug, Clone)]
pub struct HunyuanAdapter {
    descriptor: ProviderDescriptor,
    transport: HttpTransport,
    clock: fn() -> DateTime<Utc>,
}

impl HunyuanAdapter {
    pub fn new(descriptor: ProviderDescriptor, transport: HttpTransport) -> Self {
        Self {
            descriptor,
            transport,
            clock: Utc::now,
        }
    }

    /// Replace the signing clock (fixed-time tests).
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    pub fn region(&self) -> &str {
        self.descriptor.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    fn encode_body(&self, request: &UnifiedRequest, model: String) -> Result<Vec<u8>, AdapterError> {
        let body = NativeRequest {
            model,
            messages: request
                .messages
                .iter()
                .map(|m| NativeMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: self.descriptor.resolve_max_tokens(request),
        };
        serde_json::to_vec(&body)
            .map_err(|e| AdapterError::new(ProviderKind::Tencent, AdapterErrorKind::Encode(e.to_string())))
    }

    /// Host header value and request path, both of which are signed.
    fn endpoint(&self) -> Result<(String, String), AdapterError> {
        let url = Url::parse(&self.descriptor.base_endpoint).map_err(|e| {
            AdapterError::new(
                ProviderKind::Tencent,
                AdapterErrorKind::Signing(format!("invalid endpoint: {}", e)),
            )
        })?;
        let host = url.host_str().ok_or_else(|| {
            AdapterError::new(
                ProviderKind::Tencent,
                AdapterErrorKind::Signing("endpoint has no host".into()),
            )
        })?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok((host, url.path().to_string()))
    }

    fn decode(&self, raw: &RawResponse, model: String, now: i64) -> Result<UnifiedResponse, AdapterError> {
        let kind = ProviderKind::Tencent;
        if !raw.is_success() {
            return Err(AdapterError::status(kind, raw.status, &raw.body));
        }

        let envelope: Envelope =
            serde_json::from_str(&raw.body).map_err(|e| AdapterError::decode(kind, e, &raw.body))?;
        let resp = envelope.response;

        if let Some(err) = resp.error {
            debug!(request_id = ?resp.request_id, "backend reported error");
            return Err(AdapterError::backend(kind, err.code, err.message));
        }
        if resp.choices.is_empty() {
            return Err(AdapterError::empty_choices(kind));
        }

        let choices = resp
            .choices
            .into_iter()
            .enumerate()
            .map(|(idx, c)| Choice {
                index: idx as u32,
                message: Message {
                    role: parse_role(&c.message.role),
                    content: c.message.content,
                },
                finish_reason: "stop".to_string(),
            })
            .collect();

        Ok(UnifiedResponse {
            id: resp
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("{}-{}", kind, now)),
            object: "chat.completion".to_string(),
            created: resp.created.unwrap_or(now),
            model,
            choices,
            usage: Usage {
                prompt_tokens: resp.usage.prompt_tokens,
                completion_tokens: resp.usage.completion_tokens,
                total_tokens: resp.usage.total_tokens,
            },
        })
    }
}

fn parse_role(role: &str) -> MessageRole {
    match role.to_ascii_lowercase().as_str() {
        "system" => MessageRole::System,
        "user" => MessageRole::User,
        _ => MessageRole::Assistant,
    }
}

#[async_trait]
impl ProviderAdapter for HunyuanAdapter {
    fn identity(&self) -> ProviderKind {
        ProviderKind::Tencent
    }

    fn is_available(&self) -> bool {
        self.descriptor.is_available()
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &UnifiedRequest,
    ) -> Result<UnifiedResponse, AdapterError> {
        let kind = ProviderKind::Tencent;
        let secret_id = self.descriptor.credential(CredentialField::SecretId).unwrap_or_default();
        let secret_key = self.descriptor.credential(CredentialField::SecretKey).unwrap_or_default();

        let model = self.descriptor.resolve_model(request);
        let payload = self.encode_body(request, model.clone())?;
        let (host, path) = self.endpoint()?;
        let now = (self.clock)();

        let signature = SigningContext::new(secret_id, secret_key, SERVICE)
            .with_header("content-type", CONTENT_TYPE)
            .with_header("host", &host)
            .with_header("x-tc-action", ACTION.to_ascii_lowercase())
            .with_canonical_uri(path)
            .with_payload(payload.clone())
            .at(now)
            .sign()
            .map_err(|e| AdapterError::new(kind, AdapterErrorKind::Signing(e.to_string())))?;

        let headers = [
            ("host", host),
            ("x-tc-action", ACTION.to_string()),
            ("x-tc-timestamp", now.timestamp().to_string()),
            ("x-tc-version", API_VERSION.to_string()),
            ("x-tc-region", self.region().to_string()),
            ("authorization", signature.authorization),
        ];

        debug!(
            provider = %kind,
            request_id = ctx.request_id(),
            model = %model,
            "sending signed chat completion"
        );

        let raw = self
            .transport
            .post_json(&self.descriptor.base_endpoint, &headers, payload)
            .await
            .map_err(|e| AdapterError::transport(kind, e))?;

        self.decode(&raw, model, now.timestamp())
    }
}
