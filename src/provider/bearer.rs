//! Bearer-token 适配器 — OpenAI 兼容的 chat/completions 接口
//!
//! Adapter for OpenAI-compatible backends authenticated with a static key.
//! Request and response bodies use the unified field names verbatim; the
//! only translation is model and `max_tokens` resolution.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{CredentialField, ProviderAdapter, ProviderDescriptor, ProviderKind};
use crate::context::RequestContext;
use crate::error::{AdapterError, AdapterErrorKind};
use crate::transport::{HttpTransport, RawResponse};
use crate::types::{Message, UnifiedRequest, UnifiedResponse};

const CHAT_PATH: &str = "/chat/completions";

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: String,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

/// Shared POST-and-decode helper for every bearer-family backend.
#[derive(Debug, Clone)]
pub struct BearerCaller {
    transport: HttpTransport,
}

impl BearerCaller {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Encode the unified request body for `descriptor`.
    pub fn encode_body(
        descriptor: &ProviderDescriptor,
        request: &UnifiedRequest,
    ) -> Result<Vec<u8>, AdapterError> {
        let body = ChatCompletionBody {
            model: descriptor.resolve_model(request),
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: descriptor.resolve_max_tokens(request),
            stream: false,
        };
        serde_json::to_vec(&body).map_err(|e| {
            AdapterError::new(descriptor.kind, AdapterErrorKind::Encode(e.to_string()))
        })
    }

    pub async fn call(
        &self,
        ctx: &RequestContext,
        descriptor: &ProviderDescriptor,
        api_key: &str,
        request: &UnifiedRequest,
    ) -> Result<UnifiedResponse, AdapterError> {
        let kind = descriptor.kind;
        let url = format!("{}{}", descriptor.base_endpoint, CHAT_PATH);
        let body = Self::encode_body(descriptor, request)?;

        debug!(
            provider = %kind,
            request_id = ctx.request_id(),
            url = %url,
            "sending bearer chat completion"
        );

        let headers = [("authorization", format!("Bearer {}", api_key))];
        let raw = self
            .transport
            .post_json(&url, &headers, body)
            .await
            .map_err(|e| AdapterError::transport(kind, e))?;

        decode_response(kind, &raw)
    }
}

/// Map an OpenAI-compatible exchange to a unified response.
pub(crate) fn decode_response(
    kind: ProviderKind,
    raw: &RawResponse,
) -> Result<UnifiedResponse, AdapterError> {
    if !raw.is_success() {
        return Err(AdapterError::status(kind, raw.status, &raw.body));
    }

    let value: Value =
        serde_json::from_str(&raw.body).map_err(|e| AdapterError::decode(kind, e, &raw.body))?;

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let (code, message) = embedded_error(err);
        return Err(AdapterError::backend(kind, code, message));
    }

    let response: UnifiedResponse =
        serde_json::from_value(value).map_err(|e| AdapterError::decode(kind, e, &raw.body))?;

    if !response.has_choices() {
        return Err(AdapterError::empty_choices(kind));
    }
    Ok(response)
}

fn embedded_error(err: &Value) -> (Option<String>, String) {
    match err {
        Value::String(s) => (None, s.clone()),
        Value::Object(map) => {
            let message = map
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown backend error")
                .to_string();
            let code = map
                .get("code")
                .or_else(|| map.get("type"))
                .and_then(|c| match c {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                });
            (code, message)
        }
        other => (None, other.to_string()),
    }
}

/// Adapter for one bearer-family provider.
#[derive(Debug, Clone)]
pub struct BearerAdapter {
    descriptor: ProviderDescriptor,
    caller: BearerCaller,
}

impl BearerAdapter {
    pub fn new(descriptor: ProviderDescriptor, transport: HttpTransport) -> Self {
        Self {
            descriptor,
            caller: BearerCaller::new(transport),
        }
    }

    pub fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }
}

#[async_trait]
impl ProviderAdapter for BearerAdapter {
    fn identity(&self) -> ProviderKind {
        self.descriptor.kind
    }

    fn is_available(&self) -> bool {
        self.descriptor.is_available()
    }

    async fn generate(
        &self,
        ctx: &RequestContext,
        request: &UnifiedRequest,
    ) -> Result<UnifiedResponse, AdapterError> {
        let api_key = self
            .descriptor
            .credential(CredentialField::ApiKey)
            .ok_or_else(|| {
                AdapterError::backend(self.descriptor.kind, None, "api_key is not configured")
            })?;
        self.caller.call(ctx, &self.descriptor, api_key, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use mockito::{Matcher, Server};
    use tokio_test::assert_ok;

    fn adapter(kind: ProviderKind, base: &str) -> BearerAdapter {
        let descriptor = ProviderDescriptor::new(kind, base)
            .with_credential(CredentialField::ApiKey, "sk-test");
        BearerAdapter::new(
            descriptor,
            HttpTransport::new(&HttpSettings::default()).unwrap(),
        )
    }

    const OK_BODY: &str = r#"{
        "id": "chatcmpl-9",
        "object": "chat.completion",
        "created": 1704067200,
        "model": "deepseek-chat",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 2, "completion_tokens": 1, "total_tokens": 3}
    }"#;

    #[tokio::test]
    async fn test_generate_sends_bearer_and_resolved_model() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 50,
                "stream": false
            })))
            .with_status(200)
            .with_body(OK_BODY)
            .create_async()
            .await;

        let request = UnifiedRequest::from_prompt("hi").with_max_tokens(50);
        let resp = adapter(ProviderKind::DeepSeek, &server.url())
            .generate(&RequestContext::new(), &request)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resp.first_content(), Some("hello"));
        assert_eq!(resp.usage.total_tokens, 3);
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":"slow down"}"#)
            .create_async()
            .await;

        let err = adapter(ProviderKind::Groq, &server.url())
            .generate(&RequestContext::new(), &UnifiedRequest::from_prompt("hi"))
            .await
            .unwrap_err();

        assert_eq!(err.provider, ProviderKind::Groq);
        assert_eq!(err.status_code(), Some(429));
        assert!(err.to_string().contains("slow down"));
    }

    #[test]
    fn test_embedded_error_on_2xx() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"error":{"message":"insufficient balance","code":402}}"#.into(),
        };
        let err = decode_response(ProviderKind::DeepSeek, &raw).unwrap_err();
        match err.kind {
            AdapterErrorKind::Backend { code, message } => {
                assert_eq!(code.as_deref(), Some("402"));
                assert_eq!(message, "insufficient balance");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_empty_choices_and_garbage() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"choices":[]}"#.into(),
        };
        assert!(matches!(
            decode_response(ProviderKind::AimlApi, &raw).unwrap_err().kind,
            AdapterErrorKind::EmptyChoices
        ));

        let raw = RawResponse {
            status: 200,
            body: "<html>gateway</html>".into(),
        };
        assert!(matches!(
            decode_response(ProviderKind::AimlApi, &raw).unwrap_err().kind,
            AdapterErrorKind::Decode { .. }
        ));
    }

    #[test]
    fn test_null_metadata_still_decodes() {
        let raw = RawResponse {
            status: 200,
            body: r#"{"id":null,"object":null,"model":null,
                "choices":[{"index":0,"message":{"role":"assistant","content":"hi"},"finish_reason":null}],
                "usage":null}"#
                .into(),
        };
        let resp = assert_ok!(decode_response(ProviderKind::Groq, &raw));
        assert_eq!(resp.first_content(), Some("hi"));
        assert_eq!(resp.id, "");
        assert_eq!(resp.usage.total_tokens, 0);
    }

    #[test]
    fn test_encode_body_defaults() {
        let descriptor = ProviderDescriptor::new(ProviderKind::Together, "u");
        let body = BearerCaller::encode_body(&descriptor, &UnifiedRequest::from_prompt("hi")).unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["model"], "auto");
        assert_eq!(json["max_tokens"], 2000);
        assert_eq!(json["temperature"], 0.7);
    }

    #[tokio::test]
    async fn test_missing_key_is_adapter_error() {
        let descriptor = ProviderDescriptor::new(ProviderKind::Groq, "http://127.0.0.1:9");
        let adapter = BearerAdapter::new(
            descriptor,
            HttpTransport::new(&HttpSettings::default()).unwrap(),
        );
        assert!(!adapter.is_available());
        let err = adapter
            .generate(&RequestContext::new(), &UnifiedRequest::from_prompt("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.provider, ProviderKind::Groq);
    }
}
