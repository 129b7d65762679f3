//! Unified generation request

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::{Error, ErrorContext, Result};

/// Model name that lets each provider pick its own default model.
pub const AUTO_MODEL: &str = "auto";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Provider-agnostic "generate text" request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRequest {
    #[serde(default = "default_model")]
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// `None` means "use the provider's default".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

fn default_model() -> String {
    AUTO_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl UnifiedRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            model: default_model(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            stream: false,
        }
    }

    /// Single user turn.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::new(vec![Message::user(prompt)])
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// True when the caller left model choice to the provider.
    pub fn wants_auto_model(&self) -> bool {
        let m = self.model.trim();
        m.is_empty() || m.eq_ignore_ascii_case(AUTO_MODEL)
    }

    /// Check the request invariants before any provider is contacted.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(Error::validation_with_context(
                "messages must not be empty",
                ErrorContext::new()
                    .with_field_path("request.messages")
                    .with_source("request_validator"),
            ));
        }

        if !self.temperature.is_finite()
            || self.temperature < MIN_TEMPERATURE
            || self.temperature > MAX_TEMPERATURE
        {
            return Err(Error::validation_with_context(
                format!("temperature {} is out of range", self.temperature),
                ErrorContext::new()
                    .with_field_path("request.temperature")
                    .with_details(format!("expected {MIN_TEMPERATURE}..={MAX_TEMPERATURE}"))
                    .with_source("request_validator"),
            ));
        }

        if self.max_tokens == Some(0) {
            return Err(Error::validation_with_context(
                "max_tokens must be greater than zero",
                ErrorContext::new()
                    .with_field_path("request.max_tokens")
                    .with_source("request_validator"),
            ));
        }

        if self.stream {
            return Err(Error::validation_with_context(
                "streaming responses are not supported by the gateway",
                ErrorContext::new()
                    .with_field_path("request.stream")
                    .with_source("request_validator"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_defaults_from_json() {
        let req: UnifiedRequest =
            serde_json::from_str(r#"{"messages":[{"role":"user","content":"hi"}]}"#).unwrap();
        assert_eq!(req.model, "auto");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_tokens, None);
        assert!(!req.stream);
        assert!(req.wants_auto_model());
        assert_ok!(req.validate());
    }

    #[test]
    fn test_empty_messages_rejected() {
        let err = assert_err!(UnifiedRequest::new(vec![]).validate());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("request.messages")
        );
    }

    #[test]
    fn test_temperature_bounds() {
        let base = UnifiedRequest::from_prompt("hi");
        assert_ok!(base.clone().with_temperature(0.0).validate());
        assert_ok!(base.clone().with_temperature(2.0).validate());
        assert_err!(base.clone().with_temperature(2.01).validate());
        assert_err!(base.clone().with_temperature(-0.1).validate());
        assert_err!(base.with_temperature(f64::NAN).validate());
    }

    #[test]
    fn test_zero_max_tokens_and_stream_rejected() {
        assert_err!(UnifiedRequest::from_prompt("hi").with_max_tokens(0).validate());
        let mut req = UnifiedRequest::from_prompt("hi");
        req.stream = true;
        assert_err!(req.validate());
    }

    #[test]
    fn test_explicit_model_is_not_auto() {
        let req = UnifiedRequest::from_prompt("hi").with_model("deepseek-chat");
        assert!(!req.wants_auto_model());
        assert!(UnifiedRequest::from_prompt("hi").with_model("AUTO").wants_auto_model());
    }
}
