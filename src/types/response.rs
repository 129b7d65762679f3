//! Unified generation response

use serde::{Deserialize, Serialize};

use super::message::{Message, MessageRole};

/// Normalized chat-completion response. Field names match the
/// OpenAI-compatible wire shape so bearer-family bodies decode verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub object: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub choices: Vec<Choice>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: Message,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finish_reason: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_tokens: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_tokens: u32,
}

impl UnifiedResponse {
    /// A response is only usable when it carries at least one choice.
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    pub fn first_message(&self) -> Option<&Message> {
        self.choices.first().map(|c| &c.message)
    }

    /// Text of the first choice, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.first_message().map(|m| m.content.as_str())
    }
}

impl Choice {
    pub fn assistant(index: u32, content: impl Into<String>, finish_reason: impl Into<String>) -> Self {
        Self {
            index,
            message: Message {
                role: MessageRole::Assistant,
                content: content.into(),
            },
            finish_reason: finish_reason.into(),
        }
    }
}

/// Explicit `null` decodes to the field's zero value, same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_openai_shape() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1704067200,
            "model": "deepseek-chat",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }"#;
        let resp: UnifiedResponse = serde_json::from_str(body).unwrap();
        assert!(resp.has_choices());
        assert_eq!(resp.first_content(), Some("hello"));
        assert_eq!(resp.usage.total_tokens, 4);
    }

    #[test]
    fn test_decode_sparse_body() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"hello"},"finish_reason":null}]}"#;
        let resp: UnifiedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.id, "");
        assert_eq!(resp.choices[0].finish_reason, "");
        assert_eq!(resp.usage, Usage::default());
    }

    #[test]
    fn test_decode_null_metadata() {
        let body = r#"{"id":null,"object":null,"created":null,"model":null,
            "choices":[{"message":{"role":"assistant","content":"hi"}}],
            "usage":{"prompt_tokens":null,"completion_tokens":2,"total_tokens":null}}"#;
        let resp: UnifiedResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.id, "");
        assert_eq!(resp.created, 0);
        assert_eq!(resp.model, "");
        assert_eq!(resp.usage.completion_tokens, 2);
        assert_eq!(resp.usage.total_tokens, 0);

        let resp: UnifiedResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}],"usage":null}"#)
                .unwrap();
        assert_eq!(resp.usage, Usage::default());
    }

    #[test]
    fn test_empty_choices() {
        let resp: UnifiedResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(!resp.has_choices());
        assert_eq!(resp.first_content(), None);
    }
}
