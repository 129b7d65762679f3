//! Prompt-template helpers layered on [`Gateway::generate_text`].

use crate::context::RequestContext;
use crate::types::{Message, UnifiedRequest, Usage};
use crate::Result;

use super::core::Gateway;

const TEST_ENGINEER_ROLE: &str =
    "You are a professional software test engineer who writes high-quality test cases.";
const CODE_REVIEWER_ROLE: &str =
    "You are a senior code reviewer who is good at finding problems and improvements in code.";
const CONTENT_CREATOR_ROLE: &str =
    "You are a professional content creator experienced with many kinds of writing.";

/// First choice of a chat turn plus token usage.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub message: Message,
    pub usage: Usage,
    pub model: String,
}

fn templated(system: &str, prompt: String, temperature: f64, max_tokens: u32) -> UnifiedRequest {
    UnifiedRequest::new(vec![Message::system(system), Message::user(prompt)])
        .with_temperature(temperature)
        .with_max_tokens(max_tokens)
}

fn test_cases_prompt(code: &str, language: &str, test_type: &str) -> String {
    format!(
        "Generate {test_type} test cases for the following {language} code:\n\n\
         Code:\n{code}\n\n\
         Requirements:\n\
         1. Produce complete, runnable test code\n\
         2. Cover boundary conditions\n\
         3. Cover error and exception paths\n\
         4. Use an appropriate test framework\n\
         5. Comment the test code\n\n\
         Return only the test code without further explanation."
    )
}

fn analysis_prompt(code: &str, language: &str) -> String {
    format!(
        "Analyze the following {language} code:\n\n\
         Code:\n{code}\n\n\
         Cover these aspects:\n\
         1. Code quality and readability\n\
         2. Potential security issues\n\
         3. Performance improvements\n\
         4. Style and convention problems\n\
         5. Concrete suggestions\n\n\
         Provide a detailed analysis report."
    )
}

fn content_prompt(content_type: &str, topic: &str, requirements: &str) -> String {
    format!(
        "Write {content_type} content.\n\n\
         Topic: {topic}\n\
         Requirements: {requirements}\n\n\
         Produce high-quality content that meets the requirements."
    )
}

impl Gateway {
    /// Single user turn; returns the first choice's text.
    pub async fn generate(&self, ctx: &RequestContext, prompt: &str) -> Result<String> {
        let request = UnifiedRequest::from_prompt(prompt)
            .with_temperature(0.7)
            .with_max_tokens(1000);
        self.first_text(ctx, &request).await
    }

    /// Multi-turn chat; returns the first choice's message with usage.
    pub async fn chat(&self, ctx: &RequestContext, messages: Vec<Message>) -> Result<ChatReply> {
        let request = UnifiedRequest::new(messages);
        let resp = self.generate_text(ctx, &request).await?;
        let usage = resp.usage;
        let model = resp.model.clone();
        // Dispatch only reports success with at least one choice.
        let message = resp
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .unwrap_or_else(|| Message::assistant(""));
        Ok(ChatReply {
            message,
            usage,
            model,
        })
    }

    pub async fn generate_test_cases(
        &self,
        ctx: &RequestContext,
        code: &str,
        language: &str,
        test_type: &str,
    ) -> Result<String> {
        let request = templated(
            TEST_ENGINEER_ROLE,
            test_cases_prompt(code, language, test_type),
            0.7,
            2000,
        );
        self.first_text(ctx, &request).await
    }

    pub async fn analyze_code(
        &self,
        ctx: &RequestContext,
        code: &str,
        language: &str,
    ) -> Result<String> {
        let request = templated(CODE_REVIEWER_ROLE, analysis_prompt(code, language), 0.3, 3000);
        self.first_text(ctx, &request).await
    }

    pub async fn generate_content(
        &self,
        ctx: &RequestContext,
        content_type: &str,
        topic: &str,
        requirements: &str,
    ) -> Result<String> {
        let request = templated(
            CONTENT_CREATOR_ROLE,
            content_prompt(content_type, topic, requirements),
            0.8,
            2000,
        );
        self.first_text(ctx, &request).await
    }

    async fn first_text(&self, ctx: &RequestContext, request: &UnifiedRequest) -> Result<String> {
        let resp = self.generate_text(ctx, request).await?;
        Ok(resp.first_content().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayBuilder;
    use crate::provider::mock::{call_log, Script, ScriptedAdapter};
    use crate::provider::ProviderKind;

    fn gateway(script: Script) -> Gateway {
        let log = call_log();
        GatewayBuilder::new()
            .adapters(vec![ScriptedAdapter::new(ProviderKind::DeepSeek, script, &log)])
            .build()
            .unwrap()
    }

    #[test]
    fn test_templates_carry_parameters() {
        let req = templated(CODE_REVIEWER_ROLE, analysis_prompt("fn main() {}", "Rust"), 0.3, 3000);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].content, CODE_REVIEWER_ROLE);
        assert!(req.messages[1].content.contains("Rust"));
        assert!(req.messages[1].content.contains("fn main() {}"));
        assert_eq!(req.temperature, 0.3);
        assert_eq!(req.max_tokens, Some(3000));
        assert!(req.wants_auto_model());

        let p = test_cases_prompt("x", "Go", "unit");
        assert!(p.starts_with("Generate unit test cases for the following Go code"));
        let p = content_prompt("blog", "Rust", "short");
        assert!(p.contains("Topic: Rust"));
    }

    #[tokio::test]
    async fn test_generate_returns_first_text() {
        let gw = gateway(Script::Reply("hello"));
        let ctx = RequestContext::new();
        assert_eq!(gw.generate(&ctx, "hi").await.unwrap(), "hello");
        assert_eq!(gw.analyze_code(&ctx, "x", "Rust").await.unwrap(), "hello");
        assert_eq!(
            gw.generate_test_cases(&ctx, "x", "Rust", "unit").await.unwrap(),
            "hello"
        );
        assert_eq!(
            gw.generate_content(&ctx, "blog", "t", "r").await.unwrap(),
            "hello"
        );
    }

    #[tokio::test]
    async fn test_chat_returns_message() {
        let gw = gateway(Script::Reply("pong"));
        let reply = gw
            .chat(&RequestContext::new(), vec![Message::user("ping")])
            .await
            .unwrap();
        assert_eq!(reply.message, Message::assistant("pong"));
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let gw = gateway(Script::Status(500));
        let err = gw.generate(&RequestContext::new(), "hi").await.unwrap_err();
        assert_eq!(err.provider_failures().len(), 1);
    }
}
