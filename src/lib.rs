//! # ai-gateway
//!
//! 多厂商大模型网关：固定优先级选择、逐个故障转移、统一请求/响应格式。
//!
//! Provider-agnostic text generation gateway. One unified request goes in;
//! the gateway picks configured backends by fixed precedence, tries them one
//! at a time and returns the first usable response or a typed error.
//!
//! ## Core Philosophy
//!
//! - **Static configuration**: providers are built once from a configuration snapshot
//! - **Deterministic failover**: one attempt per provider, strictly in precedence order
//! - **Typed failures**: callers branch on [`Error`] variants, never on message text
//! - **Cancellable**: every dispatch honours the caller's [`RequestContext`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_gateway::{Gateway, GatewayConfig, RequestContext, UnifiedRequest};
//!
//! #[tokio::main]
//! async fn main() -> ai_gateway::Result<()> {
//!     let config = GatewayConfig::from_env()?;
//!     let gateway = Gateway::from_config(&config)?;
//!
//!     let request = UnifiedRequest::from_prompt("Hello!").with_max_tokens(200);
//!     let response = gateway.generate_text(&RequestContext::new(), &request).await?;
//!     println!("{}", response.first_content().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`gateway`] | Gateway, builder, dispatch loop and convenience helpers |
//! | [`provider`] | Provider kinds, descriptors and the adapter trait |
//! | [`registry`] | Registry built once from configuration |
//! | [`routing`] | Priority selector |
//! | [`signing`] | TC3-HMAC-SHA256 canonical-request signing |
//! | [`transport`] | Shared pooled HTTP client |
//! | [`config`] | Configuration snapshot (YAML and environment) |
//! | [`types`] | Unified request/response types |

pub mod config;
pub mod context;
pub mod gateway;
pub mod provider;
pub mod registry;
pub mod routing;
pub mod signing;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use config::{ConfigError, GatewayConfig, HttpSettings, ProviderSettings};
pub use context::RequestContext;
pub use gateway::{
    ChatReply, DispatchOutcome, Gateway, GatewayBuilder, HealthReport, HealthStatus, ServiceInfo,
};
pub use provider::{ProviderAdapter, ProviderDescriptor, ProviderKind};
pub use registry::ProviderRegistry;
pub use routing::PrioritySelector;
pub use types::{Choice, Message, MessageRole, UnifiedRequest, UnifiedResponse, Usage};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{AdapterError, AdapterErrorKind, AggregateFailure, Error, ErrorContext};
