//! 统一网关入口：优先级选择 + 顺序故障转移。
//!
//! Gateway entry point. Implementation is split into submodules under
//! `src/gateway/`: construction, the dispatch loop, prompt-template
//! helpers and discovery.

pub mod builder;
pub mod core;
pub mod discovery;
pub mod dispatch;
pub mod tasks;

pub use builder::GatewayBuilder;
pub use core::Gateway;
pub use discovery::{HealthReport, HealthStatus, ServiceInfo};
pub use dispatch::DispatchOutcome;
pub use tasks::ChatReply;
