//! 统一数据模型：与厂商无关的请求、响应与消息类型。
//!
//! Provider-agnostic data model shared by every adapter.

pub mod message;
pub mod request;
pub mod response;

pub use message::{Message, MessageRole};
pub use request::UnifiedRequest;
pub use response::{Choice, UnifiedResponse, Usage};
