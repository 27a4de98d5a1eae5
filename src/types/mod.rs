//! 类型模块：生成请求使用的基础消息类型。
//!
//! # Types Module
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role and text content |
//! | [`MessageRole`] | `system`, `user` or `assistant` |
//!
//! ```rust
//! use ai_report_rust::types::{Message, MessageRole};
//!
//! let system = Message::system("You are an expert analyst for client conversations.");
//! let user = Message::user("Analyze this client dialogue transcript: ...");
//! assert_eq!(system.role, MessageRole::System);
//! assert_eq!(user.role, MessageRole::User);
//! ```

pub mod message;

pub use message::{Message, MessageRole};
