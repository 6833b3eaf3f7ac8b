//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - serve: chat service
//! - ask: one-shot in-process question
//! - chat: interactive front end over the client layer
//! - info: status and configuration display

pub mod ask;
pub mod chat;
pub mod info;
pub mod serve;

// Re-export all public handlers
pub use ask::*;
pub use chat::*;
pub use info::*;
pub use serve::*;
