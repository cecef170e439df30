//! Conversational assistant client for CuraLink.
//!
//! [`ChatClient`] abstracts the remote text-generation backend;
//! [`OpenAiChatClient`] speaks the OpenAI-compatible `chat/completions`
//! route. [`Assistant`] wraps a client with the CuraLink prompts and never
//! fails: when the backend is missing or errors, it answers with canned help
//! text and reports why through [`AssistantReply::Degraded`].
//!
//! # Examples
//!
//! ```rust
//! use curalink_assistant::{Assistant, AssistantReply, DegradeReason};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let assistant = Assistant::unavailable(DegradeReason::NotConfigured);
//! let reply = assistant.respond("Tell me about clinical trials", &[]).await;
//! assert!(matches!(reply, AssistantReply::Degraded { .. }));
//! assert!(reply.text().contains("Clinical Trials page"));
//! # }
//! ```
pub mod assistant;
pub mod client;
pub mod conversation;
pub mod fallback;
pub mod openai;

pub use assistant::{Assistant, AssistantReply, DegradeReason};
pub use client::{AssistantError, ChatClient, ChatMessage, Completion, Role};
pub use conversation::{Conversation, GREETING};
pub use openai::OpenAiChatClient;
