//! waypoint-llm - Provider Adapter
//!
//! Normalizes the anthropic content-block dialect and the openai
//! tool-call dialect to a single internal message/tool-call representation,
//! performs the model call, and accounts for token usage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod error;
pub mod message;
pub mod provider;
pub mod providers;
pub mod response;
pub mod tools;
pub mod trace;

pub use adapter::ProviderAdapter;
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use provider::{Dialect, ModelProvider};
pub use response::{NormalizedResponse, Usage};
pub use tools::{ToolCall, ToolChoice, ToolDefinition};
pub use trace::{GenerationTrace, GenerationTracer, LogTracer, NullTracer, TraceContext};
