//! Anthropic content-block dialect.

mod convert;
mod dialect;
mod security;
mod types;

pub use dialect::AnthropicDialect;
pub use types::AnthropicConfig;
