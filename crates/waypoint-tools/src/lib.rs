//! waypoint-tools - Tool Dispatcher
//!
//! Resolves a requested tool name to either a meta-tool (handled entirely
//! in-process) or the external capability backend, and materializes the
//! result back into the conversation.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod catalog;
pub mod dispatcher;
pub mod error;
pub mod meta;

pub use backend::{AuthStatus, CapabilityBackend, ExecutionOutcome, NullCapabilityBackend, ToolOutput};
pub use catalog::{CatalogFormat, ToolCatalog, ToolDescriptor};
pub use dispatcher::{DispatchConfig, DispatchOutcome, ToolDispatcher};
pub use error::{Error, Result};
pub use meta::{is_meta_tool, PastResults, ToolResults};
