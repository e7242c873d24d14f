//! Bridge between MCP clients and Adobe InDesign's ExtendScript engine.
//!
//! Requests are validated against a fixed catalog, rendered to ExtendScript,
//! written to a scratch file, and run through `osascript`. Results come back
//! as text and are classified as success, engine error or transport error.

pub mod bridge;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod script;
pub mod server;
pub mod transport;

pub use bridge::Bridge;
pub use catalog::Catalog;
pub use classify::ExecutionOutcome;
pub use config::Config;
pub use dispatch::Dispatcher;
pub use error::{ParamError, ToolError, TransportError};
pub use transport::{ScriptHost, Transport};
