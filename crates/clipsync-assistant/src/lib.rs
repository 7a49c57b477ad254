//! Assistant integration for ClipSync.
//!
//! Provides:
//! - Smart action definitions and instruction templates
//! - `Assistant` - request/response calls with a shared busy indicator
//! - Gateway implementations (HTTP, static)
//! - View models for the smart-action panel and the history sidebar

pub mod actions;
pub mod assistant;
pub mod busy;
pub mod gateway;
pub mod panel;

pub use actions::SmartAction;
pub use assistant::{Assistant, AssistantOptions};
pub use busy::{BusyGuard, BusyIndicator};
#[cfg(feature = "http")]
pub use gateway::HttpAssistantGateway;
pub use gateway::StaticGateway;
pub use panel::{HistorySidebar, SmartActionPanel};
