//! Core data model and abstractions for ClipSync sharing sessions.
//!
//! This crate provides the fundamental building blocks:
//! - `Session`, `TransferItem`, `RecentSessionEntry` - Session data model
//! - `ItemStore` - Newest-first collection of shared items
//! - `SessionCodeGenerator` - Human-readable session codes
//! - `KeyValueStore` and `AssistantGateway` traits
//! - Display helpers and fixed sample data

pub mod code;
pub mod format;
pub mod item_store;
pub mod model;
pub mod sample;
pub mod traits;

pub use code::SessionCodeGenerator;
pub use item_store::ItemStore;
pub use model::{
    AgentResult, FileMeta, ItemBody, ItemKind, RecentSessionEntry, SenderSide, Session,
    SmartActionResult, TransferItem,
};
pub use traits::{AssistantGateway, KeyValueStore};
