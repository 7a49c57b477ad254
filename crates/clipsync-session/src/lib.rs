//! Session lifecycle and persistence for ClipSync.
//!
//! Provides:
//! - `SessionController` - Create, join, share and disconnect
//! - `RecentSessionsLedger` - Persisted list of ended sessions
//! - Key-value storage implementations (memory, file)
//! - `ClipSyncConfig` - Application configuration
//! - `App` - Explicitly owned application state

#[cfg(feature = "file")]
pub mod app;
pub mod config;
pub mod controller;
pub mod ledger;
pub mod storage;

#[cfg(feature = "file")]
pub use app::{App, AppSnapshot};
pub use config::ClipSyncConfig;
pub use controller::{Panels, SessionController, SessionEvent, SessionSnapshot};
pub use ledger::RecentSessionsLedger;
