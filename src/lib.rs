// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod dates;
pub mod evaluate;
pub mod extract;
pub mod fetch;
pub mod keywords;
pub mod runner;
pub mod signals;
pub mod state;

// Notification sinks
pub mod notify;

// ---- Re-exports for stable public API ----
pub use crate::config::MonitorConfig;
pub use crate::evaluate::{Finding, Status};
pub use crate::fetch::{FetchError, PageSource};
pub use crate::notify::{NotificationEvent, Notifier, NotifierMux};
pub use crate::runner::{run_once, RunSummary};
pub use crate::state::StateStore;
