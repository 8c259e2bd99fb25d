// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod browse;
pub mod cli;
pub mod config;
pub mod crawl;
pub mod extract;
pub mod notify;
pub mod poller;
pub mod rank;
pub mod record;
pub mod seen;

// ---- Re-exports for stable public API ----
pub use crate::config::{Settings, Transport};
pub use crate::notify::{Notifier, RecordingNotifier, TelegramNotifier};
pub use crate::poller::{CycleReport, Mode, Poller, RunPlan};
pub use crate::record::{CaseRecord, Category};
pub use crate::seen::{SeenSet, SeenStore};
