//! # Wishbot Scheduler
//!
//! Daily birthday checks anchored to a fixed local time.
//!
//! ## Architecture
//! ```text
//! BirthdayScheduler (tokio::select! over next-anchor sleep + shutdown)
//!   └── on anchor → BirthdayEngine::run(roster, channel, today)
//!                     ├── match day/month (year ignored)
//!                     ├── TemplateBook::pick(age)  → English / Hindi greeting
//!                     ├── Channel::send_text       → per-send timeout + pause
//!                     └── deliver_report           → one summary to the report number
//! ```

pub mod engine;
pub mod report;
pub mod runner;
pub mod schedule;
pub mod templates;

pub use engine::{BirthdayEngine, RunOutcome, age_on};
pub use report::{ReportDelivery, RunReport, deliver_report};
pub use runner::{BirthdayScheduler, SchedulerPhase};
pub use schedule::{ScheduleState, daily_interval, next_anchor_after};
pub use templates::{TemplateBook, TemplateSet, render};
