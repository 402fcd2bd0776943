//! The daily control loop.
//!
//! ```text
//! Idle ──► Waiting ──(anchor reached)──► Running ──► Waiting ──► ...
//!             │                                       │
//!             └────────(shutdown signal)──────────────┴──► ShuttingDown ──► Terminated
//! ```
//!
//! The shutdown signal is only observed while waiting; a run in progress
//! always finishes first.

use std::future::Future;

use chrono::{Local, NaiveTime};
use wishbot_core::error::Result;
use wishbot_core::traits::{Channel, Clock};
use wishbot_roster::Roster;

use crate::engine::{BirthdayEngine, RunOutcome};
use crate::schedule::ScheduleState;

/// Lifecycle of the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Waiting,
    Running,
    ShuttingDown,
    Terminated,
}

impl std::fmt::Display for SchedulerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerPhase::Idle => write!(f, "idle"),
            SchedulerPhase::Waiting => write!(f, "waiting"),
            SchedulerPhase::Running => write!(f, "running"),
            SchedulerPhase::ShuttingDown => write!(f, "shutting down"),
            SchedulerPhase::Terminated => write!(f, "terminated"),
        }
    }
}

/// Owns the roster snapshot, the transport and the engine, and drives runs
/// at the daily anchor.
pub struct BirthdayScheduler {
    roster: Roster,
    channel: Box<dyn Channel>,
    engine: BirthdayEngine,
    clock: Box<dyn Clock>,
    anchor: NaiveTime,
    run_on_startup: bool,
    phase: SchedulerPhase,
    runs: u64,
}

impl BirthdayScheduler {
    pub fn new(
        roster: Roster,
        channel: Box<dyn Channel>,
        engine: BirthdayEngine,
        clock: Box<dyn Clock>,
        anchor: NaiveTime,
    ) -> Self {
        Self {
            roster,
            channel,
            engine,
            clock,
            anchor,
            run_on_startup: false,
            phase: SchedulerPhase::Idle,
            runs: 0,
        }
    }

    /// Do one run immediately before waiting for the first anchor.
    pub fn with_run_on_startup(mut self, enabled: bool) -> Self {
        self.run_on_startup = enabled;
        self
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.phase
    }

    /// Completed or skipped runs so far.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    fn set_phase(&mut self, phase: SchedulerPhase) {
        if self.phase != phase {
            tracing::debug!("Scheduler phase: {} → {}", self.phase, phase);
            self.phase = phase;
        }
    }

    /// One run for today's local date.
    pub async fn run_once(&mut self) -> RunOutcome {
        self.set_phase(SchedulerPhase::Running);
        let today = self.clock.now().date_naive();
        let outcome = self
            .engine
            .run(&self.roster, self.channel.as_ref(), today)
            .await;
        self.runs += 1;
        outcome
    }

    /// Run at every anchor until `shutdown` resolves, then disconnect.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if self.run_on_startup {
            tracing::info!("🚀 Running startup birthday check");
            self.run_once().await;
        }

        let mut schedule: ScheduleState<Local> =
            ScheduleState::starting_at(&self.clock.now(), self.anchor);

        loop {
            self.set_phase(SchedulerPhase::Waiting);
            let delay = schedule.delay_from(&self.clock.now());
            tracing::info!(
                "⏰ Next birthday check at {} (in {}s)",
                schedule.next_fire_at().format("%Y-%m-%d %H:%M:%S"),
                delay.as_secs()
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    tracing::info!("🛑 Shutdown signal received");
                    break;
                }
            }

            self.run_once().await;

            let skipped = schedule.advance(&self.clock.now());
            if skipped > 0 {
                tracing::warn!("⚠️ Run overran the schedule, skipped {skipped} daily check(s)");
            }
        }

        self.shutdown().await
    }

    /// Release the transport session.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.set_phase(SchedulerPhase::ShuttingDown);
        tracing::info!("Shutting down, disconnecting '{}'", self.channel.name());
        let result = self.channel.disconnect().await;
        self.set_phase(SchedulerPhase::Terminated);
        result
    }
}
