//! Scheduled consistency sweeps.
//!
//! Sweeps are timer-driven procedures that scan and mutate appointment and
//! declaration state without a triggering user request. Each sweep is
//! idempotent, tolerates per-item failures (log and continue), and is safe to
//! run concurrently with request handling: it reads, then conditionally
//! writes through the same optimistic-version ports request handlers use.

use std::time::Duration;

use async_trait::async_trait;
use chrono::TimeDelta;

use super::error::DomainError;

pub mod declarations;
pub mod missed;
pub mod reminders;
pub mod scheduler;

pub use declarations::DeclarationAgeSweep;
pub use missed::MissedAppointmentSweep;
pub use reminders::ReminderSweep;
pub use scheduler::SweepScheduler;

/// Timing knobs for the sweep subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSettings {
    /// How far past its start an open appointment may run before the missed
    /// sweep closes it.
    pub missed_grace: TimeDelta,
    /// Interval between missed-appointment sweep runs.
    pub missed_interval: Duration,
    /// Interval between reminder sweep runs.
    pub reminder_interval: Duration,
    /// Interval between declaration-age sweep runs.
    pub declaration_interval: Duration,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            missed_grace: TimeDelta::hours(2),
            missed_interval: Duration::from_secs(10),
            reminder_interval: Duration::from_secs(3600),
            declaration_interval: Duration::from_secs(86_400),
        }
    }
}

/// Summary of one sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepOutcome {
    /// Rows the sweep looked at.
    pub examined: usize,
    /// Rows the sweep mutated or created.
    pub acted: usize,
}

/// A periodically triggered consistency procedure.
///
/// Implementations log and skip bad rows rather than aborting the batch; a
/// returned error means the whole run could not proceed (e.g. the listing
/// query failed) and the scheduler logs it and waits for the next tick.
#[async_trait]
pub trait Sweep: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Execute one run.
    async fn run(&self) -> Result<SweepOutcome, DomainError>;
}
