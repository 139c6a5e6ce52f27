//! Focus-sprint timer.
//!
//! Like the rest of the core the timer owns no thread. The caller drives
//! [`SprintTimer::tick`] once per second with the [`TickToken`] handed out by
//! [`SprintTimer::start`]; stopping invalidates the token before the sprint
//! record is touched, so a late tick from a cancelled schedule is ignored.
//!
//! ```text
//! Idle --start--> Live --tick(remaining reaches 0)--> Idle (+1 sprint)
//!   ^               |
//!   +---stop/reset--+
//! ```

use chrono::Utc;

use crate::dates::clamp;
use crate::events::Event;
use crate::state::{Sprint, SPRINT_MIN_RANGE};

/// Handle for one live run of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickToken(u64);

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Token was not the live one; nothing changed.
    Ignored,
    Running { remaining_sec: u32 },
    /// Countdown finished; the timer is idle again.
    Completed { duration_min: u32 },
}

#[derive(Debug, Default)]
pub struct SprintTimer {
    active: Option<u64>,
    generation: u64,
}

impl SprintTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick schedule is currently attached.
    pub fn is_live(&self) -> bool {
        self.active.is_some()
    }

    /// Start or resume `sprint`.
    ///
    /// Returns `None` when the timer is already live. A sprint persisted as
    /// running by an earlier process has no live handle and is resumed with
    /// its remaining time.
    pub fn start(&mut self, sprint: &mut Sprint) -> Option<(TickToken, Event)> {
        if self.is_live() {
            return None;
        }
        let fresh = sprint.started_at.is_none();
        if fresh {
            sprint.started_at = Some(Utc::now().timestamp_millis());
            sprint.remaining_sec = sprint.full_seconds();
        }
        sprint.running = true;

        self.generation += 1;
        self.active = Some(self.generation);
        let event = Event::SprintStarted {
            duration_min: sprint.duration_min,
            remaining_sec: sprint.remaining_sec,
            fresh,
            at: Utc::now(),
        };
        Some((TickToken(self.generation), event))
    }

    /// Drop the live handle without touching any sprint record.
    pub fn detach(&mut self) {
        self.active = None;
    }

    /// Stop the timer. With `reset` the sprint returns to its unstarted
    /// state and loses its note.
    pub fn stop(&mut self, sprint: &mut Sprint, reset: bool) -> Event {
        self.detach();

        sprint.running = false;
        if reset {
            sprint.started_at = None;
            sprint.remaining_sec = sprint.full_seconds();
            sprint.note.clear();
        }
        Event::SprintStopped {
            remaining_sec: sprint.remaining_sec,
            reset,
            at: Utc::now(),
        }
    }

    /// Advance the countdown by one second.
    ///
    /// On completion the timer detaches and the sprint is rearmed for its
    /// full duration; bookkeeping of the finished sprint is the caller's job.
    pub fn tick(&mut self, token: TickToken, sprint: &mut Sprint) -> TickOutcome {
        if self.active != Some(token.0) {
            return TickOutcome::Ignored;
        }
        sprint.remaining_sec = sprint.remaining_sec.saturating_sub(1);
        if sprint.remaining_sec > 0 {
            return TickOutcome::Running {
                remaining_sec: sprint.remaining_sec,
            };
        }

        self.active = None;
        sprint.running = false;
        sprint.started_at = None;
        sprint.remaining_sec = sprint.full_seconds();
        TickOutcome::Completed {
            duration_min: sprint.duration_min,
        }
    }
}

/// Clamp `minutes` into the allowed sprint length. The remaining time
/// follows only while the sprint has not started.
pub fn set_duration(sprint: &mut Sprint, minutes: u32) {
    let (min, max) = SPRINT_MIN_RANGE;
    sprint.duration_min = clamp(minutes, min, max);
    if sprint.started_at.is_none() {
        sprint.remaining_sec = sprint.full_seconds();
    }
}

/// `MM:SS`; minutes keep counting past 59.
pub fn format_timer(sec: u32) -> String {
    format!("{:02}:{:02}", sec / 60, sec % 60)
}
