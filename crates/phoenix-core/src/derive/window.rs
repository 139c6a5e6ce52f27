//! Progress through the program window.

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::{clamp, days_between, ProgramWindow};

/// Day counters for the program window.
///
/// `passed + left == total` for every `today`; `total` depends only on the
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowInfo {
    pub total: i64,
    pub passed: i64,
    pub left: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPhase {
    NotStarted,
    Active,
    Closed,
}

impl WindowInfo {
    pub fn phase(&self) -> WindowPhase {
        if self.passed <= 0 {
            WindowPhase::NotStarted
        } else if self.left <= 0 {
            WindowPhase::Closed
        } else {
            WindowPhase::Active
        }
    }
}

pub fn program_window_info(window: &ProgramWindow, today: NaiveDate) -> WindowInfo {
    let total = window.total_days();
    let passed = clamp(days_between(window.start(), today) + 1, 0, total);
    let left = clamp(total - passed, 0, total);
    WindowInfo {
        total,
        passed,
        left,
    }
}
