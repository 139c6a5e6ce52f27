//! Compliance guard for the active day.

use serde::Serialize;

use crate::state::DailyRecord;

/// Marker a health note must contain on overlong days.
const EXHAUSTION_MARKER: &str = "erschöpf";

/// Wording that marks execution-log content as internal work.
const INTERNAL_MARKERS: [&str; 8] = [
    "intern",
    "prototype",
    "prototyp",
    "vorbereitung",
    "ohne einnahmen",
    "minibetrieb",
    "mini-betrieb",
    "keine rechnung",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardNotice {
    /// More than the daily limit without any exhaustion note.
    OverloadWithoutExhaustionNote,
    /// Execution log reads like real paid work.
    ExecLogNeedsClarification,
}

impl GuardNotice {
    pub fn message(self) -> &'static str {
        match self {
            GuardNotice::OverloadWithoutExhaustionNote => {
                "Over 3h active without an exhaustion note. Record how you actually feel."
            }
            GuardNotice::ExecLogNeedsClarification => {
                "Execution log: mark it as internal, prototype or preparation work."
            }
        }
    }
}

/// Notices for `daily`, in a fixed order. Both may fire.
pub fn compliance_guard(daily: &DailyRecord, minutes_limit: u32) -> Vec<GuardNotice> {
    let mut notices = Vec::new();

    let health = daily.health_log.to_lowercase();
    if daily.active_minutes > minutes_limit && !health.contains(EXHAUSTION_MARKER) {
        notices.push(GuardNotice::OverloadWithoutExhaustionNote);
    }

    let exec = daily.exec_log.to_lowercase();
    if !exec.is_empty() && !INTERNAL_MARKERS.iter().any(|m| exec.contains(m)) {
        notices.push(GuardNotice::ExecLogNeedsClarification);
    }

    notices
}
