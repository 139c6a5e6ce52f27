//! Derived computations over a state snapshot.
//!
//! Everything here is a pure function of its arguments; "today" is always
//! passed in so results are reproducible in tests. The one sanctioned
//! mutation is [`evaluate_global_warnings`], which also flips the
//! journal-stable milestone (see [`warnings`]).

pub mod gate;
pub mod guard;
pub mod logs;
pub mod queries;
pub mod warnings;
pub mod window;

pub use gate::{calc_gate_score, is_gate_key, GATE_ITEMS};
pub use guard::{compliance_guard, GuardNotice};
pub use logs::{distinct_log_days, filter_logs_by_range, logs_with_current_day, LogRange};
pub use queries::{
    audits_by_stage, evidence_for_audit, finance_by_year, manifest_status, outreach_by_status,
    search_audits, ManifestStatus, YearTotals,
};
pub use warnings::{
    apply_milestones, compute_global_warnings, evaluate_global_warnings, MilestoneUpdate,
    Warning, WarningLevel,
};
pub use window::{program_window_info, WindowInfo, WindowPhase};
