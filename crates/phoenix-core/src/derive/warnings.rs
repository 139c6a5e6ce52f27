//! Program-wide warnings and the journal milestone.
//!
//! Evaluation is split in two: [`compute_global_warnings`] is pure and
//! reports the milestone it would set, [`apply_milestones`] writes it. The
//! convenience [`evaluate_global_warnings`] does both, which makes it the
//! only evaluator that mutates state.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::logs::distinct_log_days;
use crate::state::{AppState, FinanceType, OutreachStatus, Stage};
use crate::storage::Thresholds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Warn,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub level: WarningLevel,
    pub text: String,
}

impl Warning {
    fn warn(text: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Warn,
            text: text.into(),
        }
    }

    fn info(text: impl Into<String>) -> Self {
        Self {
            level: WarningLevel::Info,
            text: text.into(),
        }
    }
}

/// Milestones reached during evaluation. Only ever set, never cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MilestoneUpdate {
    pub zeitjournal_stable: bool,
}

pub fn apply_milestones(state: &mut AppState, update: MilestoneUpdate) {
    if update.zeitjournal_stable {
        state.phoenix.zeitjournal_stable = true;
    }
}

/// Warnings in rule order: journal depth, income limit, unconfirmed
/// outreach, finished prototypes.
pub fn compute_global_warnings(
    state: &AppState,
    thresholds: &Thresholds,
    today: NaiveDate,
) -> (Vec<Warning>, MilestoneUpdate) {
    let mut warnings = Vec::new();
    let mut milestones = MilestoneUpdate::default();

    let days = distinct_log_days(&state.logbook);
    if days < thresholds.journal_thin_days {
        warnings.push(Warning::warn(format!(
            "Time journal under {} days. Still thin for DRV and IV, keep logging.",
            thresholds.journal_thin_days
        )));
    } else if days < thresholds.journal_stable_days {
        warnings.push(Warning::info(format!(
            "Time journal at {days} days. Solid base is building up."
        )));
    } else {
        milestones.zeitjournal_stable = true;
    }

    let year = today.year().to_string();
    let income: f64 = state
        .finances
        .entries
        .iter()
        .filter(|e| e.kind == FinanceType::Income)
        .filter(|e| e.year == year || e.date.starts_with(&year))
        .map(|e| e.amount)
        .sum();
    if income > thresholds.income_limit {
        warnings.push(Warning::warn(format!(
            "Additional income {income:.2} € this year. Check the current limits (pension account, notice)."
        )));
    }

    if state
        .outreach
        .iter()
        .any(|o| o.status != OutreachStatus::ClauseConfirmed)
    {
        warnings.push(Warning::warn(
            "Exploration contacts without a confirmed start clause. Review and follow up.",
        ));
    }

    let finished = state
        .audits
        .iter()
        .filter(|a| a.stage == Stage::FinishedInternal)
        .count();
    if finished < thresholds.finished_prototypes_target {
        warnings.push(Warning::info(format!(
            "{finished} finished prototypes so far. Target for day X: at least {} solid practice audits.",
            thresholds.finished_prototypes_target
        )));
    }

    (warnings, milestones)
}

/// Compute warnings and record any milestone reached on `state`.
pub fn evaluate_global_warnings(
    state: &mut AppState,
    thresholds: &Thresholds,
    today: NaiveDate,
) -> Vec<Warning> {
    let (warnings, milestones) = compute_global_warnings(state, thresholds, today);
    if milestones.zeitjournal_stable && !state.phoenix.zeitjournal_stable {
        tracing::info!("time journal reached the stable milestone");
    }
    apply_milestones(state, milestones);
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{parse_iso, ProgramWindow};
    use crate::state::{Audit, DailyRecord, FinanceEntry, Outreach};

    fn today() -> NaiveDate {
        parse_iso("2025-12-15").unwrap()
    }

    fn state_with_days(n: usize) -> AppState {
        let mut state = AppState::seed(&ProgramWindow::default());
        let start = parse_iso("2025-01-01").unwrap();
        state.logbook = (0..n as u64)
            .map(|i| DailyRecord::for_date((start + chrono::Days::new(i)).to_string()))
            .collect();
        state
    }

    fn finished_audits(n: usize) -> Vec<Audit> {
        (0..n)
            .map(|i| Audit {
                id: format!("a{i}"),
                stage: Stage::FinishedInternal,
                ..Audit::default()
            })
            .collect()
    }

    #[test]
    fn thin_journal_warns_first() {
        let state = state_with_days(10);
        let (warnings, milestones) = compute_global_warnings(&state, &Thresholds::default(), today());
        assert_eq!(warnings[0].level, WarningLevel::Warn);
        assert!(warnings[0].text.contains("under 30 days"));
        assert!(!milestones.zeitjournal_stable);
    }

    #[test]
    fn duplicate_dates_count_once() {
        let mut state = state_with_days(30);
        state.logbook.push(state.logbook[0].clone());
        let (warnings, _) = compute_global_warnings(&state, &Thresholds::default(), today());
        assert_eq!(warnings[0].level, WarningLevel::Info);
        assert!(warnings[0].text.contains("30 days"));
    }

    #[test]
    fn stable_journal_sets_milestone_only_via_evaluate() {
        let mut state = state_with_days(65);
        state.audits = finished_audits(3);
        let (warnings, milestones) = compute_global_warnings(&state, &Thresholds::default(), today());
        assert!(warnings.is_empty());
        assert!(milestones.zeitjournal_stable);
        assert!(!state.phoenix.zeitjournal_stable);

        let warnings = evaluate_global_warnings(&mut state, &Thresholds::default(), today());
        assert!(warnings.is_empty());
        assert!(state.phoenix.zeitjournal_stable);

        // never cleared again
        state.logbook.clear();
        evaluate_global_warnings(&mut state, &Thresholds::default(), today());
        assert!(state.phoenix.zeitjournal_stable);
    }

    #[test]
    fn income_over_limit_for_current_year() {
        let mut state = state_with_days(65);
        state.audits = finished_audits(3);
        let entry = |date: &str, amount: f64, kind: FinanceType| FinanceEntry {
            date: date.into(),
            year: date[..4].into(),
            amount,
            kind,
            ..FinanceEntry::default()
        };
        state.finances.entries = vec![
            entry("2025-03-01", 10_000.0, FinanceType::Income),
            entry("2025-06-01", 5_000.5, FinanceType::Income),
            entry("2025-06-02", 9_999.0, FinanceType::Expense),
            entry("2024-06-01", 99_999.0, FinanceType::Income),
        ];
        let (warnings, _) = compute_global_warnings(&state, &Thresholds::default(), today());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].text.contains("15000.50"));
    }

    #[test]
    fn one_warning_for_any_unconfirmed_outreach() {
        let mut state = state_with_days(65);
        state.audits = finished_audits(2);
        state.outreach = vec![Outreach::default(), Outreach::default()];
        let (warnings, _) = compute_global_warnings(&state, &Thresholds::default(), today());
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].level, WarningLevel::Warn);
        assert_eq!(warnings[1].level, WarningLevel::Info);
        assert!(warnings[1].text.starts_with("2 finished"));
    }
}
