//! Read-only views used by the generators and the CLI.

use std::collections::BTreeMap;

use serde::Serialize;

use super::logs::distinct_log_days;
use crate::state::{
    AppState, Audit, Evidence, FinanceEntry, FinanceType, Outreach, OutreachStatus, Stage,
};

pub fn audits_by_stage(audits: &[Audit], stage: Stage) -> Vec<&Audit> {
    audits.iter().filter(|a| a.stage == stage).collect()
}

/// Case-insensitive domain search, optionally restricted to one stage.
/// An empty query matches everything.
pub fn search_audits<'a>(audits: &'a [Audit], query: &str, stage: Option<Stage>) -> Vec<&'a Audit> {
    let needle = query.trim().to_lowercase();
    audits
        .iter()
        .filter(|a| stage.map_or(true, |s| a.stage == s))
        .filter(|a| needle.is_empty() || a.domain.to_lowercase().contains(&needle))
        .collect()
}

pub fn outreach_by_status(outreach: &[Outreach], status: OutreachStatus) -> Vec<&Outreach> {
    outreach.iter().filter(|o| o.status == status).collect()
}

pub fn evidence_for_audit<'a>(evidence: &'a [Evidence], audit_id: &str) -> Vec<&'a Evidence> {
    evidence
        .iter()
        .filter(|e| e.audit_id.as_deref() == Some(audit_id))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct YearTotals {
    pub income: f64,
    pub expenses: f64,
}

impl YearTotals {
    pub fn profit(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Income and expense sums keyed by year, years ascending.
pub fn finance_by_year(entries: &[FinanceEntry]) -> BTreeMap<String, YearTotals> {
    let mut years: BTreeMap<String, YearTotals> = BTreeMap::new();
    for entry in entries {
        let totals = years.entry(entry.effective_year().to_string()).or_default();
        match entry.kind {
            FinanceType::Income => totals.income += entry.amount,
            FinanceType::Expense => totals.expenses += entry.amount,
        }
    }
    years
}

/// Live counters shown next to the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStatus {
    pub journal_days: usize,
    pub journal_target: usize,
    pub sprints: u32,
    pub finished_prototypes: usize,
    pub confirmed_contacts: usize,
}

const JOURNAL_TARGET_DAYS: usize = 80;

pub fn manifest_status(state: &AppState) -> ManifestStatus {
    ManifestStatus {
        journal_days: distinct_log_days(&state.logbook),
        journal_target: JOURNAL_TARGET_DAYS,
        sprints: state.home.kpis.sprints,
        finished_prototypes: audits_by_stage(&state.audits, Stage::FinishedInternal).len(),
        confirmed_contacts: outreach_by_status(&state.outreach, OutreachStatus::ClauseConfirmed)
            .len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit(domain: &str, stage: Stage) -> Audit {
        Audit {
            id: domain.into(),
            domain: domain.into(),
            stage,
            ..Audit::default()
        }
    }

    #[test]
    fn search_by_domain_and_stage() {
        let audits = vec![
            audit("example.org", Stage::New),
            audit("Shop.Example.com", Stage::FinishedInternal),
            audit("other.net", Stage::FinishedInternal),
        ];
        assert_eq!(search_audits(&audits, "", None).len(), 3);
        assert_eq!(search_audits(&audits, "EXAMPLE", None).len(), 2);
        let hits = search_audits(&audits, "example", Some(Stage::FinishedInternal));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "Shop.Example.com");
    }

    #[test]
    fn evidence_links_by_audit_id() {
        let evidence = vec![
            Evidence {
                audit_id: Some("a1".into()),
                ..Evidence::default()
            },
            Evidence::default(),
            Evidence {
                audit_id: Some("a2".into()),
                ..Evidence::default()
            },
        ];
        assert_eq!(evidence_for_audit(&evidence, "a1").len(), 1);
        assert!(evidence_for_audit(&evidence, "missing").is_empty());
    }

    #[test]
    fn finance_grouped_by_year() {
        let entry = |date: &str, kind, amount| FinanceEntry {
            date: String::from(date),
            kind,
            amount,
            ..FinanceEntry::default()
        };
        let years = finance_by_year(&[
            entry("2026-01-02", FinanceType::Income, 100.0),
            entry("2025-05-01", FinanceType::Income, 300.0),
            entry("2025-06-01", FinanceType::Expense, 120.5),
        ]);
        let keys: Vec<&str> = years.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2025", "2026"]);
        assert_eq!(years["2025"].profit(), 179.5);
        assert_eq!(years["2026"].expenses, 0.0);
    }

    #[test]
    fn manifest_counts() {
        let mut state = AppState::seed(&crate::dates::ProgramWindow::default());
        state.audits = vec![
            audit("a", Stage::FinishedInternal),
            audit("b", Stage::Draft),
        ];
        state.outreach = vec![
            Outreach {
                status: OutreachStatus::ClauseConfirmed,
                ..Outreach::default()
            },
            Outreach::default(),
        ];
        state.home.kpis.sprints = 4;
        let status = manifest_status(&state);
        assert_eq!(status.finished_prototypes, 1);
        assert_eq!(status.confirmed_contacts, 1);
        assert_eq!(status.sprints, 4);
        assert_eq!(status.journal_target, 80);
    }
}
