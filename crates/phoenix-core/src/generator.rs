//! Plain-text document drafts.
//!
//! Each generator is a pure view over a state snapshot. Callers that want
//! the current day included should archive it first; `StateStore::generate`
//! does that.

use std::fmt;

use chrono::NaiveDate;
use indoc::indoc;
use serde::Serialize;

use crate::derive::{
    audits_by_stage, evidence_for_audit, filter_logs_by_range, finance_by_year,
    logs_with_current_day, outreach_by_status, LogRange,
};
use crate::state::{AppState, OutreachStatus, Route, Stage};

/// Evidence lines listed per prototype.
const EVIDENCE_PER_AUDIT: usize = 5;
/// Evidence notes are cut to this many characters.
const EVIDENCE_NOTE_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    TagX,
    Protocol(LogRange),
    Income,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub title: String,
    pub body: String,
}

pub fn generate(state: &AppState, kind: DocumentKind, today: NaiveDate) -> Document {
    match kind {
        DocumentKind::TagX => tag_x_package(state, today),
        DocumentKind::Protocol(range) => performance_protocol(state, range, today),
        DocumentKind::Income => income_statement(state),
    }
}

/// Day-X package: finished prototypes, confirmed contacts and the recent
/// execution log.
pub fn tag_x_package(state: &AppState, today: NaiveDate) -> Document {
    Document {
        title: "Day-X package · draft for legal counsel / insolvency administrator".into(),
        body: TagX { state, today }.to_string(),
    }
}

/// Per-day active minutes and health notes with the daily average.
pub fn performance_protocol(state: &AppState, range: LogRange, today: NaiveDate) -> Document {
    Document {
        title: "Performance protocol · draft for DRV".into(),
        body: Protocol {
            state,
            range,
            today,
        }
        .to_string(),
    }
}

/// Income, expenses and profit per year.
pub fn income_statement(state: &AppState) -> Document {
    Document {
        title: "Short income statement · basis for tax / counsel".into(),
        body: Income { state }.to_string(),
    }
}

struct TagX<'a> {
    state: &'a AppState,
    today: NaiveDate,
}

impl fmt::Display for TagX<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        let audits = audits_by_stage(&state.audits, Stage::FinishedInternal);
        let contacts = outreach_by_status(&state.outreach, OutreachStatus::ClauseConfirmed);
        let exec_logs: Vec<_> =
            filter_logs_by_range(&logs_with_current_day(state), LogRange::Last30, self.today)
                .into_iter()
                .filter(|l| !l.exec_log.trim().is_empty())
                .collect();

        f.write_str(indoc! {"
            DRAFT · DAY-X PACKAGE / REQUEST TO RELEASE SELF-EMPLOYED ACTIVITY (§ 35 (2) INSO)
            ---------------------------------------------------------------------------------

            1. Situation
            - Running micro business (freelance, low volume, fully declared).
        "})?;
        match state.phoenix.target_route {
            Route::A => writeln!(
                f,
                "- Planned debt relief through consumer insolvency after ending the self-employed activity."
            )?,
            Route::B => writeln!(
                f,
                "- Planned debt relief through regular insolvency with release of the self-employed activity."
            )?,
        }
        writeln!(f, "- In parallel: building a clearly scoped 'mobile-first SEO audits' offer.\n")?;

        writeln!(f, "2. Prototypes (internal references)")?;
        if audits.is_empty() {
            writeln!(f, "- No FERTIG_INTERNAL prototypes documented yet.")?;
        }
        for (i, audit) in audits.iter().enumerate() {
            writeln!(
                f,
                "- Prototype {}: {} (FERTIG_INTERNAL, gate score {})",
                i + 1,
                audit.domain,
                audit.gate_score
            )?;
            let evidence = evidence_for_audit(&state.evidence, &audit.id);
            if !evidence.is_empty() {
                writeln!(f, "  Evidence excerpt:")?;
            }
            for ev in evidence.iter().take(EVIDENCE_PER_AUDIT) {
                let note: String = ev.note.chars().take(EVIDENCE_NOTE_CHARS).collect();
                writeln!(f, "  · [{}] {}: {}", ev.kind.as_str(), ev.title, note)?;
            }
        }

        writeln!(f, "\n3. Market pipeline (non-binding)")?;
        if contacts.is_empty() {
            writeln!(f, "- No binding inquiries. Concept level only.")?;
        }
        for contact in &contacts {
            writeln!(
                f,
                "- {} ({}): exploration contact with documented start clause.",
                contact.contact, contact.channel
            )?;
        }

        f.write_str(indoc! {"

            4. Compliance profile
            - No invoicing of audits during the program window without release.
            - Micro business documented through income statement and logbook.
            - Execution logs (last 30 days) show preparation rather than full-scale operation.

        "})?;
        for log in &exec_logs {
            writeln!(f, "  {}: {}", log.date, log.exec_log)?;
        }

        f.write_str(indoc! {"

            5. Proposed payment model (placeholder)
            - Once income from the released activity is stable: fixed monthly rate,
              oriented on comparable part-time net income.
        "})
    }
}

struct Protocol<'a> {
    state: &'a AppState,
    range: LogRange,
    today: NaiveDate,
}

impl fmt::Display for Protocol<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let logs = filter_logs_by_range(&logs_with_current_day(self.state), self.range, self.today);

        f.write_str(indoc! {"
            PROTOCOL · PERFORMANCE PROFILE (INTERNAL DRAFT FOR DRV COMMUNICATION)
            ---------------------------------------------------------------------
        "})?;
        match self.range.days() {
            Some(days) => writeln!(f, "Period: last {days} days\n")?,
            None => writeln!(f, "Period: entire program window\n")?,
        }

        if logs.is_empty() {
            writeln!(f, "(No entries in the selected period.)")?;
        }
        let mut total: u64 = 0;
        for log in &logs {
            total += u64::from(log.active_minutes);
            let health = if log.health_log.is_empty() {
                "(none recorded)"
            } else {
                log.health_log.as_str()
            };
            writeln!(f, "Date: {}", log.date)?;
            writeln!(f, "Work-like time: {} min", log.active_minutes)?;
            writeln!(f, "Strain note: {health}")?;
            writeln!(f, "--------------------------------------------------")?;
        }

        let avg = if logs.is_empty() {
            0
        } else {
            (total as f64 / logs.len() as f64).round() as u64
        };
        writeln!(f, "\nAverage work-like time: {avg} min/day.")?;
        writeln!(f, "Note: draft. Always agree on assessment and limits with the DRV.")
    }
}

struct Income<'a> {
    state: &'a AppState,
}

impl fmt::Display for Income<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let years = finance_by_year(&self.state.finances.entries);

        f.write_str(indoc! {"
            SHORT INCOME STATEMENT (INTERNAL EXCERPT)
            -----------------------------------------

        "})?;
        if years.is_empty() {
            writeln!(f, "(No entries yet.)")?;
        }
        for (year, totals) in &years {
            writeln!(f, "Year {year}:")?;
            writeln!(f, "  Income:   {:.2} €", totals.income)?;
            writeln!(f, "  Expenses: {:.2} €", totals.expenses)?;
            writeln!(f, "  Profit:   {:.2} €\n", totals.profit())?;
        }
        writeln!(f, "Note: figures are the basis for the official tax return annex.")
    }
}
