//! Guarded mutation entry points for the day record and entity collections.
//!
//! Inputs are trimmed and validated here; rejected input leaves the state
//! unchanged. New entities are prepended so collections read newest first.

use std::fmt;
use std::str::FromStr;

use super::StateStore;
use crate::dates::{clamp, parse_iso, to_iso, today_iso};
use crate::derive::{self, calc_gate_score, is_gate_key};
use crate::error::{Result, ValidationError};
use crate::state::{
    new_id, Audit, DayMode, Evidence, EvidenceType, FinanceEntry, FinanceType, MitItem, Outreach,
    OutreachStatus, Stage, ACTIVE_MINUTES_MAX, MIT_CAPACITY,
};

/// Free-text log fields of the day record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Health,
    Exec,
    Facts,
    Buddha,
}

impl FromStr for LogKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(LogKind::Health),
            "exec" => Ok(LogKind::Exec),
            "facts" => Ok(LogKind::Facts),
            "buddha" => Ok(LogKind::Buddha),
            other => Err(ValidationError::invalid(
                "log",
                format!("unknown log {other:?}, expected health, exec, facts or buddha"),
            )),
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogKind::Health => "health",
            LogKind::Exec => "exec",
            LogKind::Facts => "facts",
            LogKind::Buddha => "buddha",
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(value.to_string())
}

fn position<T>(items: &[T], id: &str, collection: &str, key: impl Fn(&T) -> &str) -> Result<usize> {
    items
        .iter()
        .position(|item| key(item) == id)
        .ok_or_else(|| ValidationError::not_found(collection, id).into())
}

impl StateStore {
    // ── Day record ───────────────────────────────────────────────────

    /// Set today's active minutes, clamped to `0..=600`.
    pub fn set_active_minutes(&mut self, minutes: i64) -> u32 {
        let minutes = clamp(minutes, 0, i64::from(ACTIVE_MINUTES_MAX));
        // clamped into u32 range above
        self.state.daily.active_minutes = minutes as u32;
        self.state.daily.active_minutes
    }

    pub fn set_mode(&mut self, mode: DayMode) {
        self.state.daily.mode = mode;
    }

    pub fn set_log(&mut self, kind: LogKind, text: &str) {
        let daily = &mut self.state.daily;
        let field = match kind {
            LogKind::Health => &mut daily.health_log,
            LogKind::Exec => &mut daily.exec_log,
            LogKind::Facts => &mut daily.facts_log,
            LogKind::Buddha => &mut daily.buddha_note,
        };
        *field = text.to_string();
    }

    // ── Directive items ──────────────────────────────────────────────

    /// Append a directive item, dropping the oldest one at capacity.
    pub fn add_mit(&mut self, text: &str) -> Result<&MitItem> {
        let text = required("text", text)?;
        let mit = &mut self.state.home.mit;
        if mit.len() >= MIT_CAPACITY {
            mit.remove(0);
        }
        mit.push(MitItem {
            id: new_id(),
            text,
            done: false,
        });
        Ok(&mit[mit.len() - 1])
    }

    /// Flip the done flag; returns the new value.
    pub fn toggle_mit(&mut self, id: &str) -> Result<bool> {
        let mit = &mut self.state.home.mit;
        let idx = position(mit, id, "mit", |m| m.id.as_str())?;
        mit[idx].done = !mit[idx].done;
        Ok(mit[idx].done)
    }

    // ── Finances ─────────────────────────────────────────────────────

    /// Record a booking. `date` defaults to today.
    ///
    /// # Errors
    /// Rejects amounts that are zero, negative or not finite, and dates
    /// that are not `YYYY-MM-DD`.
    pub fn add_finance(
        &mut self,
        date: Option<&str>,
        kind: FinanceType,
        amount: f64,
        note: &str,
    ) -> Result<&FinanceEntry> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ValidationError::invalid("amount", "must be a positive number").into());
        }
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => to_iso(parse_iso(d)?),
            None => today_iso(),
        };
        let entry = FinanceEntry {
            id: new_id(),
            year: date[..4].to_string(),
            date,
            kind,
            amount,
            note: note.trim().to_string(),
        };
        let entries = &mut self.state.finances.entries;
        entries.insert(0, entry);
        Ok(&entries[0])
    }

    // ── Audits ───────────────────────────────────────────────────────

    pub fn add_audit(&mut self, domain: &str, stage: Stage) -> Result<&Audit> {
        let audit = Audit {
            id: new_id(),
            domain: required("domain", domain)?,
            stage,
            created: today_iso(),
            ..Audit::default()
        };
        self.state.audits.insert(0, audit);
        Ok(&self.state.audits[0])
    }

    pub fn set_audit_stage(&mut self, id: &str, stage: Stage) -> Result<()> {
        let audit = self
            .state
            .find_audit_mut(id)
            .ok_or_else(|| ValidationError::not_found("audit", id))?;
        audit.stage = stage;
        Ok(())
    }

    /// Set one gate item and recompute the score; returns the new score.
    pub fn set_gate(&mut self, id: &str, key: &str, checked: bool) -> Result<u8> {
        if !is_gate_key(key) {
            return Err(ValidationError::invalid("gate", format!("unknown gate item {key:?}")).into());
        }
        let audit = self
            .state
            .find_audit_mut(id)
            .ok_or_else(|| ValidationError::not_found("audit", id))?;
        audit.gate.insert(key.to_string(), checked);
        audit.gate_score = calc_gate_score(&audit.gate);
        Ok(audit.gate_score)
    }

    /// Remove an audit. Evidence pointing at it is left in place.
    pub fn delete_audit(&mut self, id: &str) -> Result<Audit> {
        let idx = position(&self.state.audits, id, "audit", |a| a.id.as_str())?;
        Ok(self.state.audits.remove(idx))
    }

    pub fn search_audits(&self, query: &str, stage: Option<Stage>) -> Vec<&Audit> {
        derive::search_audits(&self.state.audits, query, stage)
    }

    // ── Evidence ─────────────────────────────────────────────────────

    /// # Errors
    /// Rejects input where both title and note are empty.
    pub fn add_evidence(
        &mut self,
        title: &str,
        kind: EvidenceType,
        audit_id: Option<&str>,
        note: &str,
    ) -> Result<&Evidence> {
        let (title, note) = (title.trim(), note.trim());
        if title.is_empty() && note.is_empty() {
            return Err(ValidationError::invalid("evidence", "title or note required").into());
        }
        let evidence = Evidence {
            id: new_id(),
            title: title.to_string(),
            kind,
            audit_id: audit_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from),
            note: note.to_string(),
            created: today_iso(),
        };
        self.state.evidence.insert(0, evidence);
        Ok(&self.state.evidence[0])
    }

    pub fn delete_evidence(&mut self, id: &str) -> Result<Evidence> {
        let idx = position(&self.state.evidence, id, "evidence", |e| e.id.as_str())?;
        Ok(self.state.evidence.remove(idx))
    }

    pub fn evidence_for_audit(&self, audit_id: &str) -> Vec<&Evidence> {
        derive::evidence_for_audit(&self.state.evidence, audit_id)
    }

    /// Audit an evidence item points at. `None` when the evidence has no
    /// link or the audit is gone.
    pub fn audit_for_evidence(&self, evidence_id: &str) -> Option<&Audit> {
        let evidence = self.state.evidence.iter().find(|e| e.id == evidence_id)?;
        self.state.find_audit(evidence.audit_id.as_deref()?)
    }

    // ── Outreach ─────────────────────────────────────────────────────

    /// Record an exploration contact and count it for today.
    pub fn add_outreach(
        &mut self,
        contact: &str,
        channel: &str,
        handle: &str,
        notes: &str,
    ) -> Result<&Outreach> {
        let outreach = Outreach {
            id: new_id(),
            contact: required("contact", contact)?,
            channel: required("channel", channel)?,
            handle: handle.trim().to_string(),
            notes: notes.trim().to_string(),
            status: OutreachStatus::Exploration,
            created: today_iso(),
        };
        self.state.daily.outreach_today += 1;
        self.state.outreach.insert(0, outreach);
        Ok(&self.state.outreach[0])
    }

    pub fn confirm_outreach(&mut self, id: &str) -> Result<()> {
        let idx = position(&self.state.outreach, id, "outreach", |o| o.id.as_str())?;
        self.state.outreach[idx].status = OutreachStatus::ClauseConfirmed;
        Ok(())
    }

    pub fn delete_outreach(&mut self, id: &str) -> Result<Outreach> {
        let idx = position(&self.state.outreach, id, "outreach", |o| o.id.as_str())?;
        Ok(self.state.outreach.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::storage::{Config, MemoryStorage};

    fn store() -> StateStore {
        StateStore::with_backend(Box::new(MemoryStorage::new()), &Config::default()).unwrap()
    }

    #[test]
    fn minutes_are_clamped() {
        let mut store = store();
        assert_eq!(store.set_active_minutes(-5), 0);
        assert_eq!(store.set_active_minutes(601), 600);
        assert_eq!(store.set_active_minutes(75), 75);
    }

    #[test]
    fn set_each_log() {
        let mut store = store();
        store.set_log(LogKind::Health, "h");
        store.set_log(LogKind::Facts, "f");
        store.set_log(LogKind::Buddha, "b");
        store.set_mode(DayMode::B);
        let daily = &store.state().daily;
        assert_eq!(
            (daily.health_log.as_str(), daily.facts_log.as_str(), daily.buddha_note.as_str()),
            ("h", "f", "b")
        );
        assert_eq!(daily.mode, DayMode::B);
        assert!("notes".parse::<LogKind>().is_err());
    }

    #[test]
    fn mit_drops_oldest_at_capacity() {
        let mut store = store();
        let oldest = store.state().home.mit[0].id.clone();
        store.add_mit("  new focus  ").unwrap();
        let mit = &store.state().home.mit;
        assert_eq!(mit.len(), 3);
        assert!(mit.iter().all(|m| m.id != oldest));
        assert_eq!(mit[2].text, "new focus");
        assert!(store.add_mit("   ").is_err());

        let id = store.state().home.mit[0].id.clone();
        assert!(store.toggle_mit(&id).unwrap());
        assert!(!store.toggle_mit(&id).unwrap());
        assert!(store.toggle_mit("missing").is_err());
    }

    #[test]
    fn zero_finance_amount_is_rejected() {
        let mut store = store();
        let err = store
            .add_finance(None, FinanceType::Income, 0.0, "nothing")
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(store.add_finance(None, FinanceType::Income, -3.0, "").is_err());
        assert!(store.add_finance(None, FinanceType::Income, f64::NAN, "").is_err());
        assert!(store.state().finances.entries.is_empty());
    }

    #[test]
    fn finance_prepends_with_year() {
        let mut store = store();
        store
            .add_finance(Some("2024-02-03"), FinanceType::Expense, 12.5, " hosting ")
            .unwrap();
        let entry = store
            .add_finance(Some("2025-01-01"), FinanceType::Income, 100.0, "")
            .unwrap();
        assert_eq!(entry.year, "2025");
        let entries = &store.state().finances.entries;
        assert_eq!(entries[0].date, "2025-01-01");
        assert_eq!(entries[1].note, "hosting");
        assert!(store
            .add_finance(Some("03.02.2024"), FinanceType::Income, 1.0, "")
            .is_err());
    }

    #[test]
    fn gate_updates_score_and_rejects_unknown_keys() {
        let mut store = store();
        let id = store.add_audit(" makler.de ", Stage::New).unwrap().id.clone();
        assert_eq!(store.state().audits[0].domain, "makler.de");
        store.set_gate(&id, "klartext", true).unwrap();
        store.set_gate(&id, "belege", true).unwrap();
        assert_eq!(store.set_gate(&id, "struktur", true).unwrap(), 43);
        assert_eq!(store.set_gate(&id, "struktur", false).unwrap(), 29);
        assert!(store.set_gate(&id, "speed", true).is_err());
        assert!(store.set_gate("missing", "prio", true).is_err());
        assert!(store.add_audit("  ", Stage::New).is_err());
    }

    #[test]
    fn deleting_audit_keeps_dangling_evidence() {
        let mut store = store();
        let audit = store.add_audit("a.de", Stage::FinishedInternal).unwrap().id.clone();
        let ev = store
            .add_evidence("LCP 4.1s", EvidenceType::Tech, Some(&audit), "")
            .unwrap()
            .id
            .clone();
        assert_eq!(store.audit_for_evidence(&ev).unwrap().domain, "a.de");
        assert_eq!(store.evidence_for_audit(&audit).len(), 1);

        store.delete_audit(&audit).unwrap();
        assert_eq!(store.state().evidence.len(), 1);
        assert!(store.audit_for_evidence(&ev).is_none());
        assert!(store.add_evidence(" ", EvidenceType::Seo, None, " ").is_err());
        store.delete_evidence(&ev).unwrap();
        assert!(store.state().evidence.is_empty());
    }

    #[test]
    fn outreach_counts_for_today_and_confirms() {
        let mut store = store();
        let id = store
            .add_outreach("Anna", "LinkedIn", "@anna", "")
            .unwrap()
            .id
            .clone();
        assert_eq!(store.state().daily.outreach_today, 1);
        assert!(store.add_outreach("Anna", " ", "", "").is_err());
        assert_eq!(store.state().daily.outreach_today, 1);

        store.confirm_outreach(&id).unwrap();
        assert_eq!(store.state().outreach[0].status, OutreachStatus::ClauseConfirmed);
        store.delete_outreach(&id).unwrap();
        assert!(store.confirm_outreach(&id).is_err());
    }
}
