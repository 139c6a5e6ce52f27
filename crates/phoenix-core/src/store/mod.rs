//! The state store.
//!
//! [`StateStore`] owns the live [`AppState`] together with its persistence
//! backend, the status channel and the sprint timer. All mutation goes
//! through its methods; nothing in the crate holds state globally.
//!
//! Persistence never raises: [`StateStore::persist`] reports failures on the
//! status channel and returns a [`SaveOutcome`]. Import is the only path
//! that returns an error for bad data, and it leaves the state untouched
//! when it does.

mod records;

pub use records::LogKind;

use std::time::{Duration, Instant};

use chrono::{NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::dates::{now_ms, parse_iso, to_iso, ProgramWindow};
use crate::derive::{compliance_guard, evaluate_global_warnings, Warning};
use crate::error::{ImportError, Result};
use crate::events::Event;
use crate::generator::{self, Document, DocumentKind};
use crate::sprint::{self, SprintTimer, TickOutcome, TickToken};
use crate::state::{
    normalize, ActiveTab, AppState, DailyRecord, Theme, ACTIVE_MINUTES_MAX, VERSION,
};
use crate::status::{Status, StatusChannel};
use crate::storage::{Config, Database, KeyValueStore, MemoryStorage, Thresholds};

/// Result of a persist attempt. Failures have already been reported on the
/// status channel.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

pub struct StateStore {
    state: AppState,
    backend: Box<dyn KeyValueStore>,
    state_key: String,
    window: ProgramWindow,
    thresholds: Thresholds,
    status: StatusChannel,
    timer: SprintTimer,
}

impl StateStore {
    /// Open the on-disk database named in `config` and load the state.
    ///
    /// When the database cannot be opened the store falls back to
    /// process-local memory; see [`StateStore::is_durable`].
    ///
    /// # Errors
    /// Returns an error only if the configured program window is invalid.
    pub fn open(config: &Config) -> Result<Self> {
        let backend: Box<dyn KeyValueStore> = match Database::open(&config.storage.database) {
            Ok(db) => Box::new(db),
            Err(e) => {
                tracing::warn!(error = %e, "storage unavailable, keeping state in memory");
                Box::new(MemoryStorage::new())
            }
        };
        Self::with_backend(backend, config)
    }

    /// Load the state from an explicit backend.
    ///
    /// # Errors
    /// Returns an error only if the configured program window is invalid.
    pub fn with_backend(backend: Box<dyn KeyValueStore>, config: &Config) -> Result<Self> {
        let window = config.window()?;
        let state_key = config.storage.state_key.clone();
        let state = load_state(backend.as_ref(), &state_key, &window);
        Ok(Self {
            state,
            backend,
            state_key,
            window,
            thresholds: config.thresholds.clone(),
            status: StatusChannel::new(Duration::from_millis(config.status.revert_ms)),
            timer: SprintTimer::new(),
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn window(&self) -> &ProgramWindow {
        &self.window
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }

    /// Whether saved state survives the process.
    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    // ── Status channel ───────────────────────────────────────────────

    /// Install the status handler, replacing any earlier one.
    pub fn register_status(&mut self, handler: impl FnMut(&Status) + 'static) {
        self.status.register(handler);
    }

    /// Send the pending "ready" once its delay has passed.
    pub fn poll_status(&mut self, now: Instant) -> bool {
        self.status.poll(now)
    }

    /// Send the pending "ready" now.
    pub fn flush_status(&mut self) -> bool {
        self.status.flush()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Run the compliance guard, stamp `lastSaved` and write the blob.
    ///
    /// Emits guard notices, then either "saved" (reverting to "ready"
    /// later) or "save failed". Never retries.
    pub fn persist(&mut self) -> SaveOutcome {
        for notice in compliance_guard(&self.state.daily, self.thresholds.daily_minutes_guard) {
            self.status.notify(Status::Guard(notice));
        }
        self.state.last_saved = now_ms();

        let written = serde_json::to_string(&self.state)
            .map_err(|e| e.to_string())
            .and_then(|blob| {
                self.backend
                    .set(&self.state_key, &blob)
                    .map(|()| blob.len())
                    .map_err(|e| e.to_string())
            });
        match written {
            Ok(bytes) => {
                tracing::debug!(bytes, key = %self.state_key, "state saved");
                self.status.notify_transient(Status::Saved);
                SaveOutcome::Saved
            }
            Err(error) => {
                tracing::warn!(%error, "saving state failed");
                self.status.notify(Status::SaveFailed);
                SaveOutcome::Failed
            }
        }
    }

    /// Normalize `next`, make it the live state and persist it.
    pub fn replace(&mut self, next: &Value) -> SaveOutcome {
        self.timer.detach();
        self.state = normalize(next, &self.window);
        self.persist()
    }

    /// Archive the day, save, and return the state as pretty JSON.
    ///
    /// # Errors
    /// Returns an error if the state cannot be serialized.
    pub fn export(&mut self) -> Result<String> {
        self.archive_current_daily();
        if self.persist() == SaveOutcome::Failed {
            tracing::debug!("exporting state that could not be saved");
        }
        let json = serde_json::to_string_pretty(&self.state)?;
        self.status.notify(Status::ExportCreated);
        Ok(json)
    }

    /// Parse a backup document and replace the state with it.
    ///
    /// # Errors
    /// Returns [`ImportError`] for unparsable or non-object documents; the
    /// live state is unchanged in that case.
    pub fn import_str(&mut self, text: &str) -> Result<Event> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.import_value(value),
            Err(e) => {
                tracing::warn!(error = %e, "import document is not valid JSON");
                self.status.notify(Status::ImportFailed);
                Err(ImportError::Parse(e).into())
            }
        }
    }

    /// Replace the state with a parsed backup.
    ///
    /// The backup's top-level keys are laid over a fresh seed, so a section
    /// the backup lacks (e.g. `home`) comes back seeded rather than empty.
    /// The version is always rewritten to [`VERSION`].
    ///
    /// # Errors
    /// Returns [`ImportError::NotAnObject`] if `value` is not an object.
    pub fn import_value(&mut self, value: Value) -> Result<Event> {
        let Value::Object(obj) = value else {
            tracing::warn!("import document root is not an object");
            self.status.notify(Status::ImportFailed);
            return Err(ImportError::NotAnObject.into());
        };
        let mut merged = match serde_json::to_value(AppState::seed(&self.window)) {
            Ok(Value::Object(seed)) => seed,
            _ => Map::new(),
        };
        merged.extend(obj);
        merged.insert("version".into(), Value::String(VERSION.into()));
        if self.replace(&Value::Object(merged)) == SaveOutcome::Failed {
            tracing::warn!("imported state could not be saved");
        }
        self.status.notify(Status::ImportOk);
        tracing::info!(
            logbook = self.state.logbook.len(),
            audits = self.state.audits.len(),
            "state imported"
        );
        Ok(Event::StateImported {
            version: self.state.version.clone(),
            at: Utc::now(),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Upsert a copy of the current day into the logbook by date.
    /// Does nothing while the day has no date.
    pub fn archive_current_daily(&mut self) {
        let daily = &self.state.daily;
        if daily.date.is_empty() {
            return;
        }
        match self.state.logbook.iter_mut().find(|l| l.date == daily.date) {
            Some(existing) => *existing = daily.clone(),
            None => self.state.logbook.push(daily.clone()),
        }
    }

    /// Archive the current day and make `date` the active one, restoring it
    /// from the logbook when present.
    ///
    /// # Errors
    /// Returns a validation error if `date` is not `YYYY-MM-DD`.
    pub fn switch_day(&mut self, date: &str) -> Result<Event> {
        let date = to_iso(parse_iso(date)?);
        self.archive_current_daily();

        let restored = self.state.logbook.iter().find(|l| l.date == date).cloned();
        let from = std::mem::take(&mut self.state.daily.date);
        let is_restored = restored.is_some();
        self.state.daily = restored.unwrap_or_else(|| DailyRecord::for_date(date.clone()));
        tracing::info!(%from, to = %date, restored = is_restored, "switched day");

        Ok(Event::DaySwitched {
            from,
            to: date,
            restored: is_restored,
            at: Utc::now(),
        })
    }

    /// Evaluate the program warnings, recording milestones on the state.
    pub fn evaluate_warnings(&mut self, today: NaiveDate) -> Vec<Warning> {
        evaluate_global_warnings(&mut self.state, &self.thresholds, today)
    }

    /// Archive the current day, then draft `kind`.
    pub fn generate(&mut self, kind: DocumentKind, today: NaiveDate) -> Document {
        self.archive_current_daily();
        generator::generate(&self.state, kind, today)
    }

    // ── Sprint ───────────────────────────────────────────────────────

    /// Start or resume the sprint. `None` if it is already live.
    pub fn sprint_start(&mut self) -> Option<(TickToken, Event)> {
        self.timer.start(&mut self.state.sprint)
    }

    /// Advance the sprint by one second.
    ///
    /// On completion the sprint counter and the day's active minutes grow
    /// (minutes stay capped at 600) and the state is persisted.
    pub fn sprint_tick(&mut self, token: TickToken) -> (TickOutcome, Option<Event>) {
        let outcome = self.timer.tick(token, &mut self.state.sprint);
        let TickOutcome::Completed { duration_min } = outcome else {
            return (outcome, None);
        };

        let kpis = &mut self.state.home.kpis;
        kpis.sprints = kpis.sprints.saturating_add(1);
        let daily = &mut self.state.daily;
        daily.active_minutes = daily
            .active_minutes
            .saturating_add(duration_min)
            .min(ACTIVE_MINUTES_MAX);
        let event = Event::SprintCompleted {
            duration_min,
            sprints: kpis.sprints,
            active_minutes: daily.active_minutes,
            at: Utc::now(),
        };
        tracing::info!(duration_min, sprints = kpis.sprints, "sprint completed");
        if self.persist() == SaveOutcome::Failed {
            tracing::warn!("completed sprint could not be saved");
        }
        (outcome, Some(event))
    }

    pub fn sprint_stop(&mut self, reset: bool) -> Event {
        self.timer.stop(&mut self.state.sprint, reset)
    }

    pub fn sprint_is_live(&self) -> bool {
        self.timer.is_live()
    }

    pub fn set_sprint_duration(&mut self, minutes: u32) {
        sprint::set_duration(&mut self.state.sprint, minutes);
    }

    pub fn set_sprint_note(&mut self, note: &str) {
        self.state.sprint.note = note.to_string();
    }

    /// Whether one more sprint would push today past the daily guardrail.
    pub fn sprint_exceeds_guardrail(&self) -> bool {
        self.state
            .daily
            .active_minutes
            .saturating_add(self.state.sprint.duration_min)
            > self.thresholds.daily_minutes_guard
    }

    // ── View settings ────────────────────────────────────────────────

    pub fn toggle_theme(&mut self) -> Theme {
        self.state.theme = self.state.theme.toggled();
        self.state.theme
    }

    pub fn set_active_tab(&mut self, tab: ActiveTab) {
        self.state.active_tab = tab;
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state_key", &self.state_key)
            .field("durable", &self.backend.is_durable())
            .field("window", &self.window)
            .field("status", &self.status)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

/// Read and normalize the persisted blob, reseeding when it is missing or
/// unreadable.
fn load_state(backend: &dyn KeyValueStore, key: &str, window: &ProgramWindow) -> AppState {
    match backend.get(key) {
        Ok(Some(blob)) => match serde_json::from_str::<Value>(&blob) {
            Ok(raw) => {
                tracing::debug!(bytes = blob.len(), "loaded persisted state");
                normalize(&raw, window)
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted state is not valid JSON, reseeding");
                AppState::seed(window)
            }
        },
        Ok(None) => {
            tracing::debug!("no persisted state, seeding");
            AppState::seed(window)
        }
        Err(e) => {
            tracing::warn!(error = %e, "reading persisted state failed, reseeding");
            AppState::seed(window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> StateStore {
        StateStore::with_backend(Box::new(MemoryStorage::new()), &Config::default()).unwrap()
    }

    fn recorder(store: &mut StateStore) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.register_status(move |s| sink.borrow_mut().push(s.to_string()));
        seen
    }

    #[test]
    fn empty_backend_seeds() {
        let store = store();
        assert_eq!(store.state().home.mit.len(), 3);
        assert!(!store.is_durable());
    }

    #[test]
    fn corrupt_blob_reseeds() {
        let mut backend = MemoryStorage::new();
        backend.set(crate::storage::STORAGE_KEY, "{not json").unwrap();
        let store = StateStore::with_backend(Box::new(backend), &Config::default()).unwrap();
        assert_eq!(store.state().version, VERSION);
        assert!(store.state().audits.is_empty());
    }

    #[test]
    fn persist_reports_saved_then_ready() {
        let mut store = store();
        let seen = recorder(&mut store);
        assert_eq!(store.persist(), SaveOutcome::Saved);
        assert!(store.flush_status());
        assert_eq!(*seen.borrow(), vec!["saved", "ready"]);
        let blob = store.backend().get(crate::storage::STORAGE_KEY).unwrap();
        assert!(blob.unwrap().contains("\"version\""));
    }

    #[test]
    fn persist_runs_guard_first() {
        let mut store = store();
        let seen = recorder(&mut store);
        store.set_active_minutes(200);
        store.set_log(LogKind::Exec, "Kundenauftrag erledigt");
        let _ = store.persist();
        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].starts_with("Over 3h"));
        assert!(seen[1].starts_with("Execution log"));
        assert_eq!(seen[2], "saved");
    }

    #[test]
    fn archive_twice_keeps_one_entry() {
        let mut store = store();
        store.archive_current_daily();
        store.set_active_minutes(42);
        store.archive_current_daily();
        assert_eq!(store.state().logbook.len(), 1);
        assert_eq!(store.state().logbook[0].active_minutes, 42);
    }

    #[test]
    fn switch_day_restores_from_logbook() {
        let mut store = store();
        store.switch_day("2025-11-10").unwrap();
        store.set_active_minutes(120);
        store.switch_day("2025-11-11").unwrap();
        assert_eq!(store.state().daily.active_minutes, 0);

        let event = store.switch_day("2025-11-10").unwrap();
        assert!(matches!(event, Event::DaySwitched { restored: true, .. }));
        assert_eq!(store.state().daily.active_minutes, 120);
        assert!(store.switch_day("10.11.2025").is_err());
    }

    #[test]
    fn import_rejects_bad_json_without_mutation() {
        let mut store = store();
        store.set_active_minutes(33);
        let seen = recorder(&mut store);
        assert!(store.import_str("{broken").is_err());
        assert!(store.import_str("[1, 2]").is_err());
        assert_eq!(store.state().daily.active_minutes, 33);
        assert_eq!(*seen.borrow(), vec!["import failed", "import failed"]);
    }

    #[test]
    fn import_forces_current_version() {
        let mut store = store();
        let seen = recorder(&mut store);
        let event = store
            .import_str(r#"{"version":"1.0","theme":"light","audits":[{"domain":"x.de"}]}"#)
            .unwrap();
        assert!(matches!(event, Event::StateImported { .. }));
        assert_eq!(store.state().version, VERSION);
        assert_eq!(store.state().theme, Theme::Light);
        assert_eq!(store.state().audits[0].domain, "x.de");
        assert_eq!(*seen.borrow(), vec!["saved", "import ok"]);
    }

    #[test]
    fn sprint_completion_updates_counters() {
        let mut store = store();
        store.set_sprint_duration(30);
        let (token, _) = store.sprint_start().unwrap();
        assert!(store.sprint_start().is_none());

        let mut completed = None;
        for _ in 0..1800 {
            let (outcome, event) = store.sprint_tick(token);
            if let TickOutcome::Completed { .. } = outcome {
                completed = event;
                break;
            }
        }
        assert!(matches!(
            completed,
            Some(Event::SprintCompleted {
                sprints: 1,
                active_minutes: 30,
                ..
            })
        ));
        assert_eq!(store.state().home.kpis.sprints, 1);
        assert!(!store.sprint_is_live());
    }

    #[test]
    fn import_keeps_seed_sections_the_backup_lacks() {
        let mut store = store();
        store.import_value(serde_json::json!({"logbook": []})).unwrap();
        assert_eq!(store.state().home.mit.len(), 3);
        assert_eq!(store.state().sprint.duration_min, 90);

        store
            .import_value(serde_json::json!({"home": {"kpis": {"sprints": 2}}}))
            .unwrap();
        assert!(store.state().home.mit.is_empty());
        assert_eq!(store.state().home.kpis.sprints, 2);
    }

    #[test]
    fn huge_imported_numbers_stay_in_range() {
        let mut store = store();
        store
            .import_value(serde_json::json!({"daily": {"activeMinutes": 4_294_967_295u64}}))
            .unwrap();
        assert_eq!(store.state().daily.active_minutes, 600);
        assert!(store.sprint_exceeds_guardrail());

        store
            .import_value(serde_json::json!({"sprint": {"durationMin": 100_000_000}}))
            .unwrap();
        let (_, event) = store.sprint_start().unwrap();
        assert!(matches!(
            event,
            Event::SprintStarted {
                duration_min: 180,
                remaining_sec: 10_800,
                ..
            }
        ));
    }

    #[test]
    fn completed_sprint_keeps_minutes_capped() {
        let mut store = store();
        store.set_active_minutes(590);
        store.set_sprint_duration(30);
        let (token, _) = store.sprint_start().unwrap();
        let mut event = None;
        for _ in 0..1800 {
            if let (TickOutcome::Completed { .. }, done) = store.sprint_tick(token) {
                event = done;
                break;
            }
        }
        assert!(matches!(
            event,
            Some(Event::SprintCompleted {
                active_minutes: 600,
                ..
            })
        ));
        assert_eq!(store.state().daily.active_minutes, 600);
    }

    #[test]
    fn guardrail_counts_todays_minutes() {
        let mut store = store();
        store.set_active_minutes(90);
        assert!(!store.sprint_exceeds_guardrail());
        store.set_active_minutes(91);
        assert!(store.sprint_exceeds_guardrail());
    }
}
