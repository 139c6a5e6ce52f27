//! Load-time normalization of arbitrary JSON into a well-formed [`AppState`].
//!
//! Rules per field (the lenient/strict split is intentional and differs
//! per field):
//!
//! | field | absent or malformed |
//! |---|---|
//! | `phoenix`, `sprint`, `home.kpis` | merged key by key over the seed |
//! | `daily` | today's zeroed record |
//! | `logbook`, `audits`, `evidence`, `outreach`, `finances.entries` | empty |
//! | `home.mit` | empty (not the three seed items) |
//! | `version` | [`VERSION`] |
//! | `theme` | dark unless exactly `"light"` |
//! | `activeTab` | generator |
//!
//! Collection elements are merged over their record default one field at a
//! time; a field of the wrong type falls back to its default and non-object
//! elements are dropped. Unknown top-level and `phoenix` keys are preserved.
//!
//! Numbers with a setter range are pulled back into it: `activeMinutes` of
//! `daily` and every logbook record to `0..=600`, `sprint.durationMin` to
//! `30..=180`, and `sprint.remainingSec` to at most the full duration.
//!
//! `normalize(normalize(x)) == normalize(x)` for every input.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::model::{
    default_daily, ActiveTab, AppState, Audit, DailyRecord, Evidence, FinanceEntry, Finances,
    Home, Kpis, MitItem, Outreach, Sprint, Theme, ACTIVE_MINUTES_MAX, SPRINT_MIN_RANGE, VERSION,
};
use crate::dates::{clamp, ProgramWindow};

const KNOWN_KEYS: [&str; 13] = [
    "version",
    "theme",
    "activeTab",
    "lastSaved",
    "phoenix",
    "daily",
    "logbook",
    "finances",
    "home",
    "sprint",
    "audits",
    "evidence",
    "outreach",
];

/// Produce a well-formed state from any JSON value.
pub fn normalize(raw: &Value, window: &ProgramWindow) -> AppState {
    let seed = AppState::seed(window);
    let Value::Object(obj) = raw else {
        return seed;
    };

    let home = obj.get("home");
    AppState {
        version: obj
            .get("version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .unwrap_or(VERSION)
            .to_string(),
        theme: match obj.get("theme").and_then(Value::as_str) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        },
        active_tab: obj
            .get("activeTab")
            .and_then(Value::as_str)
            .and_then(ActiveTab::from_name)
            .unwrap_or_default(),
        last_saved: obj
            .get("lastSaved")
            .and_then(Value::as_i64)
            .unwrap_or(seed.last_saved),
        phoenix: merge_over(&seed.phoenix, obj.get("phoenix")),
        daily: match obj.get("daily") {
            Some(v @ Value::Object(_)) => {
                bounded_day(merge_over(&DailyRecord::default(), Some(v)))
            }
            _ => default_daily(),
        },
        logbook: records::<DailyRecord>("logbook", obj.get("logbook"))
            .into_iter()
            .map(bounded_day)
            .collect(),
        finances: Finances {
            entries: records::<FinanceEntry>(
                "finances.entries",
                obj.get("finances").and_then(|f| f.get("entries")),
            ),
        },
        home: Home {
            mit: records::<MitItem>("home.mit", home.and_then(|h| h.get("mit"))),
            kpis: merge_over(&Kpis::default(), home.and_then(|h| h.get("kpis"))),
        },
        sprint: bounded_sprint(merge_over(&seed.sprint, obj.get("sprint"))),
        audits: records::<Audit>("audits", obj.get("audits")),
        evidence: records::<Evidence>("evidence", obj.get("evidence")),
        outreach: records::<Outreach>("outreach", obj.get("outreach")),
        extra: obj
            .iter()
            .filter(|(k, _)| !KNOWN_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

/// Pull active minutes back into `0..=600`.
fn bounded_day(mut day: DailyRecord) -> DailyRecord {
    day.active_minutes = day.active_minutes.min(ACTIVE_MINUTES_MAX);
    day
}

/// Pull the duration into the sprint range and the countdown under it.
fn bounded_sprint(mut sprint: Sprint) -> Sprint {
    let (min, max) = SPRINT_MIN_RANGE;
    sprint.duration_min = clamp(sprint.duration_min, min, max);
    sprint.remaining_sec = sprint.remaining_sec.min(sprint.full_seconds());
    sprint
}

/// Overlay the keys of `raw` onto `base`, keeping only keys whose value
/// deserializes into `T`.
fn merge_over<T>(base: &T, raw: Option<&Value>) -> T
where
    T: Serialize + DeserializeOwned + Clone,
{
    let Some(Value::Object(overlay)) = raw else {
        return base.clone();
    };
    let Ok(Value::Object(base_map)) = serde_json::to_value(base) else {
        return base.clone();
    };

    let mut merged = base_map.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    if let Ok(all) = serde_json::from_value::<T>(Value::Object(merged)) {
        return all;
    }

    let mut merged: Map<String, Value> = base_map;
    for (key, value) in overlay {
        let previous = merged.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            tracing::debug!(key = %key, "dropping field with unexpected type");
            match previous {
                Some(prev) => merged.insert(key.clone(), prev),
                None => merged.remove(key),
            };
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or_else(|_| base.clone())
}

/// Normalize an ordered collection. Anything but an array yields an empty
/// collection.
fn records<T>(field: &str, raw: Option<&Value>) -> Vec<T>
where
    T: Serialize + DeserializeOwned + Clone + Default,
{
    let Some(Value::Array(items)) = raw else {
        return Vec::new();
    };
    let template = T::default();
    let kept: Vec<T> = items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| merge_over(&template, Some(item)))
        .collect();
    if kept.len() != items.len() {
        tracing::warn!(
            field,
            dropped = items.len() - kept.len(),
            "dropped non-object entries during normalization"
        );
    }
    kept
}
