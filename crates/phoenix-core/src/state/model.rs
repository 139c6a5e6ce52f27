//! Application state model.
//!
//! Field names serialize in camelCase so the persisted blob and exported
//! backups keep the same shape across versions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::{self, ProgramWindow};
use crate::error::ValidationError;

/// Wire names for a unit enum: `as_str`, `Display` and a case-insensitive
/// `FromStr`.
macro_rules! wire_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case($name) {
                        return Ok($ty::$variant);
                    }
                )+
                Err(ValidationError::invalid(
                    stringify!($ty),
                    format!("unknown value {s:?}, expected one of: {}", [$($name),+].join(", ")),
                ))
            }
        }
    };
}

/// Schema tag written into every persisted state.
pub const VERSION: &str = "12.2-omega-final";

/// Default sprint length in minutes.
pub const DEFAULT_SPRINT_MIN: u32 = 90;

pub const SPRINT_MIN_RANGE: (u32, u32) = (30, 180);
pub const ACTIVE_MINUTES_MAX: u32 = 600;
pub const MIT_CAPACITY: usize = 3;

const SEED_MIT: [&str; 3] = [
    "Heute Mini-Betrieb transparent halten (keine Expansion, keine Grauzone).",
    "Zeitjournal & Logs sauber pflegen.",
    "80-Tage-Route kurz spiegeln.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// View-routing hint persisted across reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    Home,
    Fokus,
    Prototypen,
    Evidence,
    Outreach,
    Manifest,
    #[default]
    Generator,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 7] = [
        ActiveTab::Home,
        ActiveTab::Fokus,
        ActiveTab::Prototypen,
        ActiveTab::Evidence,
        ActiveTab::Outreach,
        ActiveTab::Manifest,
        ActiveTab::Generator,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActiveTab::Home => "home",
            ActiveTab::Fokus => "fokus",
            ActiveTab::Prototypen => "prototypen",
            ActiveTab::Evidence => "evidence",
            ActiveTab::Outreach => "outreach",
            ActiveTab::Manifest => "manifest",
            ActiveTab::Generator => "generator",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// Target route of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Route {
    #[default]
    A,
    B,
}

wire_names!(Route { A => "A", B => "B" });

/// Working mode of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DayMode {
    #[default]
    A,
    B,
}

wire_names!(DayMode { A => "A", B => "B" });

/// Program configuration record.
///
/// Keys this version does not know about are kept in `extra` so a newer
/// backup survives a load/save cycle through an older build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phoenix {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub target_route: Route,
    pub p_konto: bool,
    pub business_account_cold: bool,
    pub pi_prepared: bool,
    pub drv_notice_sent: bool,
    pub lta_prepared: bool,
    pub zeitjournal_stable: bool,
    pub tag_x_package_draft: bool,
    pub route_decision_note: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Phoenix {
    pub fn new(window: &ProgramWindow) -> Self {
        Self {
            start: window.start(),
            end: window.end(),
            target_route: Route::A,
            p_konto: false,
            business_account_cold: false,
            pi_prepared: false,
            drv_notice_sent: false,
            lta_prepared: false,
            zeitjournal_stable: false,
            tag_x_package_draft: false,
            route_decision_note: String::new(),
            extra: BTreeMap::new(),
        }
    }
}

/// One day of tracking. Mutable while it is the active `daily`, frozen once
/// copied into the logbook.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyRecord {
    /// ISO date; empty for records that never had one.
    pub date: String,
    pub mode: DayMode,
    pub active_minutes: u32,
    pub health_log: String,
    pub exec_log: String,
    pub facts_log: String,
    pub buddha_note: String,
    pub outreach_today: u32,
}

impl DailyRecord {
    /// Zeroed record for `date`.
    pub fn for_date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }
}

/// Zeroed record for today.
pub fn default_daily() -> DailyRecord {
    DailyRecord::for_date(dates::today_iso())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FinanceType {
    #[default]
    #[serde(rename = "EIN")]
    Income,
    #[serde(rename = "AUS")]
    Expense,
}

wire_names!(FinanceType {
    Income => "EIN",
    Expense => "AUS",
});

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinanceEntry {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: FinanceType,
    pub amount: f64,
    pub note: String,
    /// Grouping key, the first four characters of `date`.
    pub year: String,
}

impl FinanceEntry {
    /// Year used for grouping, falling back to the date prefix.
    pub fn effective_year(&self) -> &str {
        if !self.year.is_empty() {
            &self.year
        } else {
            self.date.get(..4).unwrap_or("")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Finances {
    pub entries: Vec<FinanceEntry>,
}

/// "Most important task" item on the home view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MitItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Kpis {
    #[serde(default)]
    pub sprints: u32,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Home {
    pub mit: Vec<MitItem>,
    pub kpis: Kpis,
}

/// Focus-timer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub running: bool,
    /// Epoch milliseconds of the first start; `None` until started.
    pub started_at: Option<i64>,
    pub duration_min: u32,
    pub remaining_sec: u32,
    pub note: String,
    pub buddha_pause_before: bool,
}

impl Sprint {
    /// Full countdown length in seconds.
    pub fn full_seconds(&self) -> u32 {
        self.duration_min.saturating_mul(60)
    }
}

impl Default for Sprint {
    fn default() -> Self {
        Self {
            running: false,
            started_at: None,
            duration_min: DEFAULT_SPRINT_MIN,
            remaining_sec: DEFAULT_SPRINT_MIN * 60,
            note: String::new(),
            buddha_pause_before: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    #[serde(rename = "NEU")]
    New,
    #[serde(rename = "IN_ARBEIT")]
    InProgress,
    #[serde(rename = "ENTWURF")]
    Draft,
    #[serde(rename = "FERTIG_INTERNAL")]
    FinishedInternal,
}

wire_names!(Stage {
    New => "NEU",
    InProgress => "IN_ARBEIT",
    Draft => "ENTWURF",
    FinishedInternal => "FERTIG_INTERNAL",
});

/// Prototype audit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Audit {
    pub id: String,
    pub domain: String,
    pub stage: Stage,
    pub created: String,
    pub gate: BTreeMap<String, bool>,
    /// Always equal to `calc_gate_score(&gate)` after a gate mutation.
    pub gate_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvidenceType {
    #[default]
    #[serde(rename = "SEO")]
    Seo,
    #[serde(rename = "UX")]
    Ux,
    Tech,
    P0,
    P1,
    P2,
}

wire_names!(EvidenceType {
    Seo => "SEO",
    Ux => "UX",
    Tech => "Tech",
    P0 => "P0",
    P1 => "P1",
    P2 => "P2",
});

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Evidence {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EvidenceType,
    /// Non-owning lookup key into `audits`; may dangle.
    pub audit_id: Option<String>,
    pub note: String,
    pub created: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutreachStatus {
    #[default]
    #[serde(rename = "EXPLORATION")]
    Exploration,
    #[serde(rename = "EXPLORATION (Klausel OK)")]
    ClauseConfirmed,
}

wire_names!(OutreachStatus {
    Exploration => "EXPLORATION",
    ClauseConfirmed => "EXPLORATION (Klausel OK)",
});

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Outreach {
    pub id: String,
    pub contact: String,
    pub channel: String,
    pub handle: String,
    pub notes: String,
    pub status: OutreachStatus,
    pub created: String,
}

/// The whole application state owned by a [`crate::StateStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub version: String,
    pub theme: Theme,
    pub active_tab: ActiveTab,
    /// Epoch milliseconds of the last successful persist.
    pub last_saved: i64,
    pub phoenix: Phoenix,
    pub daily: DailyRecord,
    pub logbook: Vec<DailyRecord>,
    pub finances: Finances,
    pub home: Home,
    pub sprint: Sprint,
    pub audits: Vec<Audit>,
    pub evidence: Vec<Evidence>,
    pub outreach: Vec<Outreach>,
    /// Top-level keys from a newer schema, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AppState {
    /// Freshly seeded state.
    pub fn seed(window: &ProgramWindow) -> Self {
        Self {
            version: VERSION.to_string(),
            theme: Theme::Dark,
            active_tab: ActiveTab::Generator,
            last_saved: dates::now_ms(),
            phoenix: Phoenix::new(window),
            daily: default_daily(),
            logbook: Vec::new(),
            finances: Finances::default(),
            home: Home {
                mit: SEED_MIT
                    .iter()
                    .map(|text| MitItem {
                        id: new_id(),
                        text: (*text).to_string(),
                        done: false,
                    })
                    .collect(),
                kpis: Kpis::default(),
            },
            sprint: Sprint::default(),
            audits: Vec::new(),
            evidence: Vec::new(),
            outreach: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn find_audit(&self, id: &str) -> Option<&Audit> {
        self.audits.iter().find(|a| a.id == id)
    }

    pub fn find_audit_mut(&mut self, id: &str) -> Option<&mut Audit> {
        self.audits.iter_mut().find(|a| a.id == id)
    }
}

/// Short random identifier for entity records.
pub fn new_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
