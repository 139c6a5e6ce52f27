//! Application state: model, seeding and load-time normalization.

mod model;
mod normalize;

pub use model::{
    default_daily, new_id, ActiveTab, AppState, Audit, DailyRecord, DayMode, Evidence,
    EvidenceType, FinanceEntry, FinanceType, Finances, Home, Kpis, MitItem, Outreach,
    OutreachStatus, Phoenix, Route, Sprint, Stage, Theme, ACTIVE_MINUTES_MAX,
    DEFAULT_SPRINT_MIN, MIT_CAPACITY, SPRINT_MIN_RANGE, VERSION,
};
pub use normalize::normalize;
