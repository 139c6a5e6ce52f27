use chrono::Datelike;
use phoenix_core::dates;
use phoenix_core::derive::{
    compliance_guard, filter_logs_by_range, finance_by_year, logs_with_current_day,
    manifest_status, program_window_info, LogRange,
};
use phoenix_core::{format_timer, Config};
use serde_json::json;

use super::{open_store, print_json, save, CmdResult};

pub fn status(config: &Config) -> CmdResult {
    let store = open_store(config)?;
    let state = store.state();
    let today = dates::today();

    let info = program_window_info(store.window(), today);
    let year = today.year().to_string();
    let income = finance_by_year(&state.finances.entries)
        .get(&year)
        .map(|t| t.income)
        .unwrap_or(0.0);
    let guard: Vec<&str> = compliance_guard(&state.daily, store.thresholds().daily_minutes_guard)
        .into_iter()
        .map(|n| n.message())
        .collect();

    print_json(&json!({
        "version": state.version,
        "today": dates::to_iso(today),
        "window": {
            "start": dates::to_iso(store.window().start()),
            "end": dates::to_iso(store.window().end()),
            "total": info.total,
            "passed": info.passed,
            "left": info.left,
            "phase": info.phase(),
        },
        "daily": state.daily,
        "guard": guard,
        "sprint": {
            "running": state.sprint.running,
            "durationMin": state.sprint.duration_min,
            "remaining": format_timer(state.sprint.remaining_sec),
            "note": state.sprint.note,
        },
        "manifest": manifest_status(state),
        "incomeThisYear": income,
        "theme": state.theme,
        "activeTab": state.active_tab,
        "durable": store.is_durable(),
    }))
}

pub fn window(config: &Config) -> CmdResult {
    let window = config.window()?;
    let info = program_window_info(&window, dates::today());
    print_json(&json!({
        "start": dates::to_iso(window.start()),
        "end": dates::to_iso(window.end()),
        "total": info.total,
        "passed": info.passed,
        "left": info.left,
        "phase": info.phase(),
    }))
}

pub fn warnings(config: &Config) -> CmdResult {
    let mut store = open_store(config)?;
    let warnings = store.evaluate_warnings(dates::today());
    save(&mut store)?;
    print_json(&warnings)
}

pub fn logs(range: LogRange, config: &Config) -> CmdResult {
    let store = open_store(config)?;
    let merged = logs_with_current_day(store.state());
    let logs = filter_logs_by_range(&merged, range, dates::today());
    print_json(&logs)
}
