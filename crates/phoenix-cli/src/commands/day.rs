use clap::Subcommand;
use phoenix_core::derive::compliance_guard;
use phoenix_core::state::DayMode;
use phoenix_core::{Config, LogKind};
use serde_json::json;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum DayAction {
    /// Print the active day
    Show,
    /// Archive the active day and switch to another date
    Switch {
        /// Date as YYYY-MM-DD
        date: String,
    },
    /// Set active minutes (clamped to 0..=600)
    Minutes {
        #[arg(allow_negative_numbers = true)]
        minutes: i64,
    },
    /// Set the day mode
    Mode {
        /// A or B
        mode: DayMode,
    },
    /// Replace one of the free-text logs
    Log {
        /// health, exec, facts or buddha
        kind: LogKind,
        text: String,
    },
}

pub fn run(action: DayAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        DayAction::Show => {
            let state = store.state();
            let guard: Vec<&str> =
                compliance_guard(&state.daily, store.thresholds().daily_minutes_guard)
                    .into_iter()
                    .map(|n| n.message())
                    .collect();
            return print_json(&json!({ "daily": state.daily, "guard": guard }));
        }
        DayAction::Switch { date } => {
            let event = store.switch_day(&date)?;
            print_json(&event)?;
        }
        DayAction::Minutes { minutes } => {
            let minutes = store.set_active_minutes(minutes);
            println!("{minutes}");
        }
        DayAction::Mode { mode } => {
            store.set_mode(mode);
            println!("{mode}");
        }
        DayAction::Log { kind, text } => {
            store.set_log(kind, &text);
            println!("{kind} log updated");
        }
    }

    save(&mut store)
}
