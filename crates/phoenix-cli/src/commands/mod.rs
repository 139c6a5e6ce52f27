pub mod audit;
pub mod backup;
pub mod config;
pub mod day;
pub mod evidence;
pub mod finance;
pub mod generate;
pub mod mit;
pub mod outreach;
pub mod overview;
pub mod sprint;
pub mod view;

use phoenix_core::{Config, SaveOutcome, StateStore};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the store and route status notifications to stderr.
pub fn open_store(config: &Config) -> Result<StateStore, Box<dyn std::error::Error>> {
    let mut store = StateStore::open(config)?;
    if !store.is_durable() {
        eprintln!("warning: storage unavailable, changes are kept for this run only");
    }
    store.register_status(|status| eprintln!("status: {status}"));
    Ok(store)
}

/// Persist once and settle the status line before the process exits.
pub fn save(store: &mut StateStore) -> CmdResult {
    let outcome = store.persist();
    store.flush_status();
    match outcome {
        SaveOutcome::Saved => Ok(()),
        SaveOutcome::Failed => Err("state could not be saved".into()),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
