use std::io::Write;
use std::time::{Duration, Instant};

use clap::Subcommand;
use phoenix_core::{format_timer, Config, StateStore, TickOutcome, TickToken};
use serde_json::json;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum SprintAction {
    /// Print the sprint record
    Status,
    /// Run the sprint in the foreground until it completes or Ctrl-C
    Start {
        /// Start even past the daily guardrail
        #[arg(long)]
        force: bool,
    },
    /// Stop and keep the remaining time
    Stop,
    /// Stop and rearm for the full duration
    Reset,
    /// Set the sprint length in minutes (clamped to 30..=180)
    Duration { minutes: u32 },
    /// Set the sprint goal
    Note { text: String },
}

pub fn run(action: SprintAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        SprintAction::Status => {
            let sprint = &store.state().sprint;
            return print_json(&json!({
                "running": sprint.running,
                "durationMin": sprint.duration_min,
                "remainingSec": sprint.remaining_sec,
                "remaining": format_timer(sprint.remaining_sec),
                "note": sprint.note,
                "exceedsGuardrail": store.sprint_exceeds_guardrail(),
            }));
        }
        SprintAction::Start { force } => {
            if store.sprint_exceeds_guardrail() && !force {
                return Err(format!(
                    "this sprint would push today past {} minutes; record the strain in the health log and pass --force",
                    store.thresholds().daily_minutes_guard
                )
                .into());
            }
            return run_foreground(&mut store);
        }
        SprintAction::Stop => print_json(&store.sprint_stop(false))?,
        SprintAction::Reset => print_json(&store.sprint_stop(true))?,
        SprintAction::Duration { minutes } => {
            store.set_sprint_duration(minutes);
            println!("{}", store.state().sprint.duration_min);
        }
        SprintAction::Note { text } => {
            store.set_sprint_note(&text);
            println!("ok");
        }
    }

    save(&mut store)
}

/// Drive the sprint with a one-second interval on a current-thread runtime.
fn run_foreground(store: &mut StateStore) -> CmdResult {
    let Some((token, event)) = store.sprint_start() else {
        return Err("sprint is already running".into());
    };
    print_json(&event)?;
    save(store)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(tick_loop(store, token))
}

async fn tick_loop(store: &mut StateStore, token: TickToken) -> CmdResult {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // the first tick fires immediately
    interval.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                match store.sprint_tick(token) {
                    (TickOutcome::Running { remaining_sec }, _) => {
                        eprint!("\r{}", format_timer(remaining_sec));
                        std::io::stderr().flush()?;
                        store.poll_status(Instant::now());
                    }
                    (TickOutcome::Completed { .. }, event) => {
                        eprintln!();
                        eprintln!("Sprint finished. Record the outcome in the facts or exec log.");
                        if let Some(event) = event {
                            print_json(&event)?;
                        }
                        store.flush_status();
                        return Ok(());
                    }
                    (TickOutcome::Ignored, _) => return Ok(()),
                }
            }
            _ = &mut ctrl_c => {
                eprintln!();
                print_json(&store.sprint_stop(false))?;
                return save(store);
            }
        }
    }
}
