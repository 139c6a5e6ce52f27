use clap::Subcommand;
use phoenix_core::Config;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum MitAction {
    /// List items
    List,
    /// Add an item; the oldest is dropped when three exist
    Add { text: String },
    /// Flip the done flag
    Toggle { id: String },
}

pub fn run(action: MitAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        MitAction::List => return print_json(&store.state().home.mit),
        MitAction::Add { text } => {
            let item = store.add_mit(&text)?.clone();
            print_json(&item)?;
        }
        MitAction::Toggle { id } => {
            let done = store.toggle_mit(&id)?;
            println!("{}", if done { "done" } else { "open" });
        }
    }

    save(&mut store)
}
