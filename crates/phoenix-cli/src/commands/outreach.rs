use clap::Subcommand;
use phoenix_core::derive::outreach_by_status;
use phoenix_core::state::OutreachStatus;
use phoenix_core::Config;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum OutreachAction {
    /// Record an exploration contact
    Add {
        contact: String,
        channel: String,
        #[arg(long, default_value = "")]
        handle: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List contacts
    List {
        /// Only contacts with this status
        #[arg(long)]
        status: Option<OutreachStatus>,
    },
    /// Mark the start clause as confirmed
    Confirm { id: String },
    /// Delete a contact
    Delete { id: String },
}

pub fn run(action: OutreachAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        OutreachAction::Add {
            contact,
            channel,
            handle,
            notes,
        } => {
            let outreach = store
                .add_outreach(&contact, &channel, &handle, &notes)?
                .clone();
            print_json(&outreach)?;
        }
        OutreachAction::List { status } => {
            let outreach = &store.state().outreach;
            return match status {
                Some(status) => print_json(&outreach_by_status(outreach, status)),
                None => print_json(outreach),
            };
        }
        OutreachAction::Confirm { id } => {
            store.confirm_outreach(&id)?;
            println!("confirmed");
        }
        OutreachAction::Delete { id } => {
            let outreach = store.delete_outreach(&id)?;
            println!("deleted {}", outreach.contact);
        }
    }

    save(&mut store)
}
