use clap::Subcommand;
use phoenix_core::state::EvidenceType;
use phoenix_core::Config;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum EvidenceAction {
    /// Record an evidence item; needs a title or a note
    Add {
        #[arg(long, default_value = "")]
        title: String,
        /// SEO, UX, Tech, P0, P1 or P2
        #[arg(long = "type", default_value = "SEO")]
        kind: EvidenceType,
        /// Audit id to link
        #[arg(long)]
        audit: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List evidence, optionally for one audit
    List {
        #[arg(long)]
        audit: Option<String>,
    },
    /// Delete an evidence item
    Delete { id: String },
}

pub fn run(action: EvidenceAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        EvidenceAction::Add {
            title,
            kind,
            audit,
            note,
        } => {
            let evidence = store
                .add_evidence(&title, kind, audit.as_deref(), &note)?
                .clone();
            if evidence.audit_id.is_some() && store.audit_for_evidence(&evidence.id).is_none() {
                eprintln!("warning: no audit with that id, evidence is stored unlinked");
            }
            print_json(&evidence)?;
        }
        EvidenceAction::List { audit } => {
            return match audit {
                Some(id) => print_json(&store.evidence_for_audit(&id)),
                None => print_json(&store.state().evidence),
            };
        }
        EvidenceAction::Delete { id } => {
            let evidence = store.delete_evidence(&id)?;
            println!("deleted {}", evidence.id);
        }
    }

    save(&mut store)
}
