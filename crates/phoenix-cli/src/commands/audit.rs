use clap::Subcommand;
use phoenix_core::state::Stage;
use phoenix_core::Config;
use serde_json::json;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum AuditAction {
    /// Create a prototype audit
    Add {
        domain: String,
        /// NEU, IN_ARBEIT, ENTWURF or FERTIG_INTERNAL
        #[arg(long, default_value = "NEU")]
        stage: Stage,
    },
    /// List audits, optionally filtered
    List {
        /// Case-insensitive domain substring
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        stage: Option<Stage>,
    },
    /// Show one audit with its linked evidence
    Show { id: String },
    /// Move an audit to another stage
    Stage { id: String, stage: Stage },
    /// Check or uncheck a gate item
    Gate {
        id: String,
        /// klartext, belege, struktur, prio, mobil, intern or exec
        key: String,
        /// Uncheck instead of check
        #[arg(long)]
        off: bool,
    },
    /// Delete an audit; linked evidence is kept
    Delete { id: String },
}

pub fn run(action: AuditAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        AuditAction::Add { domain, stage } => {
            let audit = store.add_audit(&domain, stage)?.clone();
            print_json(&audit)?;
        }
        AuditAction::List { query, stage } => {
            return print_json(&store.search_audits(&query, stage));
        }
        AuditAction::Show { id } => {
            let audit = store
                .state()
                .find_audit(&id)
                .ok_or_else(|| format!("no audit with id '{id}'"))?;
            return print_json(&json!({
                "audit": audit,
                "evidence": store.evidence_for_audit(&id),
            }));
        }
        AuditAction::Stage { id, stage } => {
            store.set_audit_stage(&id, stage)?;
            println!("{stage}");
        }
        AuditAction::Gate { id, key, off } => {
            let score = store.set_gate(&id, &key, !off)?;
            println!("gate score: {score}");
        }
        AuditAction::Delete { id } => {
            let audit = store.delete_audit(&id)?;
            println!("deleted {}", audit.domain);
        }
    }

    save(&mut store)
}
