use clap::Subcommand;
use phoenix_core::derive::finance_by_year;
use phoenix_core::state::FinanceType;
use phoenix_core::Config;
use serde_json::json;

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum FinanceAction {
    /// Record a booking
    Add {
        /// Amount in euros, must be positive
        amount: f64,
        /// EIN (income) or AUS (expense)
        #[arg(long = "type", default_value = "EIN")]
        kind: FinanceType,
        /// Booking date as YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List bookings, newest first
    List {
        #[arg(long)]
        year: Option<String>,
    },
    /// Income, expenses and profit per year
    Years,
}

pub fn run(action: FinanceAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;

    match action {
        FinanceAction::Add {
            amount,
            kind,
            date,
            note,
        } => {
            let entry = store
                .add_finance(date.as_deref(), kind, amount, &note)?
                .clone();
            print_json(&entry)?;
        }
        FinanceAction::List { year } => {
            let entries: Vec<_> = store
                .state()
                .finances
                .entries
                .iter()
                .filter(|e| year.as_deref().map_or(true, |y| e.effective_year() == y))
                .collect();
            return print_json(&entries);
        }
        FinanceAction::Years => {
            let years: Vec<_> = finance_by_year(&store.state().finances.entries)
                .into_iter()
                .map(|(year, t)| {
                    json!({
                        "year": year,
                        "income": t.income,
                        "expenses": t.expenses,
                        "profit": t.profit(),
                    })
                })
                .collect();
            return print_json(&years);
        }
    }

    save(&mut store)
}
