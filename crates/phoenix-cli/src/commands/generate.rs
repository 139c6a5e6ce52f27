use clap::Subcommand;
use phoenix_core::dates;
use phoenix_core::derive::LogRange;
use phoenix_core::{Config, DocumentKind};

use super::{open_store, print_json, save, CmdResult};

#[derive(Subcommand)]
pub enum GenerateKind {
    /// Day-X package for counsel
    TagX {
        /// Print title and body as JSON
        #[arg(long)]
        json: bool,
    },
    /// Performance protocol over a log range
    Protocol {
        /// 30, 60 or all
        #[arg(long, default_value = "30")]
        range: LogRange,
        #[arg(long)]
        json: bool,
    },
    /// Short income statement per year
    Income {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(kind: GenerateKind, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;
    let (kind, json) = match kind {
        GenerateKind::TagX { json } => (DocumentKind::TagX, json),
        GenerateKind::Protocol { range, json } => (DocumentKind::Protocol(range), json),
        GenerateKind::Income { json } => (DocumentKind::Income, json),
    };

    let document = store.generate(kind, dates::today());
    save(&mut store)?;

    if json {
        print_json(&document)
    } else {
        println!("{}\n", document.title);
        print!("{}", document.body);
        Ok(())
    }
}
