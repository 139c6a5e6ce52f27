use std::path::Path;

use phoenix_core::Config;

use super::{open_store, print_json, CmdResult};

pub fn export(out: Option<&Path>, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;
    let json = store.export()?;
    store.flush_status();
    match out {
        Some(path) => {
            std::fs::write(path, json)?;
            eprintln!("wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn import(file: &Path, config: &Config) -> CmdResult {
    let text = std::fs::read_to_string(file)?;
    let mut store = open_store(config)?;
    let event = store.import_str(&text)?;
    store.flush_status();
    print_json(&event)
}
