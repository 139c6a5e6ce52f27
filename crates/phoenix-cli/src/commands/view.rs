use clap::Subcommand;
use phoenix_core::state::ActiveTab;
use phoenix_core::Config;

use super::{open_store, save, CmdResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// Switch between dark and light
    Toggle,
}

pub fn theme(action: ThemeAction, config: &Config) -> CmdResult {
    let mut store = open_store(config)?;
    let theme = match action {
        ThemeAction::Show => store.state().theme,
        ThemeAction::Toggle => {
            let theme = store.toggle_theme();
            save(&mut store)?;
            theme
        }
    };
    println!("{}", serde_json::to_value(theme)?.as_str().unwrap_or_default());
    Ok(())
}

pub fn tab(name: &str, config: &Config) -> CmdResult {
    let tab = ActiveTab::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = ActiveTab::ALL.iter().map(|t| t.as_str()).collect();
        format!("unknown tab '{name}', expected one of: {}", names.join(", "))
    })?;
    let mut store = open_store(config)?;
    store.set_active_tab(tab);
    save(&mut store)?;
    println!("{}", tab.as_str());
    Ok(())
}
