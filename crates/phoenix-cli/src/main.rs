use clap::{Parser, Subcommand};
use phoenix_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "phoenix", version, about = "PHOENIX daily tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Overview of today, the program window and the counters
    Status,
    /// Program window progress
    Window,
    /// Evaluate program-wide warnings
    Warnings,
    /// The active day record
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Most important tasks (at most three)
    Mit {
        #[command(subcommand)]
        action: commands::mit::MitAction,
    },
    /// Bookings for the short income statement
    Finance {
        #[command(subcommand)]
        action: commands::finance::FinanceAction,
    },
    /// Prototype audits and their gate checklist
    Audit {
        #[command(subcommand)]
        action: commands::audit::AuditAction,
    },
    /// Evidence items linked to audits
    Evidence {
        #[command(subcommand)]
        action: commands::evidence::EvidenceAction,
    },
    /// Exploration contacts
    Outreach {
        #[command(subcommand)]
        action: commands::outreach::OutreachAction,
    },
    /// Focus sprint timer
    Sprint {
        #[command(subcommand)]
        action: commands::sprint::SprintAction,
    },
    /// Logbook entries in a range
    Logs {
        /// 30, 60 or all
        #[arg(long, default_value = "30")]
        range: phoenix_core::derive::LogRange,
    },
    /// Draft a document from the recorded data
    Generate {
        #[command(subcommand)]
        kind: commands::generate::GenerateKind,
    },
    /// Write a JSON backup
    Export {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<std::path::PathBuf>,
    },
    /// Replace the state with a JSON backup
    Import {
        file: std::path::PathBuf,
    },
    /// Colour theme
    Theme {
        #[command(subcommand)]
        action: commands::view::ThemeAction,
    },
    /// Remember the active tab
    Tab {
        /// home, fokus, prototypen, evidence, outreach, manifest or generator
        name: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_env("PHOENIX_LOG")
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_tracing(&config);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "falling back to default configuration");
    }

    let result = match cli.command {
        Commands::Status => commands::overview::status(&config),
        Commands::Window => commands::overview::window(&config),
        Commands::Warnings => commands::overview::warnings(&config),
        Commands::Day { action } => commands::day::run(action, &config),
        Commands::Mit { action } => commands::mit::run(action, &config),
        Commands::Finance { action } => commands::finance::run(action, &config),
        Commands::Audit { action } => commands::audit::run(action, &config),
        Commands::Evidence { action } => commands::evidence::run(action, &config),
        Commands::Outreach { action } => commands::outreach::run(action, &config),
        Commands::Sprint { action } => commands::sprint::run(action, &config),
        Commands::Logs { range } => commands::overview::logs(range, &config),
        Commands::Generate { kind } => commands::generate::run(kind, &config),
        Commands::Export { out } => commands::backup::export(out.as_deref(), &config),
        Commands::Import { file } => commands::backup::import(&file, &config),
        Commands::Theme { action } => commands::view::theme(action, &config),
        Commands::Tab { name } => commands::view::tab(&name, &config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
