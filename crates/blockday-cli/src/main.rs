use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "blockday", version, about = "Blockday daily block schedule")]
struct Cli {
    /// Override "now": HH:MM (today) or YYYY-MM-DDTHH:MM
    #[arg(long, global = true)]
    at: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's schedule and block transitions
    Day {
        #[command(subcommand)]
        action: commands::day::DayAction,
    },
    /// Yesterday's unfinished work
    CarryOver {
        #[command(subcommand)]
        action: commands::carry_over::CarryOverAction,
    },
    /// XP, level and streak
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Block template catalog
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("BLOCKDAY_LOG")
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let at = cli.at.as_deref();
    let result = match cli.command {
        Commands::Day { action } => commands::day::run(action, at),
        Commands::CarryOver { action } => commands::carry_over::run(action, at),
        Commands::Progress { action } => commands::progress::run(action, at),
        Commands::Template { action } => commands::template::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
