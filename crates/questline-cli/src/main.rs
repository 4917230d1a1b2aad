use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "questline-cli", version, about = "Questline CLI")]
struct Cli {
    /// User identity all operations run as
    #[arg(long, global = true, default_value = "default", env = "QUESTLINE_USER")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture and triage management
    Capture {
        #[command(subcommand)]
        action: commands::capture::CaptureAction,
    },
    /// Focus session control
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Progress analytics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Capture { action } => commands::capture::run(&cli.user, action),
        Commands::Session { action } => commands::session::run(&cli.user, action),
        Commands::Project { action } => commands::project::run(&cli.user, action),
        Commands::Stats { action } => commands::stats::run(&cli.user, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
