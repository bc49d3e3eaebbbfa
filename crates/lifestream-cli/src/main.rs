use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lifestream", version, about = "LifeStream calendar CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Notification center
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Reminder settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Natural-language event capture
    Assistant {
        #[command(subcommand)]
        action: commands::assistant::AssistantAction,
    },
    /// Run the reminder loop in the foreground
    Watch {
        /// Tick interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Assistant { action } => commands::assistant::run(action),
        Commands::Watch { interval } => commands::watch::run(interval),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
