use clap::{Parser, Subcommand};

mod commands;
mod util;

#[derive(Parser)]
#[command(name = "crack", version, about = "CRACK PROTOCOL terminal: talk NEO out of its seed phrase")]
struct Cli {
    /// API base URL (defaults to the saved profile's, else http://localhost:8000)
    #[arg(long, global = true, env = "CRACK_API_URL")]
    api_url: Option<String>,

    /// Player name (defaults to the profile saved by `crack register`)
    #[arg(long, global = true, env = "CRACK_USERNAME")]
    username: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API health
    Health,
    /// Register a player and save it as the default profile
    Register {
        /// Player name (1-32 chars of A-Z a-z 0-9 _ . -)
        username: String,
    },
    /// Talk to NEO (interactive when no message is given)
    Chat {
        /// Message to send
        message: Option<String>,
    },
    /// Full chat history, oldest first
    History,
    /// Sessions, newest first
    Sessions,
    /// Top players by attempts
    Leaderboard {
        /// Number of entries (1-100)
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Global statistics
    Stats,
    /// Community prediction tally
    Predictions,
    /// Predict whether NEO holds or gets cracked
    Vote {
        /// "hold" or "crack"
        choice: String,
    },
}

/// Optional player for read-only commands: explicit flag, else saved profile.
fn optional_username(explicit: Option<String>) -> Option<String> {
    explicit
        .filter(|u| !u.trim().is_empty())
        .or_else(|| util::load_profile().map(|p| p.username))
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let api_url = util::resolve_api_url(cli.api_url, util::load_profile().as_ref());
    let api_url = api_url.as_str();

    let code = match cli.command {
        Commands::Health => commands::health::run(api_url).await,
        Commands::Register { username } => commands::register::run(api_url, &username).await,
        Commands::Chat { message } => {
            let username = util::resolve_username(cli.username);
            commands::chat::run(api_url, &username, message).await
        }
        Commands::History => {
            let username = util::resolve_username(cli.username);
            commands::history::history(api_url, &username).await
        }
        Commands::Sessions => {
            let username = util::resolve_username(cli.username);
            commands::history::sessions(api_url, &username).await
        }
        Commands::Leaderboard { limit } => commands::leaderboard::leaderboard(api_url, limit).await,
        Commands::Stats => {
            let username = optional_username(cli.username);
            commands::leaderboard::stats(api_url, username.as_deref()).await
        }
        Commands::Predictions => {
            let username = optional_username(cli.username);
            commands::predictions::list(api_url, username.as_deref()).await
        }
        Commands::Vote { choice } => {
            let username = util::resolve_username(cli.username);
            commands::predictions::vote(api_url, &username, &choice).await
        }
    };

    std::process::exit(code);
}
