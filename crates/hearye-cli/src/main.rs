//! Hear Ye CLI - sign in, browse topics and vote from the terminal.

mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hearye_config_and_utils::{init_logging, parse_level, Config, Paths};
use tracing::debug;

/// Hear Ye CLI - follow legislation and make your voice heard.
#[derive(Parser)]
#[command(name = "hearye")]
#[command(about = "Hear Ye command-line client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true, env = "HEARYE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with tokens issued by the identity provider
    Login {
        /// Identity provider access token
        #[arg(long, env = "VELNOTA_ACCESS_TOKEN")]
        access_token: String,
        /// Identity provider refresh token
        #[arg(long, env = "VELNOTA_REFRESH_TOKEN")]
        refresh_token: String,
    },

    /// Re-establish the session as the app does on startup
    Launch,

    /// Show stored credentials
    Status {
        /// Also verify the session against the backend
        #[arg(long)]
        check: bool,
    },

    /// Refresh the session
    Refresh,

    /// Logout and clear all stored credentials
    Logout,

    /// Logout and permanently delete the account
    DeleteAccount {
        /// Type "delete" to confirm
        #[arg(long)]
        confirm: String,
    },

    /// Inspect stored tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },

    /// Send a request to the backend
    Request {
        /// HTTP method
        method: String,
        /// Path relative to the API base, or an absolute URL
        path: String,
        /// Request body (JSON is sent as JSON, anything else verbatim)
        #[arg(long)]
        body: Option<String>,
        /// Do not attach the stored access token
        #[arg(long)]
        anonymous: bool,
    },

    /// List topics
    Topics {
        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Vote on a topic
    Vote {
        /// Topic ID
        topic: i64,
        /// Vote value
        vote: i64,
    },

    /// Show one topic with its summary
    Topic {
        /// Topic ID
        id: i64,
    },

    /// Show your profile
    Profile,

    /// Show your voting history
    Contributions {
        /// Days of history to summarize
        #[arg(long, default_value = "30")]
        days: u64,
        /// List the topics voted on this day instead (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Set your congressional district (e.g. KS-03, WY-AL)
    RegisterDistrict {
        /// District code
        code: String,
    },
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Print a stored token (access, refresh, velnota_access, velnota_refresh)
    Get {
        kind: String,
    },
}

async fn run(cli: Cli, config: Config, paths: Paths) -> anyhow::Result<()> {
    let format = cli.format;
    let ctx = commands::Context::new(config, paths, format)?;

    match cli.command {
        Commands::Login {
            access_token,
            refresh_token,
        } => commands::login(&ctx, &access_token, &refresh_token)
            .await
            .map(drop),
        Commands::Launch => commands::launch(&ctx).await,
        Commands::Status { check } => commands::status(&ctx, check).await,
        Commands::Refresh => commands::refresh(&ctx).await,
        Commands::Logout => commands::logout(&ctx).await,
        Commands::DeleteAccount { confirm } => commands::delete_account(&ctx, &confirm).await,
        Commands::Token { command } => match command {
            TokenCommands::Get { kind } => commands::token_get(&ctx, &kind).await,
        },
        Commands::Request {
            method,
            path,
            body,
            anonymous,
        } => commands::request(&ctx, &method, &path, body.as_deref(), anonymous).await,
        Commands::Topics { pages } => commands::topics(&ctx, pages).await,
        Commands::Topic { id } => commands::topic(&ctx, id).await,
        Commands::Profile => commands::profile(&ctx).await,
        Commands::Contributions { days, date } => commands::contributions(&ctx, days, date).await,
        Commands::Vote { topic, vote } => commands::vote(&ctx, topic, vote).await,
        Commands::RegisterDistrict { code } => commands::register_district(&ctx, &code).await,
    }
}

async fn start(cli: Cli) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let config = Config::load(&paths)?;

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    let level = parse_level(&level).to_string().to_ascii_lowercase();
    init_logging(&level, Some(paths.log_file()));
    debug!(environment = ?config.environment, "Configuration loaded");

    run(cli, config, paths).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    if let Err(e) = start(cli).await {
        output::print_error(&format!("{:#}", e), &format);
        std::process::exit(1);
    }
}
