mod commands;
mod config;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use bookstore_http::SecretString;
use bookstore_session::{RegisterForm, Storefront};
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, CliOverrides};

/// Bookstore storefront client - session and request pipeline
#[derive(Parser)]
#[command(name = "bookstore-client")]
#[command(about = "Bookstore storefront client - session and request pipeline")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Storage file (overrides config)
    #[arg(long, conflicts_with = "memory")]
    storage: Option<PathBuf>,

    /// Keep session state in memory for this run only
    #[arg(long)]
    memory: bool,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user and locale (default)
    Whoami,
    /// Show the locale, or switch to LANG
    Locale { lang: Option<String> },
    /// Run the route guard for PATH
    Guard {
        path: String,
        /// Use the guest-only guard (login/register pages)
        #[arg(long)]
        guest: bool,
    },
    /// Print the session-correlation id, creating one if needed
    SessionId,
    /// GET an endpoint through the pipeline and print its data
    Get {
        /// Endpoint path relative to the base URL, e.g. `Books`
        path: String,
        /// Query parameter, repeatable
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = commands::parse_query_pair)]
        query: Vec<(String, String)>,
    },
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (BOOKSTORE__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        base_url: cli.base_url.clone(),
        storage: cli.storage.clone(),
        memory_storage: cli.memory,
        verbose: cli.verbose,
    });

    logging::init(&config.logging)?;
    tracing::debug!(base_url = %config.api.base_url, "bookstore-client starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    let command = cli.command.unwrap_or(Commands::Whoami);
    if matches!(command, Commands::Check) {
        println!("Configuration is valid");
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let storage = config.storage.open()?;
    let app = Storefront::new(
        storage,
        config.api.http_builder()?,
        &config.api.base_url,
        &config.locale.default,
    )?;

    match command {
        Commands::Login { email, password } => commands::login(&app, email, password).await,
        Commands::Register {
            user_name,
            email,
            password,
            confirm_password,
        } => {
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            let form = RegisterForm {
                user_name,
                email,
                password: SecretString::new(password),
                confirm_password: SecretString::new(confirm),
            };
            commands::register(&app, &form).await
        }
        Commands::Logout => {
            commands::logout(&app);
            Ok(())
        }
        Commands::Whoami | Commands::Check => {
            commands::whoami(&app);
            Ok(())
        }
        Commands::Locale { lang } => commands::locale(&app, lang.as_deref()),
        Commands::Guard { path, guest } => {
            commands::guard(&app, &path, guest);
            Ok(())
        }
        Commands::SessionId => commands::session_id(&app),
        Commands::Get { path, query } => commands::get(&app, &path, &query).await,
    }
}
