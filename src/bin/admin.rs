//! CLI administration tool for shorten-api.
//!
//! Inspects codes and configuration without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Code for the pair [origin length, record id]
//! cargo run --bin admin -- encode 23 1
//!
//! # Pair behind a code
//! cargo run --bin admin -- decode 86Rf07
//!
//! # Validate and print the environment configuration
//! cargo run --bin admin -- config
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! Reads the same environment variables (and `.env`) as the server, so codes
//! match what the running service issues.

use shorten_api::config::{self, Config, mask_connection_string};
use shorten_api::domain::repositories::UrlRepository;
use shorten_api::infrastructure::persistence::PgUrlRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shorten-api.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Print the code for an [origin length, record id] pair
    Encode {
        /// Length of the origin URL in characters
        length: u64,

        /// Record id
        id: u64,
    },

    /// Print the [origin length, record id] pair behind a code
    Decode {
        /// Short code or full short URL
        code: String,
    },

    /// Validate the environment configuration and print a summary
    Config,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode { length, id } => encode(&config::load_from_env()?, length, id)?,
        Commands::Decode { code } => decode(&config::load_from_env()?, &code)?,
        Commands::Config => show_config()?,
        Commands::Db { action } => handle_db_action(action).await?,
    }

    Ok(())
}

fn encode(config: &Config, length: u64, id: u64) -> Result<()> {
    let codec = config.build_codec()?;
    let code = codec
        .encode(&[length, id])
        .context("Failed to encode pair")?;

    println!("{}", code.bright_yellow().bold());
    Ok(())
}

fn decode(config: &Config, input: &str) -> Result<()> {
    let codec = config.build_codec()?;
    let code = shorten_api::utils::url_validator::short_code(input);

    match codec.decode(code).as_deref() {
        Some(&[length, id]) => {
            println!("{}", "Decoded".green().bold());
            println!("  Origin length: {}", length.to_string().cyan());
            println!("  Record id:     {}", id.to_string().cyan());
        }
        Some(numbers) => {
            println!(
                "{} {:?}",
                "Decodes to an unexpected sequence:".yellow(),
                numbers
            );
        }
        None => {
            println!(
                "{}",
                format!("'{code}' is not a valid code for this alphabet").red()
            );
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_config() -> Result<()> {
    let config = Config::from_env()?;

    println!("{}", "Configuration".bright_blue().bold());
    println!();
    println!("  Listen:        {}", config.listen_addr.bright_white());
    println!("  Domain:        {}", config.domain_name.bright_white());
    println!(
        "  Base URL:      {}",
        config.base_url.as_deref().unwrap_or("(from request)").bright_white()
    );
    println!(
        "  Alphabet:      {} characters, min length {}",
        config.secret_alphabet.len(),
        config.code_min_length
    );
    println!(
        "  Database:      {}",
        config
            .database_url
            .as_deref()
            .map(mask_connection_string)
            .unwrap_or_else(|| "in-memory".to_string())
            .bright_white()
    );
    if config.abuse_enabled {
        println!(
            "  Throttle:      {} / {}s",
            config.throttle_limit, config.throttle_period_secs
        );
        println!(
            "  Ban:           after {} rejections / {}s, for {}s",
            config.ban_max_retry, config.ban_find_time_secs, config.ban_time_secs
        );
    } else {
        println!("  Abuse protection: {}", "disabled".yellow());
    }
    println!();

    match config.validate() {
        Ok(()) => println!("{}", "Configuration is valid".green().bold()),
        Err(e) => {
            println!("{} {:#}", "Configuration is invalid:".red().bold(), e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Dispatches database commands.
async fn handle_db_action(action: DbAction) -> Result<()> {
    let config = config::load_from_env()?;
    let database_url = config
        .database_url
        .context("DATABASE_URL or DB_* must be set")?;

    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            let pool = PgPool::connect(&database_url)
                .await
                .context("Failed to connect to database")?;
            let repo = PgUrlRepository::new(Arc::new(pool));
            repo.ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "Database connection OK".green().bold());
        }
    }

    Ok(())
}
