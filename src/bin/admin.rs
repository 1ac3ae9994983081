//! CLI administration tool for postboard.
//!
//! Manages groups and accounts, clears the page cache and inspects the
//! database without going through the web interface.
//!
//! # Usage
//!
//! ```bash
//! # Create a group
//! cargo run --bin admin -- group create --title "Cats" --slug cats
//!
//! # List groups
//! cargo run --bin admin -- group list
//!
//! # Create an account (prompts for the password)
//! cargo run --bin admin -- user create leo
//!
//! # Drop every cached page
//! cargo run --bin admin -- cache clear
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) is required here, and
//! `SESSION_SECRET` must match the server's so created passwords verify.

use postboard::config::{self, CacheBackend, Config};
use postboard::infrastructure::cache::{CacheService, NullCache, RedisCache};
use postboard::infrastructure::media::FsMediaStore;
use postboard::infrastructure::persistence::Repositories;
use postboard::prelude::{PageCacheService, User};
use postboard::state::{AppSettings, AppState};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing postboard.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage groups
    Group {
        #[command(subcommand)]
        action: GroupAction,
    },

    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Page cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Create a new group
    Create {
        /// Display title (e.g., "Cats")
        #[arg(short, long)]
        title: Option<String>,

        /// URL slug (e.g., "cats")
        #[arg(short, long)]
        slug: Option<String>,

        /// Short description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List all groups
    List,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account
    Create {
        /// Username
        username: String,

        /// Generate a random password instead of prompting
        #[arg(short, long)]
        generate: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all accounts
    List,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop every cached page
    Clear,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = config::load_from_env()?;

    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL (or DB_USER/DB_NAME) must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Group { action } => handle_group_action(action, &config, &pool).await?,
        Commands::User { action } => handle_user_action(action, &config, &pool).await?,
        Commands::Cache { action } => handle_cache_action(action, &config).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Wires the services over PostgreSQL. The page cache is not needed here.
async fn build_state(config: &Config, pool: &PgPool) -> Result<AppState> {
    let media = FsMediaStore::open(&config.media_root)
        .await
        .context("Failed to open media root")?;

    Ok(AppState::new(
        Repositories::postgres(Arc::new(pool.clone())),
        Arc::new(NullCache::new()),
        Arc::new(media),
        AppSettings {
            session_secret: config.session_secret.clone(),
            session_ttl_hours: config.session_ttl_hours,
            cache_ttl_seconds: config.cache_ttl_seconds,
            cookie_secure: config.cookie_secure,
        },
    ))
}

async fn handle_group_action(action: GroupAction, config: &Config, pool: &PgPool) -> Result<()> {
    let state = build_state(config, pool).await?;

    match action {
        GroupAction::Create {
            title,
            slug,
            description,
        } => {
            println!("{}", "📁 Create Group".bright_blue().bold());
            println!();

            let title = match title {
                Some(t) => t,
                None => Input::new().with_prompt("Title").interact_text()?,
            };
            let slug = match slug {
                Some(s) => s,
                None => Input::new()
                    .with_prompt("Slug")
                    .with_initial_text(title.to_lowercase().replace(' ', "-"))
                    .interact_text()?,
            };
            let description = match description {
                Some(d) => d,
                None => Input::new()
                    .with_prompt("Description")
                    .allow_empty(true)
                    .interact_text()?,
            };

            let group = state
                .group_service
                .create_group(&title, &slug, &description)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create group: {}", e))?;

            println!();
            println!("{}", "✅ Group created successfully!".green().bold());
            println!("  Page: {}", format!("/group/{}", group.slug).bright_cyan());
            println!();
        }
        GroupAction::List => {
            println!("{}", "📋 Groups".bright_blue().bold());
            println!();

            let groups = state
                .group_service
                .list_groups()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list groups: {}", e))?;

            if groups.is_empty() {
                println!("{}", "  No groups found".yellow());
                println!();
                println!(
                    "  Create one with: {} admin group create",
                    "cargo run --bin".bright_cyan()
                );
                return Ok(());
            }

            println!(
                "  {:<4} {:<24} {:<30}",
                "ID".bright_white().bold(),
                "Slug".bright_white().bold(),
                "Title".bright_white().bold()
            );
            println!("  {}", "─".repeat(60).bright_black());

            for group in &groups {
                println!(
                    "  {:<4} {:<24} {}",
                    group.id.to_string().bright_black(),
                    group.slug.cyan(),
                    group.title
                );
            }

            println!();
            println!("  Total: {}", groups.len().to_string().bright_white().bold());
            println!();
        }
    }

    Ok(())
}

async fn handle_user_action(action: UserAction, config: &Config, pool: &PgPool) -> Result<()> {
    let state = build_state(config, pool).await?;

    match action {
        UserAction::Create {
            username,
            generate,
            yes,
        } => {
            println!("{}", "👤 Create Account".bright_blue().bold());
            println!();

            let password = if generate {
                let generated = generate_password();
                println!("  Password: {}", generated.bright_yellow().bold());
                println!(
                    "{}",
                    "⚠️  Save this password now. It is stored only as a hash."
                        .red()
                        .bold()
                );
                generated
            } else {
                Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Repeat password", "Passwords do not match")
                    .interact()?
            };

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Create account '{}'?", username))
                    .default(true)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let user = state
                .auth_service
                .sign_up(&username, &password)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

            println!();
            println!("{}", "✅ Account created successfully!".green().bold());
            println!("  Profile: {}", format!("/profile/{}", user.username).bright_cyan());
            println!();
        }
        UserAction::List => {
            println!("{}", "📋 Accounts".bright_blue().bold());
            println!();

            let users: Vec<User> = state
                .auth_service
                .list_users()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list accounts: {}", e))?;

            if users.is_empty() {
                println!("{}", "  No accounts found".yellow());
                return Ok(());
            }

            println!(
                "  {:<4} {:<30} {:<20}",
                "ID".bright_white().bold(),
                "Username".bright_white().bold(),
                "Joined".bright_white().bold()
            );
            println!("  {}", "─".repeat(60).bright_black());

            for user in &users {
                println!(
                    "  {:<4} {:<30} {}",
                    user.id.to_string().bright_black(),
                    user.username.cyan(),
                    user.created_at
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                        .bright_black()
                );
            }

            println!();
            println!("  Total: {}", users.len().to_string().bright_white().bold());
            println!();
        }
    }

    Ok(())
}

/// Clears the shared page cache.
///
/// Only the Redis backend is shared with the server. The memory backend
/// lives inside the server process; its entries expire after the TTL.
async fn handle_cache_action(action: CacheAction, config: &Config) -> Result<()> {
    match action {
        CacheAction::Clear => {
            println!("{}", "🧹 Clearing page cache...".bright_blue());

            if config.cache_backend != CacheBackend::Redis {
                println!(
                    "{}",
                    format!(
                        "⚠️  Cache backend is '{}'; nothing shared to clear. Entries expire after {}s.",
                        config.cache_backend, config.cache_ttl_seconds
                    )
                    .yellow()
                );
                return Ok(());
            }

            let redis_url = config
                .redis_url
                .as_deref()
                .context("REDIS_URL (or REDIS_HOST) must be set for the redis backend")?;
            let redis = RedisCache::connect(redis_url, config.cache_ttl_seconds)
                .await
                .context("Failed to connect to Redis")?;
            let cache: Arc<dyn CacheService> = Arc::new(redis);

            PageCacheService::new(cache, config.cache_ttl_seconds)
                .invalidate_all()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to clear cache: {}", e))?;

            println!("{}", "✅ Page cache cleared".green().bold());
        }
    }

    Ok(())
}

/// Displays row counts for the main tables.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    for (label, table) in [
        ("Users", "users"),
        ("Groups", "groups"),
        ("Posts", "posts"),
        ("Comments", "comments"),
        ("Follows", "follows"),
    ] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
        println!(
            "  {:<10} {}",
            format!("{}:", label),
            count.to_string().bright_green().bold()
        );
    }

    let sessions: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE expires_at > NOW()")
            .fetch_one(pool)
            .await?;
    println!(
        "  {:<10} {}",
        "Sessions:",
        sessions.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Generates a random 20-character alphanumeric password.
fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
    const PASSWORD_LEN: usize = 20;

    let mut rng = rand::rng();

    (0..PASSWORD_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
