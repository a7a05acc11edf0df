use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use topnews::config::{Config, ConfigError, Settings, API_KEY_ENV};
use topnews::menu::{Console, Session};
use topnews::news::NewsClient;
use topnews::storage::{Database, DatabaseError};

/// Get the config directory path (~/.config/topnews/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("topnews"))
}

#[derive(Parser, Debug)]
#[command(name = "topnews", about = "Search top headlines and keep the ones you like")]
struct Args {
    /// Config file (default: ~/.config/topnews/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database file, overriding the config file
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Reset database (delete and recreate)
    #[arg(long)]
    reset_db: bool,

    /// Plain output without colors
    #[arg(long)]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the menus.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
            tracing::warn!(
                path = %config_dir.display(),
                error = %e,
                "Failed to set config directory permissions to 0700"
            );
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(database) = args.database {
        config.database_path = Some(database);
    }

    let settings = match Settings::resolve(config, std::env::var(API_KEY_ENV).ok(), &config_dir) {
        Ok(settings) => settings,
        Err(ConfigError::MissingApiKey) => {
            eprintln!("Error: no news API key found.");
            eprintln!();
            eprintln!("Set it in the environment:");
            eprintln!("  export {API_KEY_ENV}=your-key");
            eprintln!();
            eprintln!("or add `api_key = \"...\"` to {}", config_path.display());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    if args.reset_db && settings.database_path.exists() {
        std::fs::remove_file(&settings.database_path).context("Failed to delete database")?;
        println!("Database reset.");
    }

    let db_path_str = settings
        .database_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of topnews appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    let news = NewsClient::new(&settings).context("Failed to set up news client")?;

    let color = settings.color && !args.no_color && std::env::var_os("NO_COLOR").is_none();
    let console = Console::stdio(color);

    let mut session = Session::new(console, db.clone(), news);
    let result = session.run().await;
    db.close().await;
    result?;
    Ok(())
}
