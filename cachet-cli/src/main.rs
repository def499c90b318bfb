//! Cachet command-line client
//!
//! Runs single operations against the offline-first cache:
//!
//!   cachet --db cache.db --remote https://kv.example.com put notes welcome hello
//!   cachet --db cache.db --offline put notes welcome "edited offline"
//!   cachet --db cache.db --token $TOKEN flush
//!
//! Writes made with `--offline` land in the local cache and the request
//! queue; `flush` replays the queue once the remote is reachable.

use anyhow::{bail, Context, Result};
use cachet_sync::{CacheEngine, ConnectivityFlag, EngineConfig, Request, Response, Store};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf, sync::Arc};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "cachet")]
#[command(about = "Offline-first key/value cache client")]
struct Args {
    /// SQLite database holding the cache and the request queue
    #[arg(long)]
    db: Option<PathBuf>,

    /// Remote base URL (overrides the config file)
    #[arg(short, long)]
    remote: Option<String>,

    /// JSON engine config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat the remote as unreachable
    #[arg(long)]
    offline: bool,

    /// Bearer token sent to the remote
    #[arg(short, long)]
    token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Read a value
    Get {
        collection: String,
        key: String,
        /// Skip ETag revalidation
        #[arg(long)]
        force: bool,
    },
    /// Write a value
    Put {
        collection: String,
        key: String,
        value: String,
    },
    /// Delete a value
    Delete { collection: String, key: String },
    /// Check whether a key is cached locally
    Contains { collection: String, key: String },
    /// Print the queued offline requests as JSON
    Pending,
    /// Replay the queued offline requests
    Flush,
    /// Drop every queued offline request without replaying it
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = load_config(&args)?;
    debug!("Engine config: {:?}", config);
    let connectivity = Arc::new(ConnectivityFlag::new(!args.offline));
    let engine = CacheEngine::new(config, connectivity).context("Failed to start cache engine")?;

    run(&engine, &args).await?;
    engine.dispatcher().flush().await;
    Ok(())
}

fn load_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            EngineConfig::from_json(&raw)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(db) = &args.db {
        config.database_path = Some(db.clone());
    }
    if let Some(remote) = &args.remote {
        config.remote.base_url = remote.clone();
    }
    Ok(config)
}

async fn run(engine: &CacheEngine, args: &Args) -> Result<()> {
    let token = args.token.clone();

    match &args.command {
        Command::Get {
            collection,
            key,
            force,
        } => {
            let request = Request::get(collection.as_str(), key.as_str())
                .with_token(token)
                .with_force(*force);
            let response = engine.store(collection)?.execute(request).await;
            println!("{}", expect_success(response)?.value().unwrap_or_default());
        }
        Command::Put {
            collection,
            key,
            value,
        } => {
            let request = Request::put(collection.as_str(), key.as_str(), value.as_str())
                .with_token(token);
            let response = engine.store(collection)?.execute(request).await;
            expect_success(response)?;
        }
        Command::Delete { collection, key } => {
            let request = Request::delete(collection.as_str(), key.as_str()).with_token(token);
            let response = engine.store(collection)?.execute(request).await;
            expect_success(response)?;
        }
        Command::Contains { collection, key } => {
            let response = engine
                .store(collection)?
                .contains(token.as_deref(), key)
                .await;
            if response.is_not_found() {
                println!("false");
            } else {
                expect_success(response)?;
                println!("true");
            }
        }
        Command::Pending => {
            let pending = engine.pending()?;
            println!("{}", serde_json::to_string_pretty(&pending)?);
        }
        Command::Flush => {
            let report = engine.execute_pending(token.as_deref()).await;
            println!(
                "replayed {}, failed {}, restored {}, dropped {}",
                report.replayed, report.failed, report.restored, report.dropped
            );
        }
        Command::Clear => {
            let dropped = engine.request_cache().len();
            engine.request_cache().clear()?;
            info!("Dropped {} queued request(s)", dropped);
        }
    }
    Ok(())
}

fn expect_success(response: Response) -> Result<Response> {
    if let Some(error) = &response.error {
        bail!("{}: {}", response.object, error);
    }
    if response.is_pending() {
        info!("{} accepted offline, queued for replay", response.object);
    }
    Ok(response)
}
