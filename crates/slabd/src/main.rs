//! slabd - LRU cache daemon speaking the Redis RESP protocol

mod config;
mod handler;
mod resp;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use slablru::LruCache;
use tokio::net::{TcpListener, TcpStream};
use tracing::info;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (defaults to slabd.json next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind; the port comes from the config file
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Health check mode (for Docker)
    #[arg(long)]
    health: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load_or_create(&config_path)?;
    let bind = format!("{}:{}", args.host, config.listen_port);

    if args.health {
        match TcpStream::connect(&bind).await {
            Ok(_) => {
                println!("OK");
                std::process::exit(0);
            }
            Err(_) => {
                eprintln!("FAILED");
                std::process::exit(1);
            }
        }
    }

    info!("Starting slabd v{}", env!("CARGO_PKG_VERSION"));
    info!("Cache capacity: {}", config.capacity);

    let cache = LruCache::new(config.capacity)
        .with_context(|| format!("Invalid cache capacity in {}", config_path.display()))?;
    let cache = Arc::new(cache);

    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("Server listening on {}", bind);

    println!("\nslabd ready");
    println!("   Connection String: redis://{}", bind);
    println!("   redis-cli Command: redis-cli -h {} -p {}", args.host, config.listen_port);
    println!("   Cache Capacity:    {} entries", cache.capacity());
    println!("   Commands:          PING ECHO SET GET EXISTS DBSIZE INFO");
    println!("\nPress Ctrl+C to stop\n");

    server::serve(listener, cache).await
}
