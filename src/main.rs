//! zVault indexer binary.
//!
//! Owns the commitment-tree accumulator and exposes it over a small REST
//! surface; submission of claim/spend transactions is the relayer/wallet's
//! job, not this process's.
//!
//! Run modes:
//!   cargo run                     - Show usage
//!   cargo run -- serve [--port N] - Start the REST API (default port 8080)
//!   cargo run -- sync             - Run one sync pass against the
//!                                    configured chain and print the result

use std::env;
use std::sync::Arc;

use zvault_core::api::{build_router, AppState};
use zvault_core::chain::SolanaChainReader;
use zvault_core::config::ZVaultConfig;
use zvault_core::indexer::{ChainReader, IndexerService};
use zvault_core::logging;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "serve" => run_serve(&args[2..]).await,
        "sync" => run_sync().await,
        "help" | "--help" | "-h" => print_usage(),
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("zVault indexer");
    println!();
    println!("Usage:");
    println!("  zvault-indexer serve [--port <port>]   Start the REST API (healthz/status/scan/proof)");
    println!("  zvault-indexer sync                    Run one sync pass and print the result");
    println!();
    println!("Environment variables: see zvault_core::config::ZVaultConfig::from_env");
}

async fn run_serve(args: &[String]) {
    let config = match ZVaultConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return;
        }
    };

    if let Err(e) = logging::init_from_config(&config) {
        eprintln!("failed to initialize logging: {e}");
        return;
    }

    let mut port: u16 = 8080;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            port = args[i + 1].parse().unwrap_or(8080);
            i += 2;
        } else {
            i += 1;
        }
    }

    let indexer = Arc::new(IndexerService::new());
    let chain_reader: Option<Arc<dyn ChainReader>> = SolanaChainReader::new(&config)
        .ok()
        .map(|r| Arc::new(r) as Arc<dyn ChainReader>);

    let state = AppState::new(indexer, chain_reader);
    let app = build_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "zVault indexer listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("failed to bind {addr}: {e}");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {e}");
    }
}

async fn run_sync() {
    let config = match ZVaultConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return;
        }
    };

    let reader = match SolanaChainReader::new(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("failed to build chain reader: {e}");
            return;
        }
    };

    let indexer = IndexerService::new();
    match indexer.resync(&reader).await {
        Ok(status) => {
            println!("synced: {}", status.synced);
            println!("next_index: {}", status.next_index);
            println!("on_chain_root: {}", hex::encode(status.on_chain_root.to_be_bytes()));
        }
        Err(e) => eprintln!("sync failed: {e}"),
    }
}
