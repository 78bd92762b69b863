//! `knowledge` – kitchen knowledge command line interface.
//!
//! 1. Loads `~/.knowledge/config.toml`, writing the defaults on first run.
//! 2. Builds the fixed-object service over the kitchen model and the poke
//!    service over the configured frame graph.
//! 3. Starts the checkpoint publisher and the WebSocket checkpoint feed in
//!    the background.
//! 4. Drops the user into an interactive shell (`/objects`, `/poke`,
//!    `/checkpoints`, `/frames`, `/help`).
//! 5. Intercepts Ctrl-C and stops the background tasks.

mod config;
mod repl;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use colored::Colorize;
use knowledge_middleware::{CheckpointFeed, EventBus};
use knowledge_perception::FrameTransformStage;
use knowledge_reasoning::{FactTable, FixedObjectQueryService};
use knowledge_runtime::{CheckpointBoard, CheckpointPublisher, PokePositionService};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::repl::Session;

fn main() {
    let _telemetry = knowledge_runtime::init_tracing("knowledge");

    print_banner();

    let cfg = load_config();

    // ── Shutdown plumbing ─────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let (stop_tx, stop_rx) = watch::channel(false);
    let stop_tx = Arc::new(stop_tx);

    {
        let shutdown = Arc::clone(&shutdown);
        let stop_tx = Arc::clone(&stop_tx);
        if let Err(e) = ctrlc::set_handler(move || {
            println!();
            println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
            let _ = stop_tx.send(true);
            shutdown.store(true, Ordering::SeqCst);
            println!("{}", "  Press Enter to leave the shell.".dimmed());
        }) {
            warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    }

    // ── Services ──────────────────────────────────────────────────────────
    let bus = Arc::new(EventBus::default());
    let board = CheckpointBoard::new();

    let tf = cfg.tf_engine();
    let frames = tf.frames();
    let stage = FrameTransformStage::new(Box::new(tf), cfg.target_frame.clone());
    let poke = PokePositionService::new(stage, board.clone()).with_diagnostics(Arc::clone(&bus));
    let objects = FixedObjectQueryService::with_frame_id(Box::new(kitchen_model(&cfg)), cfg.map_frame.clone());

    // ── Background tasks ──────────────────────────────────────────────────
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}: {}", "Failed to start async runtime".red(), e);
            std::process::exit(1);
        }
    };

    match CheckpointPublisher::new(board, Arc::clone(&bus), cfg.publish_rate_hz) {
        Ok(publisher) => {
            runtime.spawn(publisher.run(stop_rx));
            println!(
                "  Publishing checkpoints at {} Hz",
                cfg.publish_rate_hz.to_string().bold()
            );
        }
        Err(e) => println!("{}: {}", "Checkpoint publisher disabled".red(), e),
    }

    let feed_addr = SocketAddr::from(([0, 0, 0, 0], cfg.feed_port));
    let feed = CheckpointFeed::new(Arc::clone(&bus));
    runtime.spawn(async move {
        if let Err(e) = feed.run(feed_addr).await {
            error!(error = %e, "checkpoint feed stopped");
        }
    });
    println!(
        "  Checkpoint feed on {}",
        format!("ws://localhost:{}", cfg.feed_port).bold()
    );

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive shell ─────────────────────────────────────────────────
    let session = Session {
        objects,
        poke,
        frames,
    };
    repl::run(&session, shutdown);

    let _ = stop_tx.send(true);
    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("knowledge shell exited");
}

/// Config from disk, or the defaults (written to disk) on first run.
fn load_config() -> Config {
    match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            let mut cfg = Config::default();
            match config::save(&cfg) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Error saving config".red(), e),
            }
            config::apply_env_overrides(&mut cfg);
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            let mut cfg = Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }
    }
}

/// The fixture engine for `getFixedKitchenObjects`.  Without a configured
/// model every query comes back empty.
fn kitchen_model(cfg: &Config) -> FactTable {
    let Some(path) = &cfg.kitchen_model_path else {
        println!(
            "  {}",
            "No kitchen model configured (set kitchen_model_path).".dimmed()
        );
        return FactTable::kitchen_model(Vec::new());
    };

    match FactTable::kitchen_model_from_path(path) {
        Ok(table) => {
            println!(
                "  Kitchen model: {} object(s) from {}",
                table.len().to_string().bold(),
                path.display()
            );
            table
        }
        Err(e) => {
            println!("{}: {}", "Kitchen model unavailable".red(), e);
            FactTable::kitchen_model(Vec::new())
        }
    }
}

fn print_banner() {
    println!();
    println!("{}", r#"   __ __                   __       __        "#.bold().purple());
    println!("{}", r#"  / //_/__  ___ _    __   / /__ ___/ /__ ____ "#.bold().purple());
    println!("{}", r#" / ,< / _ \/ _ \ |/|/ /  / / -_) _  / _ `/ -_)"#.bold().purple());
    println!("{}", r#"/_/|_/_//_/\___/__,__/  /_/\__/\_,_/\_, /\__/ "#.bold().purple());
    println!("{}", r#"                                   /___/      "#.bold().purple());
    println!();
    println!(
        "  {} {}",
        "knowledge".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Kitchen objects and poke positions");
    println!();
}
