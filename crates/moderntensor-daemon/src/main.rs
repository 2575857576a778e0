// crates/moderntensor-daemon/src/main.rs
//
// Binary entrypoint for the ModernTensor registry daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, restores
// the registry from its snapshot (or builds it from genesis), replays the
// configured transaction log, prints summary statistics as JSON, and writes
// a fresh snapshot.

mod config;
mod replay;
mod snapshot;

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::Parser;
use config::DaemonConfig;
use snapshot::Snapshot;

use moderntensor_core::{Clock, ManualClock, RegistryEvent, SystemClock};
use moderntensor_economics::InMemoryLedger;
use moderntensor_registry::{Network, SharedNetwork};
use tokio::sync::broadcast::error::RecvError;

/// ModernTensor registry daemon.
#[derive(Parser, Debug)]
#[command(
    name = "moderntensor-daemon",
    version = "0.1.0",
    about = "ModernTensor registry daemon"
)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "moderntensor.toml")]
    config: String,

    /// JSON transaction log to replay (overrides the config file).
    #[arg(long)]
    transactions: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loaded = DaemonConfig::load(&args.config);
    let log_level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => "info".to_string(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    let mut daemon_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded configuration from {}", args.config);
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "Could not load config from {}: {}. Using defaults.",
                args.config,
                e
            );
            DaemonConfig::default()
        }
    };

    // CLI --transactions flag overrides the config file value.
    if args.transactions.is_some() {
        daemon_config.transactions = args.transactions.clone();
    }

    tracing::info!("ModernTensor Registry Daemon v0.1.0");
    tracing::info!("Administrator: {}", daemon_config.admin);
    tracing::info!("Data directory: {}", daemon_config.data_dir);

    // ---------------------------------------------------------------
    // Clock: manual for deterministic replays, wall clock otherwise.
    // ---------------------------------------------------------------
    let manual_clock = daemon_config.genesis_time.map(|t| Arc::new(ManualClock::new(t)));
    let clock: Arc<dyn Clock> = match &manual_clock {
        Some(manual) => manual.clone(),
        None => Arc::new(SystemClock),
    };

    // ---------------------------------------------------------------
    // Restore from snapshot or build from genesis.
    // ---------------------------------------------------------------
    let state_path = daemon_config.state_path();
    let mut accounts: BTreeSet<_> = daemon_config
        .genesis_balances()
        .into_iter()
        .map(|(address, _)| address)
        .collect();

    let network = match Snapshot::load(&state_path)? {
        Some(snapshot) => {
            tracing::info!(
                "Restoring snapshot from {} (taken at {})",
                state_path.display(),
                snapshot.taken_at
            );
            if let Some(manual) = &manual_clock {
                if snapshot.taken_at > manual.now() {
                    manual.set(snapshot.taken_at);
                }
            }
            accounts.extend(snapshot.balances.keys().copied());
            let ledger = InMemoryLedger::with_balances(snapshot.balances);
            Network::from_state(snapshot.state, Box::new(ledger), clock)?
        }
        None => {
            tracing::info!(
                "No snapshot at {}; starting from genesis ({} accounts)",
                state_path.display(),
                daemon_config.genesis.len()
            );
            let ledger = InMemoryLedger::with_balances(daemon_config.genesis_balances());
            Network::initialize(
                daemon_config.admin,
                daemon_config.economics.clone(),
                Box::new(ledger),
                clock,
            )?
        }
    };
    let shared = SharedNetwork::new(network);

    // ---------------------------------------------------------------
    // Event logger task: one structured line per committed event.
    // ---------------------------------------------------------------
    let mut events = shared.subscribe();
    let event_logger = tokio::spawn(async move {
        let mut seen = 0u64;
        loop {
            match events.recv().await {
                Ok(event) => {
                    seen += 1;
                    log_event(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event logger lagged; {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        seen
    });

    // ---------------------------------------------------------------
    // Replay the transaction log.
    // ---------------------------------------------------------------
    if let Some(path) = &daemon_config.transactions {
        let entries = replay::load_log(path)?;
        tracing::info!("Replaying {} transactions from {}", entries.len(), path);
        accounts.extend(entries.iter().map(|entry| entry.signer));
        let report = replay::replay(&shared, entries, manual_clock.as_deref()).await;
        tracing::info!(
            "Replay finished: {} applied, {} rejected",
            report.applied,
            report.rejected.len()
        );
        if !report.rejected.is_empty() {
            println!("{}", serde_json::to_string_pretty(&report.rejected)?);
        }
    }

    // ---------------------------------------------------------------
    // Summary and snapshot.
    // ---------------------------------------------------------------
    let (summary, state_snapshot) = shared
        .read(|network| {
            accounts.extend(snapshot::known_accounts(network.state()));
            let summary = serde_json::json!({
                "network": network.network_stats(),
                "treasury": network.treasury_stats(),
                "fees": network.registration_fee_info(),
                "subnets": network.list_subnets(0, usize::MAX),
            });
            (summary, Snapshot::capture(network, &accounts))
        })
        .await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    state_snapshot.save(&state_path)?;
    tracing::info!("Snapshot written to {}", state_path.display());

    drop(shared);
    let seen = event_logger.await?;
    tracing::info!("Shutting down ({} events observed)", seen);
    Ok(())
}

fn log_event(event: &RegistryEvent) {
    match serde_json::to_string(event) {
        Ok(json) => tracing::info!(target: "moderntensor::events", "{}", json),
        Err(e) => tracing::warn!("Could not encode event {:?}: {}", event, e),
    }
}
