// crates/moderntensor-daemon/src/replay.rs
//
// Replay of a JSON transaction log through the shared registry.
//
// The log is a JSON array of entries, each a signed call with an optional
// `at` timestamp. Rejected calls are counted and logged; replay continues
// with the next entry.

use std::fs;

use serde::{Deserialize, Serialize};

use moderntensor_core::{Address, Clock, ManualClock};
use moderntensor_registry::{Call, SharedNetwork, SignedCall};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("cannot read transaction log {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("transaction log {path} is malformed: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// One line of the transaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unix seconds at which the call takes effect (manual clock only).
    #[serde(default)]
    pub at: Option<u64>,
    pub signer: Address,
    pub call: Call,
}

/// A call the registry refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub index: usize,
    pub op: &'static str,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<Rejection>,
}

/// Parse a transaction log from disk.
pub fn load_log(path: &str) -> Result<Vec<LogEntry>, ReplayError> {
    let contents = fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ReplayError::Json {
        path: path.to_string(),
        source,
    })
}

/// Execute `entries` in order. With a manual clock, an entry's `at` moves
/// the clock forward; time never moves backwards.
pub async fn replay(
    shared: &SharedNetwork,
    entries: Vec<LogEntry>,
    clock: Option<&ManualClock>,
) -> ReplayReport {
    let mut report = ReplayReport::default();
    for (index, entry) in entries.into_iter().enumerate() {
        match (entry.at, clock) {
            (Some(at), Some(clock)) => {
                if at < clock.now() {
                    tracing::warn!("Entry {} is timestamped in the past; keeping clock", index);
                } else {
                    clock.set(at);
                }
            }
            (Some(_), None) => {
                tracing::debug!("Entry {} carries a timestamp but the wall clock is in use", index)
            }
            _ => {}
        }

        let op = entry.call.name();
        let signed = SignedCall {
            signer: entry.signer,
            call: entry.call,
        };
        match shared.execute(signed).await {
            Ok(()) => report.applied += 1,
            Err(e) => {
                tracing::warn!("Entry {} ({}) rejected: {}", index, op, e);
                report.rejected.push(Rejection {
                    index,
                    op,
                    code: e.code(),
                    message: e.to_string(),
                });
            }
        }
    }
    report
}
