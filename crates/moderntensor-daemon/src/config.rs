// crates/moderntensor-daemon/src/config.rs
//
// Runtime configuration for the ModernTensor registry daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use moderntensor_core::{Address, EconomicParams};

/// One pre-funded account of the genesis ledger.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenesisAccount {
    pub address: Address,
    pub balance: u64,
}

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Administrator account; also the custodian of fees and bonds.
    #[serde(default = "default_admin")]
    pub admin: Address,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory holding the state snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Snapshot file name inside `data_dir`.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// JSON transaction log to replay on startup.
    #[serde(default)]
    pub transactions: Option<String>,

    /// When set, replay runs on a manual clock starting here (unix seconds)
    /// and entries may pin their own `at` time. Otherwise the wall clock is
    /// used.
    #[serde(default)]
    pub genesis_time: Option<u64>,

    /// Balances of a fresh ledger. Ignored once a snapshot exists.
    #[serde(default)]
    pub genesis: Vec<GenesisAccount>,

    /// Economic parameters for a fresh network. Missing fields keep their
    /// defaults.
    #[serde(default)]
    pub economics: EconomicParams,
}

fn default_admin() -> Address {
    Address::repeat_byte(0x01)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> String {
    "./moderntensor-data".to_string()
}

fn default_state_file() -> String {
    "registry_state.json".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            log_level: default_log_level(),
            data_dir: default_data_dir(),
            state_file: default_state_file(),
            transactions: None,
            genesis_time: None,
            genesis: Vec::new(),
            economics: EconomicParams::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: DaemonConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Full path of the state snapshot.
    pub fn state_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.state_file)
    }

    /// Genesis balances, with the administrator listed even when unfunded.
    pub fn genesis_balances(&self) -> Vec<(Address, u64)> {
        let mut balances: Vec<(Address, u64)> = self
            .genesis
            .iter()
            .map(|account| (account.address, account.balance))
            .collect();
        if !balances.iter().any(|(address, _)| *address == self.admin) {
            balances.push((self.admin, 0));
        }
        balances
    }
}
