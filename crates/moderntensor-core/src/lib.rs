// crates/moderntensor-core/src/lib.rs
//
// moderntensor-core: Core types, parameters, and validation predicates for the
// ModernTensor registry.
//
// This is the leaf crate that every other crate in the workspace depends on.
// It defines node and subnet records, the economic parameter set, the error
// taxonomy, domain events, and the clock/ledger seams the engine is built on.

pub mod clock;
pub mod encoding;
pub mod error;
pub mod events;
pub mod identity;
pub mod node;
pub mod params;
pub mod subnet;
pub mod traits;
pub mod validation;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use moderntensor_core::ValidatorInfo;`

// Identity types
pub use identity::{Address, Role, SubnetId};

// Node records
pub use node::{MinerInfo, NodeCore, NodeRecord, NodeStatus, ValidatorInfo};

// Subnet records
pub use subnet::{SubnetInfo, SubnetLimits, SubnetParams};

// Parameters
pub use params::{
    EconomicParams, DEFAULT_TRUST_SCORE, DEFAULT_WEIGHT, MAX_BATCH_SIZE, MAX_UID_LEN, SCALE,
};

// Events
pub use events::{FeeReason, RegistryEvent};

// Errors
pub use error::{LedgerError, RegistryError};

// Seams
pub use clock::{ManualClock, SystemClock};
pub use traits::{Clock, Ledger};
