// crates/moderntensor-registry/src/lib.rs
//
// moderntensor-registry: the stateful registry engine for ModernTensor.
//
// A `Network` owns the Subnet Directory, the Node Registry (validators and
// miners), the Permit & Cooldown book, and the Treasury, and consumes an
// injected ledger and clock. Every mutating entry point validates all of its
// preconditions before the first write, so a rejected call leaves the state
// untouched. `SharedNetwork` serializes calls behind one lock and publishes
// the committed domain events.

pub mod batch;
pub mod call;
pub mod distribution;
pub mod lifecycle;
pub mod network;
pub mod nodes;
pub mod permits;
pub mod registration;
pub mod shared;
pub mod subnets;
#[cfg(test)]
pub(crate) mod test_support;
pub mod views;
pub mod weights;

pub use batch::{BatchSummary, NodeUpdateBatch};
pub use call::{Call, SignedCall};
pub use network::{Network, NetworkState};
pub use nodes::{NodeRegistry, NodeStore, Stored};
pub use permits::{PermitBook, RegistrationCooldown, ValidatorPermit};
pub use registration::{MinerRegistration, ValidatorRegistration};
pub use shared::SharedNetwork;
pub use subnets::SubnetDirectory;
pub use views::{CooldownStatus, FeeInfo, NetworkStats, TransferEligibility};
pub use weights::WeightEntry;
