// crates/moderntensor-economics/src/lib.rs
//
// moderntensor-economics: token units, fee processing and burning, treasury
// accounting, slashing math, and pro-rata reward math for the ModernTensor
// registry.
//
// All monetary values are tracked in octas (the smallest unit).
// 1 token = 100,000,000 octas (10^8).

pub mod ledger;
pub mod rewards;
pub mod slashing;
pub mod token;
pub mod treasury;

// Re-export key types for ergonomic access from downstream crates.
pub use ledger::InMemoryLedger;
pub use rewards::{distribute_pro_rata, RewardDistribution};
pub use slashing::{compute_slash, SlashOutcome};
pub use token::{apply_rate, mul_div, OCTAS_PER_TOKEN};
pub use treasury::{split_fee, FeeSplit, Treasury, TreasuryStats};
