// crates/moderntensor-economics/src/slashing.rs
//
// Slash computation for the ModernTensor registry.
//
// The administrator slashes a node by a SCALE-based percentage of its current
// stake:  slash_amount = floor(stake * slash_percentage / SCALE).
// The slashed amount leaves the node's stake and accumulates in its
// slashed_amount counter. A node can only be slashed once.

use serde::{Deserialize, Serialize};

use moderntensor_core::{RegistryError, SCALE};

use crate::token::apply_rate;

/// Result of applying a slash percentage to a stake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashOutcome {
    /// Amount removed from the stake.
    pub amount: u64,
    /// Stake left after the slash.
    pub remaining_stake: u64,
}

/// Compute the slash for `stake` at `slash_percentage`.
///
/// # Errors
/// Returns `RegistryError::InvalidParams` if `slash_percentage` exceeds SCALE (100%).
pub fn compute_slash(stake: u64, slash_percentage: u64) -> Result<SlashOutcome, RegistryError> {
    if slash_percentage > SCALE {
        return Err(RegistryError::InvalidParams(format!(
            "slash percentage {} exceeds {}",
            slash_percentage, SCALE
        )));
    }
    let amount = apply_rate(stake, slash_percentage).min(stake);
    Ok(SlashOutcome {
        amount,
        remaining_stake: stake - amount,
    })
}
