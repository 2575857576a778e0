// crates/moderntensor-economics/src/rewards.rs
//
// Pro-rata reward distribution for one subnet.
//
// A reward pool is divided among eligible nodes in proportion to their stake:
//   share_i = floor(pool * stake_i / sum(stake))
// Floor division leaves a small remainder undistributed; it is reported so
// the caller can account for it.

use moderntensor_core::Address;

use crate::token::mul_div;

/// The result of dividing a reward pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardDistribution {
    /// Per-node payouts, in the order the shares were supplied.
    pub payouts: Vec<(Address, u64)>,
    /// Sum of all payouts.
    pub distributed: u64,
    /// `pool - distributed`.
    pub remainder: u64,
}

/// Divide `pool` among `shares` (address, stake) pro rata by stake.
///
/// Entries with zero stake receive nothing. If the total stake is zero the
/// whole pool is returned as remainder.
pub fn distribute_pro_rata(pool: u64, shares: &[(Address, u64)]) -> RewardDistribution {
    let total_stake: u128 = shares.iter().map(|(_, stake)| *stake as u128).sum();
    if total_stake == 0 {
        return RewardDistribution {
            payouts: Vec::new(),
            distributed: 0,
            remainder: pool,
        };
    }

    let mut payouts = Vec::with_capacity(shares.len());
    let mut distributed = 0u64;
    for (address, stake) in shares {
        if *stake == 0 {
            continue;
        }
        let reward = if total_stake > u64::MAX as u128 {
            (pool as u128 * *stake as u128 / total_stake) as u64
        } else {
            mul_div(pool, *stake, total_stake as u64)
        };
        distributed += reward;
        payouts.push((*address, reward));
    }

    RewardDistribution {
        payouts,
        distributed,
        remainder: pool - distributed,
    }
}
