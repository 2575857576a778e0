// crates/moderntensor-core/src/events.rs
//
// Domain events appended by every successful mutating operation.
//
// Events are not queryable state. The engine buffers the events of a call and
// the shared wrapper publishes them on a broadcast channel for off-chain
// observers once the call has committed.

use serde::{Deserialize, Serialize};

use crate::encoding::text_bytes;
use crate::identity::{Address, Role, SubnetId};
use crate::node::NodeStatus;

/// Why a fee was charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeReason {
    ValidatorRegistration,
    MinerRegistration,
    SubnetCreation,
    ValidatorPermit,
}

impl FeeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeeReason::ValidatorRegistration => "validator_registration",
            FeeReason::MinerRegistration => "miner_registration",
            FeeReason::SubnetCreation => "subnet_creation",
            FeeReason::ValidatorPermit => "validator_permit",
        }
    }

    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            FeeReason::ValidatorRegistration | FeeReason::MinerRegistration
        )
    }
}

/// Events emitted by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A fee was charged and split between burn and treasury.
    FeeBurned {
        payer: Address,
        reason: FeeReason,
        amount: u64,
        burn_amount: u64,
        treasury_amount: u64,
        timestamp: u64,
    },
    SubnetCreated {
        subnet_id: SubnetId,
        creator: Address,
        name: String,
        fee_paid: u64,
        timestamp: u64,
    },
    SubnetUpdated {
        subnet_id: SubnetId,
        timestamp: u64,
    },
    SubnetStatusChanged {
        subnet_id: SubnetId,
        active: bool,
        timestamp: u64,
    },
    /// A node registered, or re-registered into a different subnet.
    NodeRegistered {
        address: Address,
        role: Role,
        #[serde(with = "text_bytes")]
        uid: Vec<u8>,
        subnet_id: SubnetId,
        /// Previous subnet when the registration was a transfer.
        transferred_from: Option<SubnetId>,
        stake: u64,
        bond: u64,
        fee_paid: u64,
        timestamp: u64,
    },
    /// A node left the registry or changed status outside a batch.
    NodeStatusChanged {
        address: Address,
        role: Role,
        subnet_id: SubnetId,
        old_status: NodeStatus,
        new_status: NodeStatus,
        timestamp: u64,
    },
    NodeRecycled {
        address: Address,
        role: Role,
        recycler: Address,
        reward: u64,
        timestamp: u64,
    },
    StakeChanged {
        address: Address,
        role: Role,
        old_stake: u64,
        new_stake: u64,
        timestamp: u64,
    },
    BondReleased {
        address: Address,
        amount: u64,
        /// True when the bond was forfeited rather than returned.
        forfeited: bool,
        timestamp: u64,
    },
    PermitIssued {
        address: Address,
        subnet_id: SubnetId,
        price: u64,
        expires_at: u64,
        granted: bool,
    },
    CooldownReset {
        address: Address,
        timestamp: u64,
    },
    WeightsSet {
        validator: Address,
        subnet_id: SubnetId,
        count: u64,
        timestamp: u64,
    },
    /// Aggregate summary of one batch update.
    BatchUpdated {
        role: Role,
        count: u64,
        total_rewards: u64,
        average_performance: u64,
        timestamp: u64,
    },
    Slashed {
        address: Address,
        role: Role,
        subnet_id: SubnetId,
        amount: u64,
        percentage: u64,
        reason: String,
        timestamp: u64,
    },
    RewardsDistributed {
        subnet_id: SubnetId,
        recipients: u64,
        distributed: u64,
        remainder: u64,
        timestamp: u64,
    },
    RewardsClaimed {
        address: Address,
        role: Role,
        amount: u64,
        timestamp: u64,
    },
    ParamsUpdated {
        timestamp: u64,
    },
    EmergencyAction {
        paused: bool,
        timestamp: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_reason_labels() {
        assert_eq!(FeeReason::ValidatorRegistration.as_str(), "validator_registration");
        assert_eq!(FeeReason::MinerRegistration.as_str(), "miner_registration");
        assert_eq!(FeeReason::SubnetCreation.as_str(), "subnet_creation");
        assert_eq!(FeeReason::ValidatorPermit.as_str(), "validator_permit");
        assert!(FeeReason::MinerRegistration.is_registration());
        assert!(!FeeReason::ValidatorPermit.is_registration());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = RegistryEvent::EmergencyAction {
            paused: true,
            timestamp: 9,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "emergency_action");
        assert_eq!(json["paused"], true);
    }
}
