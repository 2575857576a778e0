// crates/moderntensor-registry/src/batch.rs
//
// Administrative batch updates of node quality metrics.
//
// A batch carries six parallel arrays of equal length n, 1 <= n <= 100.
// Batches are all-or-nothing: every entry is validated (record exists, trust,
// performance, weight, status, reward totals) before the first record is
// written.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use moderntensor_core::validation::{check_performance, check_trust_score, check_weight};
use moderntensor_core::{
    Address, MinerInfo, NodeRecord, NodeStatus, RegistryError, RegistryEvent, ValidatorInfo,
    MAX_BATCH_SIZE,
};

use crate::network::Network;
use crate::nodes::Stored;

/// Status code meaning "leave the status unchanged".
pub const STATUS_UNCHANGED: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeUpdateBatch {
    pub addresses: Vec<Address>,
    pub trust_scores: Vec<u64>,
    pub performances: Vec<u64>,
    pub rewards: Vec<u64>,
    pub weights: Vec<u64>,
    pub statuses: Vec<u8>,
}

impl NodeUpdateBatch {
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Append one entry.
    pub fn push(
        &mut self,
        address: Address,
        trust_score: u64,
        performance: u64,
        reward: u64,
        weight: u64,
        status: u8,
    ) {
        self.addresses.push(address);
        self.trust_scores.push(trust_score);
        self.performances.push(performance);
        self.rewards.push(reward);
        self.weights.push(weight);
        self.statuses.push(status);
    }

    /// Batch size, once the shape is valid.
    ///
    /// # Errors
    /// `BatchSizeExceeded` unless `1 <= n <= MAX_BATCH_SIZE`; `InvalidParams`
    /// if the arrays differ in length.
    pub fn check_shape(&self) -> Result<usize, RegistryError> {
        let n = self.len();
        if n == 0 || n > MAX_BATCH_SIZE {
            return Err(RegistryError::BatchSizeExceeded);
        }
        let lengths = [
            self.trust_scores.len(),
            self.performances.len(),
            self.rewards.len(),
            self.weights.len(),
            self.statuses.len(),
        ];
        if lengths.iter().any(|len| *len != n) {
            return Err(RegistryError::InvalidParams(format!(
                "batch arrays have mismatched lengths (expected {})",
                n
            )));
        }
        Ok(n)
    }
}

/// Aggregates reported for one applied batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub count: u64,
    pub total_rewards: u64,
    /// Integer mean of the batch's performances.
    pub average_performance: u64,
}

impl Network {
    pub fn batch_update_validators(
        &mut self,
        signer: &Address,
        batch: &NodeUpdateBatch,
    ) -> Result<BatchSummary, RegistryError> {
        self.batch_update::<ValidatorInfo>(signer, batch)
    }

    pub fn batch_update_miners(
        &mut self,
        signer: &Address,
        batch: &NodeUpdateBatch,
    ) -> Result<BatchSummary, RegistryError> {
        self.batch_update::<MinerInfo>(signer, batch)
    }

    fn batch_update<T: Stored>(
        &mut self,
        signer: &Address,
        batch: &NodeUpdateBatch,
    ) -> Result<BatchSummary, RegistryError> {
        self.ensure_admin(signer)?;
        let n = batch.check_shape()?;

        // Phase 1: validate every entry.
        let store = T::store(&self.state.registry);
        let mut statuses = Vec::with_capacity(n);
        let mut credited: BTreeMap<Address, u64> = BTreeMap::new();
        let mut total_rewards = 0u64;
        for i in 0..n {
            let address = &batch.addresses[i];
            let Some(record) = store.get(address) else {
                return Err(RegistryError::NotRegistered);
            };
            let reward = batch.rewards[i];
            let pending = credited
                .entry(*address)
                .or_insert(record.core().accumulated_rewards);
            *pending = pending
                .checked_add(reward)
                .ok_or_else(|| reward_overflow(address))?;
            total_rewards = total_rewards.checked_add(reward).ok_or_else(|| {
                RegistryError::InvalidParams("batch reward total overflows".into())
            })?;
            check_trust_score(batch.trust_scores[i])?;
            check_performance(batch.performances[i])?;
            check_weight(batch.weights[i], &self.state.params)?;
            statuses.push(match batch.statuses[i] {
                STATUS_UNCHANGED => None,
                code => Some(NodeStatus::from_code(code)?),
            });
        }
        if self
            .state
            .treasury
            .rewards_distributed
            .checked_add(total_rewards)
            .is_none()
        {
            return Err(RegistryError::InvalidParams(
                "distributed rewards counter would overflow".into(),
            ));
        }

        // Phase 2: apply.
        let now = self.now();
        let store = T::store_mut(&mut self.state.registry);
        let mut performance_sum = 0u128;
        for (i, status) in statuses.into_iter().enumerate() {
            let Some(record) = store.get_mut(&batch.addresses[i]) else {
                continue;
            };
            let core = record.core_mut();
            core.trust_score = batch.trust_scores[i];
            core.last_performance = batch.performances[i];
            core.weight = batch.weights[i];
            core.accumulated_rewards += batch.rewards[i];
            core.last_update_time = now;
            core.last_active_time = now;
            if let Some(status) = status {
                core.status = status;
            }
            performance_sum += batch.performances[i] as u128;
        }
        self.state.registry.last_update = now;
        self.state.treasury.record_rewards(total_rewards);

        let summary = BatchSummary {
            count: n as u64,
            total_rewards,
            average_performance: (performance_sum / n as u128) as u64,
        };
        self.emit(RegistryEvent::BatchUpdated {
            role: T::ROLE,
            count: summary.count,
            total_rewards,
            average_performance: summary.average_performance,
            timestamp: now,
        });
        tracing::info!(
            "Batch updated {} {}s: rewards={} avg_performance={}",
            summary.count,
            T::ROLE,
            total_rewards,
            summary.average_performance
        );
        Ok(summary)
    }
}

fn reward_overflow(address: &Address) -> RegistryError {
    RegistryError::InvalidParams(format!("accumulated rewards of {} would overflow", address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, miner_req, subnet_params, user};
    use moderntensor_core::SCALE;

    fn setup(miners: u8) -> Network {
        let (_, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 50)).unwrap();
        for n in 1..=miners {
            network.register_miner(&user(n), miner_req(1, 1_000_000)).unwrap();
        }
        network
    }

    #[test]
    fn test_shape_checks() {
        let mut batch = NodeUpdateBatch::default();
        assert_eq!(batch.check_shape(), Err(RegistryError::BatchSizeExceeded));
        for _ in 0..=MAX_BATCH_SIZE {
            batch.push(user(1), 0, 0, 0, SCALE, 0);
        }
        assert_eq!(batch.check_shape(), Err(RegistryError::BatchSizeExceeded));

        batch.addresses.pop();
        batch.trust_scores.pop();
        batch.performances.pop();
        batch.rewards.pop();
        batch.weights.pop();
        assert!(matches!(batch.check_shape(), Err(RegistryError::InvalidParams(_))));
        batch.statuses.pop();
        assert_eq!(batch.check_shape(), Ok(MAX_BATCH_SIZE));
    }

    #[test]
    fn test_apply_summary() {
        let mut network = setup(2);
        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), SCALE, SCALE, 500, SCALE, 0);
        batch.push(user(2), 0, SCALE / 2 + 1, 300, SCALE, 2);
        let summary = network.batch_update_miners(&admin(), &batch).unwrap();

        assert_eq!(summary.count, 2);
        assert_eq!(summary.total_rewards, 800);
        assert_eq!(summary.average_performance, (SCALE + SCALE / 2 + 1) / 2);

        let first = network.get_miner(&user(1)).unwrap();
        assert_eq!(first.node.trust_score, SCALE);
        assert_eq!(first.node.status, NodeStatus::Active);
        assert_eq!(first.node.accumulated_rewards, 500);
        let second = network.get_miner(&user(2)).unwrap();
        assert_eq!(second.node.status, NodeStatus::Jailed);
        assert_eq!(network.state().treasury.rewards_distributed, 800);

        // Rewards accumulate rather than overwrite.
        network.batch_update_miners(&admin(), &batch).unwrap();
        assert_eq!(network.get_miner(&user(1)).unwrap().node.accumulated_rewards, 1_000);
    }

    #[test]
    fn test_failing_entry_leaves_earlier_entries_untouched() {
        let mut network = setup(2);
        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), SCALE, SCALE, 500, SCALE, 0);
        batch.push(user(2), SCALE + 1, SCALE, 0, SCALE, 0);
        assert_eq!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::TrustScoreOutOfRange)
        );
        assert_eq!(network.get_miner(&user(1)).unwrap().node.accumulated_rewards, 0);

        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), SCALE, SCALE, 500, SCALE, 0);
        batch.push(user(9), SCALE, SCALE, 0, SCALE, 0);
        assert_eq!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::NotRegistered)
        );

        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), SCALE, SCALE, 0, SCALE, 4);
        assert_eq!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::InvalidStatus)
        );
        assert_eq!(
            network.batch_update_miners(&user(1), &batch),
            Err(RegistryError::NotAdmin)
        );
        assert!(network
            .pending_events()
            .iter()
            .all(|e| !matches!(e, RegistryEvent::BatchUpdated { .. })));
    }

    #[test]
    fn test_full_batch_of_hundred() {
        let mut network = setup(20);
        let mut batch = NodeUpdateBatch::default();
        for i in 0..MAX_BATCH_SIZE {
            batch.push(user((i % 20) as u8 + 1), SCALE / 2, SCALE / 4, 1, SCALE, 0);
        }
        let summary = network.batch_update_miners(&admin(), &batch).unwrap();
        assert_eq!(summary.count, 100);
        assert_eq!(summary.total_rewards, 100);
        assert_eq!(network.get_miner(&user(1)).unwrap().node.accumulated_rewards, 5);
    }

    #[test]
    fn test_reward_overflow_rejected_before_any_write() {
        let mut network = setup(2);
        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), 0, 0, u64::MAX, SCALE, 0);
        network.batch_update_miners(&admin(), &batch).unwrap();
        let before = serde_json::to_value(network.state()).unwrap();

        // Same record credited again.
        assert!(matches!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::InvalidParams(_))
        ));

        // A fresh record, but the distributed counter is already full.
        let mut batch = NodeUpdateBatch::default();
        batch.push(user(2), SCALE, SCALE, 1, SCALE, 2);
        assert!(matches!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(serde_json::to_value(network.state()).unwrap(), before);
        assert_eq!(network.get_miner(&user(2)).unwrap().node.status, NodeStatus::Active);

        // Two entries whose sum overflows within one batch.
        let mut network = setup(2);
        let mut batch = NodeUpdateBatch::default();
        batch.push(user(1), SCALE, SCALE, u64::MAX - 1, SCALE, 0);
        batch.push(user(2), SCALE, SCALE, 2, SCALE, 0);
        assert!(matches!(
            network.batch_update_miners(&admin(), &batch),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(network.get_miner(&user(1)).unwrap().node.accumulated_rewards, 0);
        assert_eq!(network.state().treasury.rewards_distributed, 0);
    }
}
