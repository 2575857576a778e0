// crates/moderntensor-registry/src/weights.rs
//
// Validator weight setting.
//
// A validator submits one weight per miner uid in its own subnet. The vector
// replaces the validator's previous submission and is dropped when the
// validator leaves the registry.

use serde::{Deserialize, Serialize};

use moderntensor_core::encoding::text_bytes;
use moderntensor_core::validation::{check_weight, deadline, has_elapsed};
use moderntensor_core::{Address, RegistryError, RegistryEvent, SubnetId};

use crate::network::Network;

/// One (miner uid, weight) pair of a validator's submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    #[serde(with = "text_bytes")]
    pub miner_uid: Vec<u8>,
    /// Weight, scaled by SCALE.
    pub weight: u64,
}

impl Network {
    /// Record the caller's weight vector for `subnet_id`.
    ///
    /// # Errors
    /// - `NotRegistered` if the caller is not a validator
    /// - `InvalidSubnet` if it validates in another subnet
    /// - `ImmunityPeriodActive` while the caller is immune
    /// - `WeightSettingCooldown` within the cooldown of its last submission
    /// - `InvalidParams` for empty or mismatched inputs
    /// - `WeightOutOfRange` if any weight is outside `[min_weight, max_weight]`
    pub fn set_validator_weights(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
        miner_uids: Vec<Vec<u8>>,
        weights: Vec<u64>,
    ) -> Result<(), RegistryError> {
        let now = self.now();
        let params = &self.state.params;
        let validator = self
            .state
            .registry
            .validators
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        if validator.node.subnet_id != subnet_id {
            return Err(RegistryError::InvalidSubnet);
        }
        if validator.node.is_immune(now) {
            return Err(RegistryError::ImmunityPeriodActive);
        }
        let ready_at = deadline(validator.last_weight_set_time, params.weight_setting_cooldown);
        if !has_elapsed(now, ready_at) {
            return Err(RegistryError::WeightSettingCooldown);
        }
        if miner_uids.is_empty() || miner_uids.len() != weights.len() {
            return Err(RegistryError::InvalidParams(format!(
                "{} miner uids for {} weights",
                miner_uids.len(),
                weights.len()
            )));
        }
        for weight in &weights {
            check_weight(*weight, params)?;
        }

        let entries: Vec<WeightEntry> = miner_uids
            .into_iter()
            .zip(weights)
            .map(|(miner_uid, weight)| WeightEntry { miner_uid, weight })
            .collect();
        let count = entries.len() as u64;

        if let Some(validator) = self.state.registry.validators.get_mut(signer) {
            validator.last_weight_set_time = now;
            validator.node.last_active_time = now;
        }
        self.state.registry.validator_weights.insert(*signer, entries);

        self.emit(RegistryEvent::WeightsSet {
            validator: *signer,
            subnet_id,
            count,
            timestamp: now,
        });
        tracing::debug!("Validator {} set {} weights in subnet {}", signer, count, subnet_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, subnet_params, user, validator_req};
    use moderntensor_core::SCALE;

    fn setup() -> (std::sync::Arc<moderntensor_core::ManualClock>, Network) {
        let (clock, mut network) = fixture();
        network.create_subnet(&admin(), 1, subnet_params(2, 10)).unwrap();
        network
            .register_validator(&user(1), validator_req(1, 2_000_000, 2_000_000))
            .unwrap();
        (clock, network)
    }

    #[test]
    fn test_weights_blocked_during_immunity() {
        let (_, mut network) = setup();
        assert_eq!(
            network.set_validator_weights(&user(1), 1, vec![b"m1".to_vec()], vec![SCALE]),
            Err(RegistryError::ImmunityPeriodActive)
        );
    }

    #[test]
    fn test_weights_persisted_and_cooldown() {
        let (clock, mut network) = setup();
        clock.advance(network.params().immunity_period);
        network
            .set_validator_weights(
                &user(1),
                1,
                vec![b"m1".to_vec(), b"m2".to_vec()],
                vec![SCALE, SCALE / 2],
            )
            .unwrap();
        let stored = network.validator_weights(&user(1)).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].weight, SCALE / 2);

        assert_eq!(
            network.set_validator_weights(&user(1), 1, vec![b"m1".to_vec()], vec![SCALE]),
            Err(RegistryError::WeightSettingCooldown)
        );
        clock.advance(network.params().weight_setting_cooldown);
        network
            .set_validator_weights(&user(1), 1, vec![b"m3".to_vec()], vec![SCALE])
            .unwrap();
        assert_eq!(network.validator_weights(&user(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_weight_input_validation() {
        let (clock, mut network) = setup();
        clock.advance(network.params().immunity_period);
        assert_eq!(
            network.set_validator_weights(&user(1), 2, vec![b"m".to_vec()], vec![SCALE]),
            Err(RegistryError::InvalidSubnet)
        );
        assert!(matches!(
            network.set_validator_weights(&user(1), 1, vec![], vec![]),
            Err(RegistryError::InvalidParams(_))
        ));
        assert!(matches!(
            network.set_validator_weights(&user(1), 1, vec![b"m".to_vec()], vec![SCALE, SCALE]),
            Err(RegistryError::InvalidParams(_))
        ));
        assert_eq!(
            network.set_validator_weights(&user(1), 1, vec![b"m".to_vec()], vec![SCALE * 6]),
            Err(RegistryError::WeightOutOfRange)
        );
        assert_eq!(
            network.set_validator_weights(&user(2), 1, vec![b"m".to_vec()], vec![SCALE]),
            Err(RegistryError::NotRegistered)
        );
    }
}
