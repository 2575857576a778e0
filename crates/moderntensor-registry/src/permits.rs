// crates/moderntensor-registry/src/permits.rs
//
// Per-address side records: the registration cooldown and the validator permit.
//
// Cooldowns are keyed purely by address. Validator and miner registrations
// share one slot, so registering a second role still waits out the first
// role's cooldown. A validator holds at most one permit; purchasing or being
// granted a new one overwrites the old, whatever subnet it was bound to.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use moderntensor_core::validation::{deadline, has_elapsed};
use moderntensor_core::{Address, FeeReason, RegistryError, RegistryEvent, Role, SubnetId};

use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCooldown {
    pub last_registration: u64,
    pub registration_type: Role,
    pub cooldown_until: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorPermit {
    pub price_paid: u64,
    pub issued_at: u64,
    pub expires_at: u64,
    pub active: bool,
    pub subnet_id: SubnetId,
}

impl ValidatorPermit {
    /// Active, bound to `subnet_id`, and not yet expired.
    pub fn is_valid_for(&self, subnet_id: SubnetId, now: u64) -> bool {
        self.active && self.subnet_id == subnet_id && now < self.expires_at
    }
}

/// Cooldown and permit records, addressable independently of the node stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermitBook {
    cooldowns: HashMap<Address, RegistrationCooldown>,
    permits: HashMap<Address, ValidatorPermit>,
}

impl PermitBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cooldown(&self, address: &Address) -> Option<&RegistrationCooldown> {
        self.cooldowns.get(address)
    }

    pub fn permit(&self, address: &Address) -> Option<&ValidatorPermit> {
        self.permits.get(address)
    }

    /// Whether `address` is still inside its registration cooldown.
    pub fn is_cooling_down(&self, address: &Address, now: u64) -> bool {
        self.cooldowns
            .get(address)
            .is_some_and(|c| !has_elapsed(now, c.cooldown_until))
    }

    /// # Errors
    /// Returns `RegistryError::RegistrationCooldownActive` while cooling down.
    pub fn check_cooldown(&self, address: &Address, now: u64) -> Result<(), RegistryError> {
        if self.is_cooling_down(address, now) {
            Err(RegistryError::RegistrationCooldownActive)
        } else {
            Ok(())
        }
    }

    /// Start (or restart) the cooldown after a successful registration.
    pub fn start_cooldown(&mut self, address: Address, role: Role, now: u64, period: u64) {
        self.cooldowns.insert(
            address,
            RegistrationCooldown {
                last_registration: now,
                registration_type: role,
                cooldown_until: deadline(now, period),
            },
        );
    }

    /// Drop the cooldown record. Returns whether one existed.
    pub fn clear_cooldown(&mut self, address: &Address) -> bool {
        self.cooldowns.remove(address).is_some()
    }

    pub fn has_valid_permit(&self, address: &Address, subnet_id: SubnetId, now: u64) -> bool {
        self.permits
            .get(address)
            .is_some_and(|p| p.is_valid_for(subnet_id, now))
    }

    pub(crate) fn issue(&mut self, address: Address, permit: ValidatorPermit) {
        self.permits.insert(address, permit);
    }
}

impl Network {
    /// Buy a permit for the subnet the caller validates in.
    ///
    /// # Errors
    /// - `NotRegistered` if the caller holds no validator record
    /// - `InvalidSubnet` if the record is in another subnet or the subnet is inactive
    /// - `InsufficientFunds` if the caller cannot pay the permit price
    pub fn purchase_validator_permit(
        &mut self,
        signer: &Address,
        subnet_id: SubnetId,
    ) -> Result<ValidatorPermit, RegistryError> {
        let validator = self
            .state
            .registry
            .validators
            .get(signer)
            .ok_or(RegistryError::NotRegistered)?;
        if validator.node.subnet_id != subnet_id {
            return Err(RegistryError::InvalidSubnet);
        }
        self.state.subnets.active(subnet_id)?;

        let price = self.state.params.validator_permit_price;
        self.ensure_funds(signer, price, RegistryError::InsufficientFunds)?;

        let now = self.now();
        self.charge_fee(signer, price, FeeReason::ValidatorPermit, now)?;
        Ok(self.issue_permit(*signer, subnet_id, price, false, now))
    }

    /// Issue a permit without charge (admin). The recipient need not be
    /// registered yet.
    pub fn grant_validator_permit(
        &mut self,
        signer: &Address,
        validator: &Address,
        subnet_id: SubnetId,
    ) -> Result<ValidatorPermit, RegistryError> {
        self.ensure_admin(signer)?;
        if !self.state.subnets.contains(subnet_id) {
            return Err(RegistryError::InvalidSubnet);
        }
        let now = self.now();
        Ok(self.issue_permit(*validator, subnet_id, 0, true, now))
    }

    /// Lift an address's registration cooldown (admin).
    pub fn reset_registration_cooldown(
        &mut self,
        signer: &Address,
        address: &Address,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        let now = self.now();
        let existed = self.state.permits.clear_cooldown(address);
        self.emit(RegistryEvent::CooldownReset {
            address: *address,
            timestamp: now,
        });
        tracing::info!("Registration cooldown reset for {} (existed={})", address, existed);
        Ok(())
    }

    fn issue_permit(
        &mut self,
        address: Address,
        subnet_id: SubnetId,
        price: u64,
        granted: bool,
        now: u64,
    ) -> ValidatorPermit {
        let permit = ValidatorPermit {
            price_paid: price,
            issued_at: now,
            expires_at: deadline(now, self.state.params.validator_permit_duration),
            active: true,
            subnet_id,
        };
        self.state.permits.issue(address, permit);
        if let Some(validator) = self.state.registry.validators.get_mut(&address) {
            validator.permit_active = true;
            validator.permit_expires_at = permit.expires_at;
        }

        self.emit(RegistryEvent::PermitIssued {
            address,
            subnet_id,
            price,
            expires_at: permit.expires_at,
            granted,
        });
        tracing::info!(
            "Validator permit issued: address={} subnet={} price={} granted={}",
            address,
            subnet_id,
            price,
            granted
        );
        permit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_window() {
        let mut book = PermitBook::new();
        let a = Address::repeat_byte(1);
        assert!(book.check_cooldown(&a, 0).is_ok());

        book.start_cooldown(a, Role::Miner, 1_000, 300);
        assert_eq!(
            book.check_cooldown(&a, 1_299),
            Err(RegistryError::RegistrationCooldownActive)
        );
        assert!(book.check_cooldown(&a, 1_300).is_ok());
        assert_eq!(book.cooldown(&a).unwrap().registration_type, Role::Miner);

        assert!(book.clear_cooldown(&a));
        assert!(!book.clear_cooldown(&a));
    }

    #[test]
    fn test_cooldown_slot_shared_between_roles() {
        let mut book = PermitBook::new();
        let a = Address::repeat_byte(1);
        book.start_cooldown(a, Role::Validator, 1_000, 300);
        book.start_cooldown(a, Role::Miner, 1_100, 300);
        let cooldown = book.cooldown(&a).unwrap();
        assert_eq!(cooldown.registration_type, Role::Miner);
        assert_eq!(cooldown.cooldown_until, 1_400);
    }

    #[test]
    fn test_permit_validity() {
        let permit = ValidatorPermit {
            price_paid: 0,
            issued_at: 0,
            expires_at: 100,
            active: true,
            subnet_id: 3,
        };
        assert!(permit.is_valid_for(3, 99));
        assert!(!permit.is_valid_for(3, 100));
        assert!(!permit.is_valid_for(4, 50));
        assert!(!ValidatorPermit {
            active: false,
            ..permit
        }
        .is_valid_for(3, 50));
    }

    #[test]
    fn test_new_permit_overwrites_old() {
        let mut book = PermitBook::new();
        let a = Address::repeat_byte(1);
        let permit = ValidatorPermit {
            price_paid: 1,
            issued_at: 0,
            expires_at: 100,
            active: true,
            subnet_id: 1,
        };
        book.issue(a, permit);
        book.issue(
            a,
            ValidatorPermit {
                subnet_id: 2,
                ..permit
            },
        );
        assert!(!book.has_valid_permit(&a, 1, 10));
        assert!(book.has_valid_permit(&a, 2, 10));
    }
}
