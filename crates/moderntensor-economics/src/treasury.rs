// crates/moderntensor-economics/src/treasury.rs
//
// Network treasury for the ModernTensor registry.
//
// The treasury is a singleton owned by the administrator account. Funds sit
// in the administrator's custodial balance on the underlying ledger; the
// treasury only keeps aggregate counters:
//   - fees collected, split into a burned share and a treasury share
//   - validator bonds locked in custody (and bonds forfeited by slashing)
//   - rewards credited to nodes, claimed by nodes, and paid to recyclers
//
// Invariant: total_fees_collected == total_burned + total_treasury_fees.
// Counters saturate rather than wrap.

use serde::{Deserialize, Serialize};

use moderntensor_core::{Address, FeeReason, Ledger, LedgerError};

use crate::token::apply_rate;

/// Result of splitting one fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub burn_amount: u64,
    pub treasury_amount: u64,
}

/// Split `amount` into a burned share (`floor(amount * burn_percentage / SCALE)`)
/// and the remainder kept by the treasury.
pub fn split_fee(amount: u64, burn_percentage: u64) -> FeeSplit {
    let burn_amount = apply_rate(amount, burn_percentage).min(amount);
    FeeSplit {
        burn_amount,
        treasury_amount: amount - burn_amount,
    }
}

/// Aggregate treasury counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasury {
    pub total_fees_collected: u64,
    pub total_burned: u64,
    pub total_treasury_fees: u64,
    pub registration_fees_collected: u64,
    pub subnet_creation_fees: u64,
    pub permit_fees_collected: u64,
    pub validator_bonds_locked: u64,
    pub bonds_forfeited: u64,
    pub recycling_rewards_paid: u64,
    pub total_slashed: u64,
    pub rewards_distributed: u64,
    pub rewards_claimed: u64,
    pub total_registrations: u64,
    pub total_permits: u64,
    pub last_burn_timestamp: u64,
}

/// Read-only projection of the treasury for external clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryStats {
    pub total_burned: u64,
    pub total_treasury_fees: u64,
    pub total_registrations: u64,
    pub total_permits: u64,
    pub total_fees_collected: u64,
    pub registration_fees_collected: u64,
    pub subnet_creation_fees: u64,
    pub permit_fees_collected: u64,
    pub validator_bonds_locked: u64,
    pub bonds_forfeited: u64,
    pub recycling_rewards_paid: u64,
    pub total_slashed: u64,
    pub rewards_distributed: u64,
    pub rewards_claimed: u64,
    pub last_burn_timestamp: u64,
}

impl Treasury {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge a fee: debit `amount` from `payer` into the custodian's balance,
    /// split it between burn and treasury, and update the counters.
    ///
    /// # Errors
    /// Returns the ledger's error if the transfer fails; counters are left
    /// untouched in that case.
    #[allow(clippy::too_many_arguments)]
    pub fn process_fee(
        &mut self,
        ledger: &mut dyn Ledger,
        payer: &Address,
        custodian: &Address,
        amount: u64,
        burn_percentage: u64,
        reason: FeeReason,
        now: u64,
    ) -> Result<FeeSplit, LedgerError> {
        if amount > 0 && payer != custodian {
            ledger.transfer(payer, custodian, amount)?;
        }

        let split = split_fee(amount, burn_percentage);
        self.total_fees_collected = self.total_fees_collected.saturating_add(amount);
        self.total_burned = self.total_burned.saturating_add(split.burn_amount);
        self.total_treasury_fees = self.total_treasury_fees.saturating_add(split.treasury_amount);
        self.last_burn_timestamp = now;

        match reason {
            FeeReason::ValidatorRegistration | FeeReason::MinerRegistration => {
                self.registration_fees_collected =
                    self.registration_fees_collected.saturating_add(amount);
                self.total_registrations = self.total_registrations.saturating_add(1);
            }
            FeeReason::SubnetCreation => self.subnet_creation_fees += amount,
            FeeReason::ValidatorPermit => {
                self.permit_fees_collected =
                    self.permit_fees_collected.saturating_add(amount);
                self.total_permits = self.total_permits.saturating_add(1);
            }
        }

        tracing::debug!(
            "Fee processed: payer={} reason={} amount={} burned={} treasury={}",
            payer,
            reason.as_str(),
            amount,
            split.burn_amount,
            split.treasury_amount
        );

        Ok(split)
    }

    /// Move a validator bond into custody and count it as locked.
    ///
    /// Bonds are not fee-split; no burn applies.
    pub fn lock_bond(
        &mut self,
        ledger: &mut dyn Ledger,
        validator: &Address,
        custodian: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount > 0 && validator != custodian {
            ledger.transfer(validator, custodian, amount)?;
        }
        self.validator_bonds_locked = self.validator_bonds_locked.saturating_add(amount);
        Ok(())
    }

    /// Return a locked bond from custody to its validator.
    pub fn release_bond(
        &mut self,
        ledger: &mut dyn Ledger,
        custodian: &Address,
        validator: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount > 0 && validator != custodian {
            ledger.transfer(custodian, validator, amount)?;
        }
        self.validator_bonds_locked = self.validator_bonds_locked.saturating_sub(amount);
        Ok(())
    }

    /// Keep a slashed validator's bond: it leaves the locked counter without
    /// moving out of custody.
    pub fn forfeit_bond(&mut self, amount: u64) {
        self.validator_bonds_locked = self.validator_bonds_locked.saturating_sub(amount);
        self.bonds_forfeited = self.bonds_forfeited.saturating_add(amount);
    }

    /// Pay `amount` out of custody to `recipient` as a recycling reward.
    pub fn pay_recycling_reward(
        &mut self,
        ledger: &mut dyn Ledger,
        custodian: &Address,
        recipient: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount > 0 && recipient != custodian {
            ledger.transfer(custodian, recipient, amount)?;
        }
        self.recycling_rewards_paid = self.recycling_rewards_paid.saturating_add(amount);
        Ok(())
    }

    /// Pay accumulated node rewards out of custody.
    pub fn pay_rewards(
        &mut self,
        ledger: &mut dyn Ledger,
        custodian: &Address,
        recipient: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        if amount > 0 && recipient != custodian {
            ledger.transfer(custodian, recipient, amount)?;
        }
        self.rewards_claimed = self.rewards_claimed.saturating_add(amount);
        Ok(())
    }

    pub fn record_rewards(&mut self, amount: u64) {
        self.rewards_distributed = self.rewards_distributed.saturating_add(amount);
    }

    pub fn record_slash(&mut self, amount: u64) {
        self.total_slashed = self.total_slashed.saturating_add(amount);
    }

    pub fn stats(&self) -> TreasuryStats {
        TreasuryStats {
            total_burned: self.total_burned,
            total_treasury_fees: self.total_treasury_fees,
            total_registrations: self.total_registrations,
            total_permits: self.total_permits,
            total_fees_collected: self.total_fees_collected,
            registration_fees_collected: self.registration_fees_collected,
            subnet_creation_fees: self.subnet_creation_fees,
            permit_fees_collected: self.permit_fees_collected,
            validator_bonds_locked: self.validator_bonds_locked,
            bonds_forfeited: self.bonds_forfeited,
            recycling_rewards_paid: self.recycling_rewards_paid,
            total_slashed: self.total_slashed,
            rewards_distributed: self.rewards_distributed,
            rewards_claimed: self.rewards_claimed,
            last_burn_timestamp: self.last_burn_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use moderntensor_core::SCALE;

    const HALF: u64 = SCALE / 2;

    fn admin() -> Address {
        Address::repeat_byte(0xaa)
    }

    fn payer() -> Address {
        Address::repeat_byte(1)
    }

    #[test]
    fn test_split_sums_to_amount() {
        for amount in [0u64, 1, 2, 3, 99, 100_001, 123_456_789, u64::MAX] {
            let split = split_fee(amount, HALF);
            assert_eq!(split.burn_amount + split.treasury_amount, amount);
            assert_eq!(split.burn_amount, amount / 2);
        }
    }

    #[test]
    fn test_split_extremes() {
        assert_eq!(split_fee(1_000, 0).burn_amount, 0);
        assert_eq!(split_fee(1_000, SCALE).treasury_amount, 0);
    }

    #[test]
    fn test_process_fee_moves_funds_and_counts() {
        let mut ledger = InMemoryLedger::with_balances([(payer(), 1_000_000)]);
        let mut treasury = Treasury::new();

        let split = treasury
            .process_fee(
                &mut ledger,
                &payer(),
                &admin(),
                100_001,
                HALF,
                FeeReason::MinerRegistration,
                77,
            )
            .unwrap();

        assert_eq!(split.burn_amount, 50_000);
        assert_eq!(split.treasury_amount, 50_001);
        assert_eq!(ledger.balance(&payer()), 1_000_000 - 100_001);
        assert_eq!(ledger.balance(&admin()), 100_001);
        assert_eq!(treasury.total_fees_collected, 100_001);
        assert_eq!(
            treasury.total_fees_collected,
            treasury.total_burned + treasury.total_treasury_fees
        );
        assert_eq!(treasury.registration_fees_collected, 100_001);
        assert_eq!(treasury.total_registrations, 1);
        assert_eq!(treasury.last_burn_timestamp, 77);
    }

    #[test]
    fn test_process_fee_insufficient_funds_leaves_counters() {
        let mut ledger = InMemoryLedger::with_balances([(payer(), 10)]);
        let mut treasury = Treasury::new();
        let result = treasury.process_fee(
            &mut ledger,
            &payer(),
            &admin(),
            100,
            HALF,
            FeeReason::ValidatorPermit,
            1,
        );
        assert!(matches!(result, Err(LedgerError::InsufficientBalance { .. })));
        assert_eq!(treasury, Treasury::new());
        assert_eq!(ledger.balance(&payer()), 10);
    }

    #[test]
    fn test_bond_lock_release_and_forfeit() {
        let mut ledger = InMemoryLedger::with_balances([(payer(), 5_000)]);
        let mut treasury = Treasury::new();

        treasury.lock_bond(&mut ledger, &payer(), &admin(), 3_000).unwrap();
        assert_eq!(treasury.validator_bonds_locked, 3_000);
        assert_eq!(ledger.balance(&admin()), 3_000);

        treasury.release_bond(&mut ledger, &admin(), &payer(), 1_000).unwrap();
        assert_eq!(treasury.validator_bonds_locked, 2_000);
        assert_eq!(ledger.balance(&payer()), 3_000);

        treasury.forfeit_bond(2_000);
        assert_eq!(treasury.validator_bonds_locked, 0);
        assert_eq!(treasury.bonds_forfeited, 2_000);
        // Forfeited funds stay in custody.
        assert_eq!(ledger.balance(&admin()), 2_000);
    }

    #[test]
    fn test_admin_fee_does_not_self_transfer() {
        let mut ledger = InMemoryLedger::new();
        let mut treasury = Treasury::new();
        let split = treasury
            .process_fee(
                &mut ledger,
                &admin(),
                &admin(),
                0,
                HALF,
                FeeReason::SubnetCreation,
                5,
            )
            .unwrap();
        assert_eq!(split, FeeSplit { burn_amount: 0, treasury_amount: 0 });
        assert_eq!(treasury.subnet_creation_fees, 0);
    }

    #[test]
    fn test_counters_saturate() {
        let mut treasury = Treasury::new();
        treasury.record_rewards(u64::MAX);
        treasury.record_rewards(1);
        treasury.record_slash(u64::MAX);
        treasury.record_slash(u64::MAX);
        assert_eq!(treasury.rewards_distributed, u64::MAX);
        assert_eq!(treasury.total_slashed, u64::MAX);
    }
}
