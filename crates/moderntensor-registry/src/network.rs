// crates/moderntensor-registry/src/network.rs
//
// The registry engine: owned state plus the injected ledger and clock.
//
// `NetworkState` is the persisted part (administrator, parameters, treasury,
// subnet directory, node registry, permit book). `Network` pairs it with the
// external collaborators and buffers the events of the calls it runs.
//
// Every mutating operation checks all of its preconditions, including fund
// availability on the ledger, before its first write. A rejected call leaves
// state, ledger and event buffer exactly as they were.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use moderntensor_core::{
    Address, Clock, EconomicParams, FeeReason, Ledger, LedgerError, RegistryError, RegistryEvent,
};
use moderntensor_economics::{FeeSplit, Treasury};

use crate::nodes::NodeRegistry;
use crate::permits::PermitBook;
use crate::subnets::SubnetDirectory;

/// Persisted registry state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkState {
    /// Administrator account; also the custodian of fees, bonds and reward funds.
    pub admin: Address,
    pub params: EconomicParams,
    pub treasury: Treasury,
    pub subnets: SubnetDirectory,
    pub registry: NodeRegistry,
    pub permits: PermitBook,
}

impl NetworkState {
    /// Empty state administered by `admin`.
    pub fn new(admin: Address, params: EconomicParams) -> Self {
        Self {
            admin,
            params,
            treasury: Treasury::new(),
            subnets: SubnetDirectory::new(),
            registry: NodeRegistry::new(),
            permits: PermitBook::new(),
        }
    }
}

/// The registry engine.
pub struct Network {
    pub(crate) state: NetworkState,
    pub(crate) ledger: Box<dyn Ledger>,
    clock: Arc<dyn Clock>,
    events: Vec<RegistryEvent>,
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("state", &self.state)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

impl Network {
    /// Initialize a fresh network administered by `admin`.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidParams` if `params` fail validation.
    pub fn initialize(
        admin: Address,
        params: EconomicParams,
        ledger: Box<dyn Ledger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        params.validate()?;
        let network = Self {
            state: NetworkState::new(admin, params),
            ledger,
            clock,
            events: Vec::new(),
        };
        tracing::info!("Network initialized: admin={}", admin);
        Ok(network)
    }

    /// Resume from a previously persisted state.
    ///
    /// # Errors
    /// Returns `RegistryError::InvalidParams` if the stored parameters fail validation.
    pub fn from_state(
        state: NetworkState,
        ledger: Box<dyn Ledger>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RegistryError> {
        state.params.validate()?;
        tracing::info!(
            "Network restored: admin={} subnets={} validators={} miners={}",
            state.admin,
            state.subnets.len(),
            state.registry.validators.len(),
            state.registry.miners.len()
        );
        Ok(Self {
            state,
            ledger,
            clock,
            events: Vec::new(),
        })
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn admin(&self) -> Address {
        self.state.admin
    }

    pub fn params(&self) -> &EconomicParams {
        &self.state.params
    }

    pub fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Current time from the injected clock.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Take every event buffered since the last drain.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events buffered since the last drain.
    pub fn pending_events(&self) -> &[RegistryEvent] {
        &self.events
    }

    /// Run `op`, discarding any events it buffered if it fails.
    pub fn transact<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, RegistryError>,
    ) -> Result<R, RegistryError> {
        let mark = self.events.len();
        let result = op(self);
        if result.is_err() {
            self.events.truncate(mark);
        }
        result
    }

    // -----------------------------------------------------------------------
    // Administrative operations
    // -----------------------------------------------------------------------

    /// Replace the economic parameters.
    ///
    /// # Errors
    /// `NotAdmin` for any other signer; `InvalidParams` if `params` fail validation.
    pub fn update_global_params(
        &mut self,
        signer: &Address,
        params: EconomicParams,
    ) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        params.validate()?;

        let now = self.now();
        self.state.params = params;
        self.state.registry.last_update = now;
        self.emit(RegistryEvent::ParamsUpdated { timestamp: now });
        tracing::info!("Economic parameters updated");
        Ok(())
    }

    pub fn emergency_pause(&mut self, signer: &Address) -> Result<(), RegistryError> {
        self.emergency_action(signer, true)
    }

    pub fn emergency_unpause(&mut self, signer: &Address) -> Result<(), RegistryError> {
        self.emergency_action(signer, false)
    }

    /// Pausing only records the action; no operation is gated on it.
    fn emergency_action(&mut self, signer: &Address, paused: bool) -> Result<(), RegistryError> {
        self.ensure_admin(signer)?;
        let now = self.now();
        self.state.registry.last_update = now;
        self.emit(RegistryEvent::EmergencyAction {
            paused,
            timestamp: now,
        });
        tracing::warn!("Emergency action recorded: paused={}", paused);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Helpers shared by the operation modules
    // -----------------------------------------------------------------------

    pub(crate) fn emit(&mut self, event: RegistryEvent) {
        self.events.push(event);
    }

    pub(crate) fn ensure_admin(&self, signer: &Address) -> Result<(), RegistryError> {
        if *signer == self.state.admin {
            Ok(())
        } else {
            Err(RegistryError::NotAdmin)
        }
    }

    /// Whether `payer` can cover `required`, failing with `err` otherwise.
    ///
    /// Amounts paid by the administrator stay in custody, so the
    /// administrator always passes.
    pub(crate) fn ensure_funds(
        &self,
        payer: &Address,
        required: u64,
        err: RegistryError,
    ) -> Result<(), RegistryError> {
        if *payer == self.state.admin || self.ledger.balance(payer) >= required {
            Ok(())
        } else {
            Err(err)
        }
    }

    /// Whether custody holds `required` for an outgoing payment.
    pub(crate) fn ensure_custody(&self, required: u64) -> Result<(), RegistryError> {
        let available = self.ledger.balance(&self.state.admin);
        if available >= required {
            Ok(())
        } else {
            Err(LedgerError::InsufficientBalance {
                address: self.state.admin,
                required,
                available,
            }
            .into())
        }
    }

    /// Charge a fee into custody, split it, and emit the burn event.
    pub(crate) fn charge_fee(
        &mut self,
        payer: &Address,
        amount: u64,
        reason: FeeReason,
        now: u64,
    ) -> Result<FeeSplit, RegistryError> {
        let admin = self.state.admin;
        let burn_percentage = self.state.params.burn_percentage;
        let split = self.state.treasury.process_fee(
            self.ledger.as_mut(),
            payer,
            &admin,
            amount,
            burn_percentage,
            reason,
            now,
        )?;
        self.emit(RegistryEvent::FeeBurned {
            payer: *payer,
            reason,
            amount,
            burn_amount: split.burn_amount,
            treasury_amount: split.treasury_amount,
            timestamp: now,
        });
        Ok(split)
    }
}
