// crates/moderntensor-registry/src/test_support.rs
//
// Shared fixtures for the unit tests in this crate.

use std::sync::Arc;

use moderntensor_core::{Address, EconomicParams, ManualClock, SubnetId, SubnetParams};
use moderntensor_economics::{InMemoryLedger, OCTAS_PER_TOKEN};

use crate::network::Network;
use crate::registration::{MinerRegistration, ValidatorRegistration};

pub const GENESIS_TIME: u64 = 1_700_000_000;

/// Starting balance of the admin and of every `user(1..=20)`.
pub const FUNDING: u64 = 100 * OCTAS_PER_TOKEN;

pub fn admin() -> Address {
    Address::repeat_byte(0xaa)
}

pub fn user(n: u8) -> Address {
    Address::repeat_byte(n)
}

/// A network with default parameters, a funded admin and users 1 through 20.
pub fn fixture() -> (Arc<ManualClock>, Network) {
    let clock = Arc::new(ManualClock::new(GENESIS_TIME));
    let balances = std::iter::once((admin(), FUNDING)).chain((1..=20).map(|n| (user(n), FUNDING)));
    let ledger = InMemoryLedger::with_balances(balances);
    let network = Network::initialize(
        admin(),
        EconomicParams::default(),
        Box::new(ledger),
        clock.clone(),
    )
    .unwrap();
    (clock, network)
}

pub fn subnet_params(max_validators: u64, max_miners: u64) -> SubnetParams {
    SubnetParams {
        name: "test".to_string(),
        description: "test subnet".to_string(),
        max_validators,
        max_miners,
        min_stake_validator: 1_000_000,
        min_stake_miner: 1_000_000,
        validator_permits_required: false,
    }
}

pub fn miner_req(subnet_id: SubnetId, stake: u64) -> MinerRegistration {
    MinerRegistration {
        uid: format!("miner-{}-{}", subnet_id, stake).into_bytes(),
        subnet_id,
        stake,
        wallet_hash: Vec::new(),
        api_endpoint: b"http://node:8080".to_vec(),
    }
}

pub fn validator_req(subnet_id: SubnetId, stake: u64, bond: u64) -> ValidatorRegistration {
    ValidatorRegistration {
        uid: format!("validator-{}-{}", subnet_id, stake).into_bytes(),
        subnet_id,
        stake,
        bond,
        wallet_hash: Vec::new(),
        api_endpoint: b"http://node:9090".to_vec(),
    }
}
