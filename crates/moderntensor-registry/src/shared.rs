// crates/moderntensor-registry/src/shared.rs
//
// SharedNetwork: the registry as shared state for concurrent tokio tasks.
//
// Every mutation takes the write lock for its whole duration, so calls are
// serialized and each observes the previous call's committed state. Events
// produced by a committed call are published on a broadcast channel after
// the lock is released.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use moderntensor_core::{RegistryError, RegistryEvent};

use crate::call::SignedCall;
use crate::network::Network;

/// Capacity of the event channel. Slow subscribers observe `Lagged`.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Cloneable handle to a `Network` behind `Arc<RwLock<>>`.
#[derive(Clone)]
pub struct SharedNetwork {
    network: Arc<RwLock<Network>>,
    events: broadcast::Sender<RegistryEvent>,
}

impl SharedNetwork {
    pub fn new(network: Network) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            network: Arc::new(RwLock::new(network)),
            events,
        }
    }

    /// Receive every event committed after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }

    /// Run a read-only query against a consistent snapshot.
    pub async fn read<R>(&self, query: impl FnOnce(&Network) -> R) -> R {
        let network = self.network.read().await;
        query(&network)
    }

    /// Run `op` atomically and publish the events it committed.
    pub async fn transact<R>(
        &self,
        op: impl FnOnce(&mut Network) -> Result<R, RegistryError>,
    ) -> Result<R, RegistryError> {
        let (result, events) = {
            let mut network = self.network.write().await;
            let result = network.transact(op);
            (result, network.drain_events())
        };
        self.publish(events);
        result
    }

    /// Execute one signed call.
    pub async fn execute(&self, signed: SignedCall) -> Result<(), RegistryError> {
        let SignedCall { signer, call } = signed;
        self.transact(|network| network.execute(&signer, call)).await
    }

    fn publish(&self, events: Vec<RegistryEvent>) {
        for event in events {
            // No subscribers is not an error.
            let _ = self.events.send(event);
        }
    }
}

impl std::fmt::Debug for SharedNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedNetwork")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
