//! Live WebSocket subscriptions
//!
//! Each connection holds at most one pool. The registry is the only shared
//! mutable state in the relay; it is a sharded concurrent map so socket tasks
//! and the broadcaster never contend on a global lock.

use dashmap::DashMap;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use types::ids::{ConnectionId, PoolAddress};

/// Per-connection outbound queue depth. Ticks beyond this are dropped for
/// that connection only.
pub const OUTBOX_CAPACITY: usize = 32;

/// Serialized frames waiting to be written to one socket.
pub type Outbox = mpsc::Sender<String>;

#[derive(Debug, Clone)]
pub struct Subscriber {
    /// `None` until the client sends a valid subscribe message
    pub pool: Option<PoolAddress>,
    pub outbox: Outbox,
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    clients: DashMap<ConnectionId, Subscriber>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly accepted connection (no subscription yet).
    pub fn register(&self, outbox: Outbox) -> ConnectionId {
        let id = ConnectionId::new();
        self.clients.insert(id, Subscriber { pool: None, outbox });
        id
    }

    /// Point a connection at `pool`, replacing any previous subscription.
    ///
    /// Returns the pool it was subscribed to before, or `None`. Unknown
    /// connections are ignored.
    pub fn subscribe(&self, id: ConnectionId, pool: PoolAddress) -> Option<PoolAddress> {
        self.clients
            .get_mut(&id)
            .and_then(|mut client| client.pool.replace(pool))
    }

    /// Forget a connection. After this the broadcaster no longer reads on its
    /// behalf.
    pub fn disconnect(&self, id: ConnectionId) -> Option<Subscriber> {
        self.clients.remove(&id).map(|(_, subscriber)| subscriber)
    }

    /// Snapshot of subscribed connections grouped by pool.
    pub fn by_pool(&self) -> BTreeMap<PoolAddress, Vec<(ConnectionId, Outbox)>> {
        let mut groups: BTreeMap<PoolAddress, Vec<(ConnectionId, Outbox)>> = BTreeMap::new();
        for entry in self.clients.iter() {
            if let Some(pool) = &entry.pool {
                groups
                    .entry(pool.clone())
                    .or_default()
                    .push((*entry.key(), entry.outbox.clone()));
            }
        }
        groups
    }

    /// Connections currently holding a subscription.
    pub fn subscribed_count(&self) -> usize {
        self.clients.iter().filter(|c| c.pool.is_some()).count()
    }

    pub fn connection_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: u8) -> PoolAddress {
        PoolAddress::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn outbox() -> (Outbox, mpsc::Receiver<String>) {
        mpsc::channel(OUTBOX_CAPACITY)
    }

    #[test]
    fn test_register_starts_unsubscribed() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = outbox();
        reg.register(tx);

        assert_eq!(reg.connection_count(), 1);
        assert_eq!(reg.subscribed_count(), 0);
        assert!(reg.by_pool().is_empty());
    }

    #[test]
    fn test_subscribe_overwrites_previous_pool() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = outbox();
        let id = reg.register(tx);

        assert_eq!(reg.subscribe(id, pool(1)), None);
        assert_eq!(reg.subscribe(id, pool(2)), Some(pool(1)));

        let groups = reg.by_pool();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&pool(2)][0].0, id);
    }

    #[test]
    fn test_subscribe_unknown_connection_is_noop() {
        let reg = SubscriptionRegistry::new();
        assert!(reg.subscribe(ConnectionId::new(), pool(1)).is_none());
        assert_eq!(reg.connection_count(), 0);
    }

    #[test]
    fn test_by_pool_groups_connections() {
        let reg = SubscriptionRegistry::new();
        let (a, _ra) = outbox();
        let (b, _rb) = outbox();
        let (c, _rc) = outbox();
        let id_a = reg.register(a);
        let id_b = reg.register(b);
        let id_c = reg.register(c);
        reg.subscribe(id_a, pool(1));
        reg.subscribe(id_b, pool(1));
        reg.subscribe(id_c, pool(2));

        let groups = reg.by_pool();
        assert_eq!(groups[&pool(1)].len(), 2);
        assert_eq!(groups[&pool(2)].len(), 1);
        assert_eq!(reg.subscribed_count(), 3);
    }

    #[test]
    fn test_disconnect_removes_subscription() {
        let reg = SubscriptionRegistry::new();
        let (tx, _rx) = outbox();
        let id = reg.register(tx);
        reg.subscribe(id, pool(1));

        let removed = reg.disconnect(id).unwrap();
        assert_eq!(removed.pool, Some(pool(1)));
        assert_eq!(reg.connection_count(), 0);
        assert!(reg.by_pool().is_empty());
    }
}
