//! Broadcast hub for the live feed channel.
//!
//! Maintains the set of live subscriber connections and pushes the most
//! recent summaries to all of them on a fixed interval (or immediately via
//! [`BroadcastHub::push_now`]). Delivery is best-effort and independent
//! per connection: a closed channel drops that connection from the
//! registry, a full buffer skips the client for this cycle, and neither
//! affects delivery to anyone else or aborts the cycle.
//!
//! Clients may register a `subscribe` preference; the hub records and
//! acknowledges it, but delivery stays broadcast-to-all (see DESIGN.md).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use pulsefeed_types::live::{FeedPrefs, LiveEvent};

use crate::store::SummaryStore;

/// How often the hub polls the store and pushes to subscribers.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How many of the most recent summaries each push carries.
const FEED_WINDOW: usize = 50;

/// Per-connection outbound buffer before a slow client gets skipped.
const CONNECTION_BUFFER: usize = 32;

struct Connection {
    sender: mpsc::Sender<LiveEvent>,
    prefs: Option<FeedPrefs>,
}

/// Registry of live connections plus the periodic push driver.
pub struct BroadcastHub<S> {
    store: Arc<S>,
    connections: DashMap<Uuid, Connection>,
    shutdown: CancellationToken,
}

impl<S: SummaryStore + 'static> BroadcastHub<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            connections: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Register a new live connection. The returned receiver yields every
    /// event pushed to this connection until it is unregistered or dropped
    /// as unreachable.
    pub fn register(&self) -> (Uuid, mpsc::Receiver<LiveEvent>) {
        let (sender, receiver) = mpsc::channel(CONNECTION_BUFFER);
        let id = Uuid::now_v7();
        self.connections.insert(
            id,
            Connection {
                sender,
                prefs: None,
            },
        );
        debug!(connection = %id, total = self.connections.len(), "live connection registered");
        (id, receiver)
    }

    /// Remove a connection (protocol-level disconnect).
    pub fn unregister(&self, id: &Uuid) {
        if self.connections.remove(id).is_some() {
            debug!(connection = %id, total = self.connections.len(), "live connection removed");
        }
    }

    /// Record a subscription preference for a connection. Returns false if
    /// the connection is no longer registered.
    pub fn record_subscription(&self, id: &Uuid, prefs: FeedPrefs) -> bool {
        match self.connections.get_mut(id) {
            Some(mut connection) => {
                connection.prefs = Some(prefs);
                true
            }
            None => false,
        }
    }

    /// Number of currently registered connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Force one out-of-band update cycle.
    pub async fn push_now(&self) {
        self.broadcast_cycle().await;
    }

    /// Query the store and push a `feedUpdate` to every connection.
    async fn broadcast_cycle(&self) {
        let recent = match self.store.recent(FEED_WINDOW).await {
            Ok(recent) => recent,
            Err(err) => {
                warn!(error = %err, "feed update skipped: store query failed");
                return;
            }
        };
        let event = LiveEvent::FeedUpdate(recent);

        // Collect unreachable connections first; removing while iterating
        // would deadlock on the shard lock.
        let mut closed = Vec::new();
        for connection in self.connections.iter() {
            match connection.sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    debug!(connection = %connection.key(), "slow live client, skipping this cycle");
                }
                Err(TrySendError::Closed(_)) => closed.push(*connection.key()),
            }
        }
        for id in closed {
            self.connections.remove(&id);
            debug!(connection = %id, "live connection dropped (send failed)");
        }
    }

    /// Spawn the periodic push driver. The task runs until
    /// [`BroadcastHub::shutdown`] is called.
    pub fn spawn_poller(self: &Arc<Self>) -> JoinHandle<()> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(POLL_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = hub.shutdown.cancelled() => break,
                    _ = ticker.tick() => hub.broadcast_cycle().await,
                }
            }
            debug!("live feed poller stopped");
        })
    }

    /// Stop the periodic driver.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SummaryFilter;
    use chrono::Utc;
    use pulsefeed_types::error::StoreError;
    use pulsefeed_types::feed::TimeRange;
    use pulsefeed_types::summary::{SourceCount, Summary};

    struct StubStore {
        summaries: Vec<Summary>,
        fail: bool,
    }

    impl SummaryStore for StubStore {
        async fn search(&self, _needle: &str, _limit: usize) -> Result<Vec<Summary>, StoreError> {
            Ok(Vec::new())
        }

        async fn query(&self, _filter: &SummaryFilter) -> Result<Vec<Summary>, StoreError> {
            Ok(self.summaries.clone())
        }

        async fn count(&self, _filter: &SummaryFilter) -> Result<u64, StoreError> {
            Ok(self.summaries.len() as u64)
        }

        async fn recent(&self, limit: usize) -> Result<Vec<Summary>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("stub down".to_string()));
            }
            Ok(self.summaries.iter().take(limit).cloned().collect())
        }

        async fn source_counts(&self) -> Result<Vec<SourceCount>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn hub_with(summaries: Vec<Summary>) -> Arc<BroadcastHub<StubStore>> {
        Arc::new(BroadcastHub::new(Arc::new(StubStore {
            summaries,
            fail: false,
        })))
    }

    fn summary(source: &str) -> Summary {
        Summary {
            id: Uuid::now_v7(),
            source: source.to_string(),
            url: format!("https://example.com/{}", Uuid::now_v7()),
            title: "Title".to_string(),
            body: "Body".to_string(),
            engagement: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn one_cycle_delivers_the_same_payload_to_every_connection() {
        let hub = hub_with(vec![summary("reddit")]);
        let (_id1, mut rx1) = hub.register();
        let (_id2, mut rx2) = hub.register();
        let (_id3, mut rx3) = hub.register();

        hub.push_now().await;

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        let e3 = rx3.recv().await.unwrap();
        assert_eq!(e1, e2);
        assert_eq!(e2, e3);
        assert!(matches!(e1, LiveEvent::FeedUpdate(ref data) if data.len() == 1));

        // Exactly one event per connection per cycle.
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregistered_connection_misses_the_cycle() {
        let hub = hub_with(vec![summary("reddit")]);
        let (id1, mut rx1) = hub.register();
        let (_id2, mut rx2) = hub.register();

        hub.unregister(&id1);
        hub.push_now().await;

        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn closed_receiver_is_dropped_without_affecting_others() {
        let hub = hub_with(vec![summary("reddit")]);
        let (_id1, rx1) = hub.register();
        let (_id2, mut rx2) = hub.register();
        drop(rx1);

        hub.push_now().await;

        assert_eq!(hub.connection_count(), 1);
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn store_failure_skips_the_cycle_quietly() {
        let hub = Arc::new(BroadcastHub::new(Arc::new(StubStore {
            summaries: Vec::new(),
            fail: true,
        })));
        let (_id, mut rx) = hub.register();

        hub.push_now().await;

        assert!(rx.try_recv().is_err());
        assert_eq!(hub.connection_count(), 1);
    }

    #[tokio::test]
    async fn subscription_is_recorded_and_acknowledgeable() {
        let hub = hub_with(Vec::new());
        let (id, _rx) = hub.register();

        let prefs = FeedPrefs {
            sources: vec!["reddit".to_string()],
            time_range: TimeRange::Day,
        };
        assert!(hub.record_subscription(&id, prefs));

        hub.unregister(&id);
        let prefs = FeedPrefs {
            sources: Vec::new(),
            time_range: TimeRange::All,
        };
        assert!(!hub.record_subscription(&id, prefs));
    }

    #[tokio::test]
    async fn poller_pushes_on_its_own() {
        tokio::time::pause();
        let hub = hub_with(vec![summary("reddit")]);
        let (_id, mut rx) = hub.register();

        let handle = hub.spawn_poller();
        // First tick fires immediately.
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, LiveEvent::FeedUpdate(_)));

        hub.shutdown();
        handle.await.unwrap();
    }
}
