//! Promotion Snapshot
//!
//! The in-memory view of every stored promotion, replaced wholesale. Each fetch takes a
//! ticket before it starts; when results arrive, only a ticket newer than the one behind
//! the current snapshot may replace it. Slower, older fetches are discarded on arrival
//! rather than cancelled.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use carta::{ids::PromotionId, promotions::Promotion};
use tokio::sync::watch;
use tracing::debug;

use crate::store::{PersistenceError, PromotionStore};

/// Promotions as of one fetch.
#[derive(Debug, Default)]
pub struct PromotionSnapshot {
    sequence: u64,
    promotions: Vec<Promotion<'static>>,
}

impl PromotionSnapshot {
    /// Ticket sequence of the fetch that produced this snapshot; 0 before the first fetch.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Every promotion, in store order.
    pub fn promotions(&self) -> &[Promotion<'static>] {
        &self.promotions
    }

    /// Find a promotion by id.
    pub fn find(&self, id: PromotionId) -> Option<&Promotion<'static>> {
        self.promotions.iter().find(|promotion| promotion.id() == id)
    }
}

/// Ticket taken before a fetch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    /// Position of the fetch in issue order.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Owns the current promotion snapshot and decides which fetch results may replace it.
#[derive(Debug)]
pub struct SnapshotCoordinator {
    snapshot_tx: watch::Sender<Arc<PromotionSnapshot>>,
    next_ticket: AtomicU64,
}

impl Default for SnapshotCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCoordinator {
    /// Create a coordinator holding an empty snapshot.
    pub fn new() -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(Arc::new(PromotionSnapshot::default()));

        Self {
            snapshot_tx,
            next_ticket: AtomicU64::new(0),
        }
    }

    /// Current snapshot.
    pub fn current(&self) -> Arc<PromotionSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    /// Receiver notified whenever a snapshot is applied.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PromotionSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Take a ticket for a fetch about to start.
    pub fn ticket(&self) -> FetchTicket {
        FetchTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Offer the result of the fetch behind `ticket`.
    ///
    /// Returns `true` if it replaced the snapshot, `false` if a newer fetch already had.
    pub fn apply(&self, ticket: FetchTicket, promotions: Vec<Promotion<'static>>) -> bool {
        let count = promotions.len();

        self.snapshot_tx.send_if_modified(|current| {
            if ticket.0 <= current.sequence {
                debug!(
                    ticket = ticket.0,
                    current = current.sequence,
                    "discarded stale promotion fetch"
                );

                return false;
            }

            *current = Arc::new(PromotionSnapshot {
                sequence: ticket.0,
                promotions,
            });

            debug!(ticket = ticket.0, promotion_count = count, "applied promotion snapshot");

            true
        })
    }

    /// Fetch every promotion from `store` and apply the result under a fresh ticket.
    ///
    /// Returns the snapshot current once the fetch has been applied or discarded.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the current snapshot is left untouched.
    pub async fn refresh(
        &self,
        store: &dyn PromotionStore,
    ) -> Result<Arc<PromotionSnapshot>, PersistenceError> {
        let ticket = self.ticket();
        let promotions = store.list().await?;

        self.apply(ticket, promotions);

        Ok(self.current())
    }
}
