//! # OrderStore — Durable Order Mapping with Atomic Compare-and-Set
//!
//! The only shared mutable state in the service. Two layers:
//!
//! - an in-memory index ([`Store`]) for fast reads and for the
//!   single-process deployment mode, and
//! - optional PostgreSQL persistence, hydrated into the index on startup.
//!
//! The load-bearing operation is [`OrderStore::transition`]: it advances
//! an order only if its current state matches the expectation, applying
//! the mutation in the same atomic step. With a database configured the
//! atomic step is a conditional `UPDATE … WHERE state = $expected` in the
//! backing store — a real per-key compare-and-set that holds across
//! process restarts and multiple server instances. Without one, the
//! in-memory closure under a single write lock provides the same
//! guarantee within the process. This primitive — not any caller-side
//! check — is what makes duplicate or concurrent payment notifications
//! settle as no-ops instead of double notarizations.

use sqlx::PgPool;
use thiserror::Error;

use notelock_core::OrderId;
use notelock_state::{Order, OrderError, OrderState};

use crate::db;
use crate::state::Store;

/// Result of a compare-and-set transition attempt.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// This caller won: the order advanced and this is its new value.
    Applied(Order),
    /// The order was not in the expected state. Carries the actual state;
    /// for the notification path this means a duplicate/replayed delivery.
    StateMismatch(OrderState),
    /// No order exists under that identifier.
    NotFound,
}

/// Errors from order store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An order with this identifier already exists.
    #[error("order {0} already exists")]
    Duplicate(OrderId),

    /// Database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The mutation violated the state machine. Indicates a caller bug:
    /// the expected-state guard already matched when the mutation ran.
    #[error("transition rejected: {0}")]
    Transition(#[from] OrderError),
}

/// Durable mapping from order identifier to order record.
#[derive(Debug, Clone)]
pub struct OrderStore {
    mem: Store<Order>,
    pool: Option<PgPool>,
}

impl OrderStore {
    /// Create a store backed only by process memory.
    pub fn in_memory() -> Self {
        Self {
            mem: Store::new(),
            pool: None,
        }
    }

    /// Create a store with optional database persistence.
    pub fn new(pool: Option<PgPool>) -> Self {
        Self {
            mem: Store::new(),
            pool,
        }
    }

    /// Hydrate the in-memory index from the database. Called once on
    /// startup; a no-op without a pool. Returns the number of orders
    /// loaded.
    pub async fn hydrate(&self) -> Result<usize, StoreError> {
        let Some(pool) = &self.pool else {
            return Ok(0);
        };
        let orders = db::orders::load_all(pool).await?;
        let count = orders.len();
        for order in orders {
            self.mem.insert(order.id.clone(), order);
        }
        Ok(count)
    }

    /// Persist a newly created order. Rejects duplicates.
    pub async fn insert(&self, order: Order) -> Result<(), StoreError> {
        if let Some(pool) = &self.pool {
            match db::orders::insert(pool, &order).await {
                Ok(()) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(StoreError::Duplicate(order.id));
                }
                Err(e) => return Err(e.into()),
            }
            self.mem.insert(order.id.clone(), order);
            Ok(())
        } else if self.mem.insert_if_absent(order.id.clone(), order.clone()) {
            Ok(())
        } else {
            Err(StoreError::Duplicate(order.id))
        }
    }

    /// Fetch an order. Reads the database when configured (another
    /// instance may have advanced the order), the in-memory index
    /// otherwise.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, StoreError> {
        if let Some(pool) = &self.pool {
            let order = db::orders::fetch(pool, id).await?;
            // Keep the index warm for this instance.
            if let Some(order) = &order {
                self.mem.insert(order.id.clone(), order.clone());
            }
            Ok(order)
        } else {
            Ok(self.mem.get(id))
        }
    }

    /// Atomically transition an order: advance it only if its current
    /// state equals `expected`, applying `apply` in the same step.
    ///
    /// `apply` must move the order out of `expected` via the state
    /// machine's own transition methods; a mutation that leaves the state
    /// untouched or violates the matrix is a caller bug and surfaces as
    /// [`StoreError::Transition`].
    pub async fn transition(
        &self,
        id: &OrderId,
        expected: OrderState,
        apply: impl FnOnce(&mut Order) -> Result<(), OrderError>,
    ) -> Result<TransitionOutcome, StoreError> {
        match &self.pool {
            Some(pool) => self.transition_db(pool, id, expected, apply).await,
            None => self.transition_mem(id, expected, apply),
        }
    }

    /// Database-backed compare-and-set: compute the successor record, then
    /// apply it with a conditional UPDATE. A lost race shows up as zero
    /// rows affected and is reported as a mismatch with the fresh state.
    async fn transition_db(
        &self,
        pool: &PgPool,
        id: &OrderId,
        expected: OrderState,
        apply: impl FnOnce(&mut Order) -> Result<(), OrderError>,
    ) -> Result<TransitionOutcome, StoreError> {
        let Some(current) = db::orders::fetch(pool, id).await? else {
            return Ok(TransitionOutcome::NotFound);
        };
        if current.state != expected {
            return Ok(TransitionOutcome::StateMismatch(current.state));
        }

        let mut candidate = current;
        apply(&mut candidate)?;

        if db::orders::update_if_state(pool, id, expected, &candidate).await? {
            self.mem.insert(candidate.id.clone(), candidate.clone());
            return Ok(TransitionOutcome::Applied(candidate));
        }

        // Lost the race: someone else moved the order between our read and
        // our conditional write. Report what it is now.
        match db::orders::fetch(pool, id).await? {
            Some(fresh) => {
                self.mem.insert(fresh.id.clone(), fresh.clone());
                Ok(TransitionOutcome::StateMismatch(fresh.state))
            }
            None => Ok(TransitionOutcome::NotFound),
        }
    }

    /// In-memory compare-and-set: the guard, the mutation, and the
    /// publication all happen under one write lock.
    fn transition_mem(
        &self,
        id: &OrderId,
        expected: OrderState,
        apply: impl FnOnce(&mut Order) -> Result<(), OrderError>,
    ) -> Result<TransitionOutcome, StoreError> {
        enum Abort {
            Mismatch(OrderState),
            Rejected(OrderError),
        }

        let result = self.mem.try_update(id, |order| {
            if order.state != expected {
                return Err(Abort::Mismatch(order.state));
            }
            // Mutate a candidate so a rejected transition leaves the
            // stored record untouched.
            let mut candidate = order.clone();
            apply(&mut candidate).map_err(Abort::Rejected)?;
            *order = candidate.clone();
            Ok(candidate)
        });

        match result {
            None => Ok(TransitionOutcome::NotFound),
            Some(Ok(order)) => Ok(TransitionOutcome::Applied(order)),
            Some(Err(Abort::Mismatch(state))) => Ok(TransitionOutcome::StateMismatch(state)),
            Some(Err(Abort::Rejected(e))) => Err(StoreError::Transition(e)),
        }
    }
}

/// Whether a sqlx error is a primary-key/unique-constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|e| e.is_unique_violation())
        .unwrap_or(false)
}
