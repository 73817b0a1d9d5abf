//! # notelock-state — The Payment-Order Lifecycle State Machine
//!
//! Implements the order lifecycle:
//!
//! ```text
//! AWAITING_PAYMENT ──confirm──▶ CONFIRMED ──record──▶ RECORDED
//!                                   │
//!                                  fail
//!                                   │
//!                                   ▼
//!                                FAILED
//! ```
//!
//! `RECORDED` and `FAILED` are terminal. Progression is strictly forward;
//! there are no backward edges, and a rejected charge at creation time
//! persists no order at all (so `FAILED` is reachable only from
//! `CONFIRMED`).
//!
//! States are an exhaustive enum, not strings — an order loaded from
//! storage can only hold one of the four spec-aligned states, and every
//! transition is validated against an explicit matrix at runtime.
//! Transitions append to an immutable audit log with UTC timestamps.

pub mod order;

pub use order::{Order, OrderError, OrderState, TransitionRecord};
