//! Synthetic OMS order and event generator.
//!
//! Produces orders for the orders table, `ORDER_CREATED` events for the
//! event stream, and raw event JSON for the data bucket. Sink traits live in
//! `adapters`; AWS SDK implementations are wired in the `generate_orders`
//! binary.

pub mod adapters;
pub mod config;
pub mod error;
pub mod order;
pub mod runner;
