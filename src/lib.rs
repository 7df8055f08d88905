//! # quorum-relay
//!
//! `quorum-relay` is a producer/consumer pair that exchanges JSON requests
//! through a clustered RabbitMQ deployment backed by a quorum queue. Either
//! side survives the loss of individual broker nodes by failing over across
//! an ordered node list.
//!
//! ## Core Modules
//!
//! - `broker`: node list parsing, ordered failover, and topology declaration.
//! - `client`: the producer and consumer loops, their session state and failure recovery.
//! - `config`: loads settings from `config/default` and the environment.
//! - `persistence`: the per-role journal file every state transition is written to.
//! - `transport`: the broker client seam and its `lapin` implementation.
//! - `utils`: shared error type, tracing setup, clock and loop context.

pub mod broker;
pub mod client;
pub mod config;
pub mod persistence;
pub mod transport;
pub mod utils;
