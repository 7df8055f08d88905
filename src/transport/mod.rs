//! The `transport` module is the seam between the delivery loops and the
//! wire protocol.
//!
//! The loops only see the three traits below. `amqp` implements them on top
//! of `lapin`; tests use the in-memory `mock` broker instead.

pub mod amqp;
pub mod message;

#[cfg(test)]
pub mod mock;


use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::broker::BrokerNode;
use crate::broker::topology::{ExchangeDeclaration, QueueBinding, QueueDeclaration};
use crate::config::{Credentials, Timings};
use crate::utils::Result;

pub use message::{Envelope, Publication};

/// Deliveries of an active subscription, in broker order. An `Err` item or
/// the end of the stream both mean the subscription is gone.
pub type Deliveries = BoxStream<'static, Result<Envelope>>;

/// Opens connections to a single node.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: BrokerConnection;

    async fn connect(
        &self,
        node: &BrokerNode,
        credentials: &Credentials,
        timings: &Timings,
    ) -> Result<Self::Connection>;
}

#[async_trait]
pub trait BrokerConnection: Send + Sync {
    type Channel: BrokerChannel;

    async fn open_channel(&self) -> Result<Self::Channel>;

    fn is_connected(&self) -> bool;

    /// Best-effort close. Errors are swallowed since the handle is being
    /// discarded anyway.
    async fn close(&self);
}

#[async_trait]
pub trait BrokerChannel: Send + Sync {
    async fn declare_exchange(&self, exchange: &ExchangeDeclaration) -> Result<()>;

    async fn declare_queue(&self, queue: &QueueDeclaration) -> Result<()>;

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<()>;

    /// Caps unacknowledged deliveries pushed to this channel.
    async fn set_prefetch(&self, count: u16) -> Result<()>;

    async fn publish(&self, publication: &Publication) -> Result<()>;

    async fn subscribe(&self, queue: &str, consumer_tag: &str) -> Result<Deliveries>;

    async fn ack(&self, delivery_tag: u64) -> Result<()>;
}
