//! Consumer loop: subscribe and handle deliveries one at a time.
//!
//! Each cycle acquires a session (if needed), subscribes to the queue and
//! drains deliveries until the subscription errors or ends. A delivery is
//! logged, acked and followed by the processing delay before the next one is
//! pulled, so there is never more than one in flight.

use futures_util::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::broker::topology::QUEUE_NAME;
use crate::broker::{ConnectionManager, Role};
use crate::client::message::{ReceivedRequest, or_placeholder};
use crate::client::recovery::{Recovery, recover};
use crate::client::session::SessionSlot;
use crate::transport::{BrokerChannel, Connector, Envelope};
use crate::utils::{Context, Error, Result};

pub struct Consumer<K: Connector> {
    connections: ConnectionManager<K>,
    session: SessionSlot<K::Connection>,
    ctx: Context,
    consumer_tag: String,
}

impl<K: Connector> Consumer<K> {
    pub fn new(connections: ConnectionManager<K>, ctx: Context) -> Self {
        Self {
            connections,
            session: SessionSlot::new(),
            ctx,
            consumer_tag: format!("consumer-{}", Uuid::new_v4()),
        }
    }

    pub fn consumer_tag(&self) -> &str {
        &self.consumer_tag
    }

    pub fn current_node(&self) -> &str {
        self.session.node_name()
    }

    /// Runs until the process is killed.
    pub async fn run(&mut self) {
        self.ctx.log("Consumer started");
        loop {
            self.cycle().await;
        }
    }

    /// One acquire → bind → subscribe pass, ending with recovery from
    /// whatever stopped the subscription.
    pub async fn cycle(&mut self) -> (Error, Recovery) {
        let err = match self.drain().await {
            Ok(()) => Error::ConnectionLost("subscription cancelled by broker".to_string()),
            Err(err) => err,
        };
        let recovery = recover(&mut self.session, &err, &self.ctx).await;
        (err, recovery)
    }

    async fn drain(&mut self) -> Result<()> {
        let (session, fresh) = self
            .session
            .ensure(&self.connections, Role::Consumer, &self.ctx)
            .await?;
        let node = session.node.identity().to_string();
        if fresh {
            self.ctx.log(format!("Consumer connected to node: {node}"));
        }

        let mut deliveries = session
            .channel
            .subscribe(QUEUE_NAME, &self.consumer_tag)
            .await?;

        while let Some(delivery) = deliveries.next().await {
            handle_delivery(&session.channel, delivery?, &node, &self.ctx).await?;
        }
        Ok(())
    }
}

/// Logs one delivery, acknowledges it, then waits out the processing delay.
///
/// A body that cannot be parsed is still logged (with `N/A` fields) and
/// acked; only a failed ack is an error.
pub async fn handle_delivery<Ch: BrokerChannel + ?Sized>(
    channel: &Ch,
    envelope: Envelope,
    node: &str,
    ctx: &Context,
) -> Result<()> {
    let request = ReceivedRequest::parse(&envelope.body).unwrap_or_else(|err| {
        warn!(delivery_tag = envelope.delivery_tag, "{err}");
        ReceivedRequest::default()
    });
    if envelope.redelivered {
        debug!(delivery_tag = envelope.delivery_tag, "redelivered message");
    }

    ctx.log(format!(
        "Received message #{} | Node: {} | Action: {} | MSISDN: {} | Original timestamp: {} | Exchange: {} | Routing Key: {}",
        or_placeholder(&request.number),
        node,
        or_placeholder(&request.action),
        or_placeholder(&request.msisdn),
        or_placeholder(&request.timestamp),
        envelope.exchange_or_default(),
        envelope.routing_key_or_default(),
    ));

    channel.ack(envelope.delivery_tag).await?;
    tokio::time::sleep(ctx.timings.processing_delay).await;
    Ok(())
}
