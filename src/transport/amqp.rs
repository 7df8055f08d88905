//! AMQP 0-9-1 transport backed by `lapin`.
//!
//! `lapin` errors are mapped onto the crate taxonomy by call site: failures
//! while connecting become `ConnectFailure`, failures while declaring become
//! `Topology`, and anything that breaks during publish, consume or ack is
//! `ConnectionLost`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicPublishOptions, BasicQosOptions,
    ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::{AMQPValue, FieldTable};
use lapin::uri::AMQPUri;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::broker::BrokerNode;
use crate::broker::topology::{ExchangeDeclaration, ExchangeKind, QueueBinding, QueueDeclaration};
use crate::config::{Credentials, Timings};
use crate::transport::{
    BrokerChannel, BrokerConnection, Connector, Deliveries, Envelope, Publication,
};
use crate::utils::{Error, Result};

const QUEUE_TYPE_ARGUMENT: &str = "x-queue-type";
const PERSISTENT_DELIVERY_MODE: u8 = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct AmqpConnector;

pub struct AmqpConnection {
    connection: Connection,
    timings: Timings,
}

pub struct AmqpChannel {
    channel: Channel,
    timings: Timings,
}

/// Builds the connection URI for `node` on the default vhost.
pub fn amqp_uri(node: &BrokerNode, credentials: &Credentials, timings: &Timings) -> AMQPUri {
    let mut uri = AMQPUri::default();
    uri.authority.host = node.host.clone();
    uri.authority.port = node.port;
    uri.authority.userinfo.username = credentials.username.clone();
    uri.authority.userinfo.password = credentials.password.clone();
    uri.vhost = "/".to_string();
    uri.query.connection_timeout = Some(timings.connect_timeout.as_millis() as u64);
    uri
}

/// Declare arguments for a queue, i.e. its `x-queue-type`.
pub fn queue_arguments(queue: &QueueDeclaration) -> FieldTable {
    let mut arguments = FieldTable::default();
    arguments.insert(
        QUEUE_TYPE_ARGUMENT.into(),
        AMQPValue::LongString(queue.queue_type.as_str().into()),
    );
    arguments
}

pub fn publish_properties(publication: &Publication) -> BasicProperties {
    let properties =
        BasicProperties::default().with_content_type(publication.content_type.as_str().into());
    if publication.persistent {
        properties.with_delivery_mode(PERSISTENT_DELIVERY_MODE)
    } else {
        properties
    }
}

fn lost(err: lapin::Error) -> Error {
    Error::ConnectionLost(err.to_string())
}

fn topology(err: lapin::Error) -> Error {
    Error::Topology(err.to_string())
}

/// Runs `op` under `limit`. Expiry is reported through `expired`, so a
/// stalled declare stays a topology error and a stalled ack a lost connection.
pub(crate) async fn bounded<T, F>(
    limit: Duration,
    what: &str,
    expired: fn(String) -> Error,
    op: F,
) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    timeout(limit, op)
        .await
        .unwrap_or_else(|_| Err(expired(format!("{what} timed out after {limit:?}"))))
}

#[async_trait]
impl Connector for AmqpConnector {
    type Connection = AmqpConnection;

    async fn connect(
        &self,
        node: &BrokerNode,
        credentials: &Credentials,
        timings: &Timings,
    ) -> Result<AmqpConnection> {
        let uri = amqp_uri(node, credentials, timings);
        let connection = Connection::connect_uri(uri, ConnectionProperties::default())
            .await
            .map_err(|e| Error::ConnectFailure(e.to_string()))?;

        Ok(AmqpConnection {
            connection,
            timings: *timings,
        })
    }
}

#[async_trait]
impl BrokerConnection for AmqpConnection {
    type Channel = AmqpChannel;

    async fn open_channel(&self) -> Result<AmqpChannel> {
        let channel = bounded(self.timings.read_timeout, "channel open", Error::ConnectionLost, async {
            self.connection.create_channel().await.map_err(lost)
        })
        .await?;

        Ok(AmqpChannel {
            channel,
            timings: self.timings,
        })
    }

    fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    async fn close(&self) {
        if !self.is_connected() {
            return;
        }
        if let Err(e) = self.connection.close(200, "closing stale connection").await {
            warn!("Failed to close broker connection cleanly: {e}");
        }
    }
}

#[async_trait]
impl BrokerChannel for AmqpChannel {
    async fn declare_exchange(&self, exchange: &ExchangeDeclaration) -> Result<()> {
        let kind = match exchange.kind {
            ExchangeKind::Direct => lapin::ExchangeKind::Direct,
        };
        let options = ExchangeDeclareOptions {
            durable: exchange.durable,
            ..ExchangeDeclareOptions::default()
        };

        bounded(self.timings.read_timeout, "exchange declare", Error::Topology, async {
            self.channel
                .exchange_declare(&exchange.name, kind, options, FieldTable::default())
                .await
                .map_err(topology)
        })
        .await
    }

    async fn declare_queue(&self, queue: &QueueDeclaration) -> Result<()> {
        let options = QueueDeclareOptions {
            durable: queue.durable,
            ..QueueDeclareOptions::default()
        };

        let declared = bounded(self.timings.read_timeout, "queue declare", Error::Topology, async {
            self.channel
                .queue_declare(&queue.name, options, queue_arguments(queue))
                .await
                .map_err(topology)
        })
        .await?;
        debug!(
            queue = %queue.name,
            messages = declared.message_count(),
            consumers = declared.consumer_count(),
            "queue declared"
        );
        Ok(())
    }

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<()> {
        bounded(self.timings.read_timeout, "queue bind", Error::Topology, async {
            self.channel
                .queue_bind(
                    &binding.queue,
                    &binding.exchange,
                    &binding.routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(topology)
        })
        .await
    }

    async fn set_prefetch(&self, count: u16) -> Result<()> {
        bounded(self.timings.read_timeout, "qos", Error::ConnectionLost, async {
            self.channel
                .basic_qos(count, BasicQosOptions::default())
                .await
                .map_err(lost)
        })
        .await
    }

    async fn publish(&self, publication: &Publication) -> Result<()> {
        bounded(self.timings.write_timeout, "publish", Error::ConnectionLost, async {
            let confirm = self
                .channel
                .basic_publish(
                    &publication.exchange,
                    &publication.routing_key,
                    BasicPublishOptions::default(),
                    &publication.payload,
                    publish_properties(publication),
                )
                .await
                .map_err(lost)?;
            confirm.await.map_err(lost)?;
            Ok(())
        })
        .await
    }

    async fn subscribe(&self, queue: &str, consumer_tag: &str) -> Result<Deliveries> {
        // Only the consume request is bounded; the delivery stream waits indefinitely.
        let consumer = bounded(self.timings.read_timeout, "consume", Error::ConnectionLost, async {
            self.channel
                .basic_consume(
                    queue,
                    consumer_tag,
                    BasicConsumeOptions::default(),
                    FieldTable::default(),
                )
                .await
                .map_err(lost)
        })
        .await?;

        Ok(consumer
            .map(|delivery| {
                delivery
                    .map(|d| {
                        Envelope::new(
                            d.data,
                            d.exchange.as_str(),
                            d.routing_key.as_str(),
                            d.delivery_tag,
                            d.redelivered,
                        )
                    })
                    .map_err(lost)
            })
            .boxed())
    }

    async fn ack(&self, delivery_tag: u64) -> Result<()> {
        bounded(self.timings.write_timeout, "ack", Error::ConnectionLost, async {
            self.channel
                .basic_ack(delivery_tag, BasicAckOptions::default())
                .await
                .map_err(lost)
        })
        .await
    }
}
