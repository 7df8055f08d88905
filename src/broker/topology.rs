use std::fmt;

use crate::transport::{BrokerChannel, BrokerConnection};
use crate::utils::Result;

pub const QUEUE_NAME: &str = "requests_queue";
pub const EXCHANGE_NAME: &str = "requests_exchange";
pub const ROUTING_KEY: &str = "request";

/// Which side of the exchange this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Producer,
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Consumer => f.write_str("consumer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Direct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueType {
    Classic,
    Quorum,
}

impl QueueType {
    /// Value of the `x-queue-type` declare argument.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::Classic => "classic",
            QueueType::Quorum => "quorum",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDeclaration {
    pub name: String,
    pub kind: ExchangeKind,
    pub durable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDeclaration {
    pub name: String,
    pub durable: bool,
    pub queue_type: QueueType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueBinding {
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
}

/// Everything a role needs declared before messages can flow.
///
/// The consumer only needs the queue. The producer also owns the exchange and
/// the binding that routes `request` messages into the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    pub exchange: Option<ExchangeDeclaration>,
    pub queue: QueueDeclaration,
    pub binding: Option<QueueBinding>,
}

impl Topology {
    pub fn for_role(role: Role) -> Self {
        let queue = QueueDeclaration {
            name: QUEUE_NAME.to_string(),
            durable: true,
            queue_type: QueueType::Quorum,
        };

        match role {
            Role::Consumer => Self {
                exchange: None,
                queue,
                binding: None,
            },
            Role::Producer => Self {
                exchange: Some(ExchangeDeclaration {
                    name: EXCHANGE_NAME.to_string(),
                    kind: ExchangeKind::Direct,
                    durable: true,
                }),
                queue,
                binding: Some(QueueBinding {
                    queue: QUEUE_NAME.to_string(),
                    exchange: EXCHANGE_NAME.to_string(),
                    routing_key: ROUTING_KEY.to_string(),
                }),
            },
        }
    }

    /// Declares exchange, queue and binding in that order. Redeclaring with
    /// identical parameters is a no-op on the broker side.
    pub async fn declare<Ch: BrokerChannel>(&self, channel: &Ch) -> Result<()> {
        if let Some(exchange) = &self.exchange {
            channel.declare_exchange(exchange).await?;
        }
        channel.declare_queue(&self.queue).await?;
        if let Some(binding) = &self.binding {
            channel.bind_queue(binding).await?;
        }
        Ok(())
    }
}

/// Opens a channel on `connection` and makes sure the role's topology exists.
///
/// Declaration failures come back as `Error::Topology` and are not retried
/// here; the caller drops the connection and starts over.
pub async fn bind_topology<C: BrokerConnection>(connection: &C, role: Role) -> Result<C::Channel> {
    let channel = connection.open_channel().await?;
    Topology::for_role(role).declare(&channel).await?;
    if role == Role::Consumer {
        channel.set_prefetch(1).await?;
    }
    Ok(channel)
}
