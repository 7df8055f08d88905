use serde::Serialize;

use crate::utils::Result;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A message on its way out to an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub exchange: String,
    pub routing_key: String,
    pub payload: Vec<u8>,
    pub content_type: String,
    /// Delivery mode 2: the broker writes the message to disk.
    pub persistent: bool,
}

impl Publication {
    /// Serializes `body` as a persistent JSON publication.
    pub fn json<T: Serialize>(exchange: &str, routing_key: &str, body: &T) -> Result<Self> {
        Ok(Self {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            payload: serde_json::to_vec(body)?,
            content_type: JSON_CONTENT_TYPE.to_string(),
            persistent: true,
        })
    }
}

/// A delivery as the consumer sees it.
///
/// Owned by the handler from receipt until it is acknowledged; acking consumes
/// the tag, so an envelope is never acked twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub body: Vec<u8>,
    pub exchange: Option<String>,
    pub routing_key: Option<String>,
    pub delivery_tag: u64,
    pub redelivered: bool,
}

impl Envelope {
    /// Builds an envelope, treating empty exchange or routing key as absent.
    pub fn new(
        body: Vec<u8>,
        exchange: &str,
        routing_key: &str,
        delivery_tag: u64,
        redelivered: bool,
    ) -> Self {
        let present = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            body,
            exchange: present(exchange),
            routing_key: present(routing_key),
            delivery_tag,
            redelivered,
        }
    }

    pub fn exchange_or_default(&self) -> &str {
        self.exchange.as_deref().unwrap_or("direct")
    }

    pub fn routing_key_or_default(&self) -> &str {
        self.routing_key.as_deref().unwrap_or("none")
    }
}
