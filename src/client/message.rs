use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{Error, Result};

/// What the subscriber behind an MSISDN asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Subscribe,
    Unsubscribe,
    State,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Subscribe, Action::Unsubscribe, Action::State];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Subscribe => "subscribe",
            Action::Unsubscribe => "unsubscribe",
            Action::State => "state",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as the producer publishes it.
///
/// Serialized as `{"action":..,"msisdn":..,"number":..,"timestamp":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub action: Action,
    pub msisdn: String,
    pub number: u64,
    pub timestamp: String,
}

impl Message {
    /// Builds a request with a random action and a random 9-digit MSISDN.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, number: u64, timestamp: String) -> Self {
        let action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
        let msisdn = format!("{:09}", rng.gen_range(0..1_000_000_000u32));
        Self {
            action,
            msisdn,
            number,
            timestamp,
        }
    }
}

/// A request as the consumer reads it back.
///
/// Every field is optional: a body that is not JSON, or that lacks a field,
/// still produces a value and is logged with `N/A` placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedRequest {
    pub action: Option<String>,
    pub msisdn: Option<String>,
    pub number: Option<String>,
    pub timestamp: Option<String>,
}

impl ReceivedRequest {
    /// Parses a delivery body. Only an unparseable body is an error; missing
    /// or oddly-typed fields are not.
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| Error::MalformedPayload(e.to_string()))?;

        Ok(Self {
            action: field(&value, "action"),
            msisdn: field(&value, "msisdn"),
            number: field(&value, "number"),
            timestamp: field(&value, "timestamp"),
        })
    }
}

fn field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Renders an optional field for a log line.
pub fn or_placeholder(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("N/A")
}
