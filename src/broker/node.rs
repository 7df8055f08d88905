use std::fmt;
use std::str::FromStr;

use crate::utils::{Error, Result};

/// Node list used when nothing is configured: one local broker on the standard port.
pub const DEFAULT_HOSTS: &str = "localhost:5672";

/// One member of the broker cluster, reachable at `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokerNode {
    pub host: String,
    pub port: u16,
}

impl BrokerNode {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The name this node goes by in log lines.
    pub fn identity(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for BrokerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for BrokerNode {
    type Err = Error;

    fn from_str(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        let (host, port) = entry.rsplit_once(':').ok_or_else(|| {
            Error::Configuration(format!("broker entry '{entry}' is missing a port"))
        })?;
        if host.is_empty() {
            return Err(Error::Configuration(format!(
                "broker entry '{entry}' is missing a host"
            )));
        }
        let port = port.parse::<u16>().map_err(|_| {
            Error::Configuration(format!("broker entry '{entry}' has an invalid port"))
        })?;
        Ok(Self::new(host, port))
    }
}

/// Ordered, non-empty set of candidate nodes. Duplicates are kept and simply
/// tried again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeList(Vec<BrokerNode>);

impl NodeList {
    /// Parses a comma-separated `host:port` list. An empty value yields the
    /// default single local node.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = if raw.trim().is_empty() {
            DEFAULT_HOSTS
        } else {
            raw
        };

        let nodes = raw
            .split(',')
            .map(BrokerNode::from_str)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self(nodes))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BrokerNode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a BrokerNode;
    type IntoIter = std::slice::Iter<'a, BrokerNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
