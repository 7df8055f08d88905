//! Ordered failover across the configured broker nodes.
//!
//! A single call to [`ConnectionManager::acquire`] makes exactly one pass over
//! the node list, in order, and stops at the first node that accepts a
//! connection. There is no affinity to the node that worked last time: each
//! call starts again from the first candidate. Backing off between calls is
//! the caller's job.

use tokio::time::timeout;
use tracing::debug;

use crate::broker::node::{BrokerNode, NodeList};
use crate::config::{Credentials, Timings};
use crate::transport::Connector;
use crate::utils::{Context, Error, Result};

/// Outcome of one pass over the node list.
#[derive(Debug)]
pub enum Acquisition<C> {
    Connected { connection: C, node: BrokerNode },
    Exhausted { attempted: usize },
}

pub struct ConnectionManager<K: Connector> {
    connector: K,
    nodes: NodeList,
    credentials: Credentials,
}

impl<K: Connector> ConnectionManager<K> {
    pub fn new(connector: K, nodes: NodeList, credentials: Credentials) -> Self {
        Self {
            connector,
            nodes,
            credentials,
        }
    }

    /// Tries every node once, in order, returning the first live connection.
    pub async fn scan(&self, ctx: &Context) -> Acquisition<K::Connection> {
        for node in &self.nodes {
            ctx.log(format!("Attempting to connect to {node}"));

            match self.attempt(node, &ctx.timings).await {
                Ok(connection) => {
                    ctx.log(format!("Successfully connected to {node}"));
                    return Acquisition::Connected {
                        connection,
                        node: node.clone(),
                    };
                }
                Err(err) => {
                    ctx.log(format!("Failed to connect to {node} - {err}"));
                }
            }
        }

        Acquisition::Exhausted {
            attempted: self.nodes.len(),
        }
    }

    /// Like [`scan`](Self::scan), but folds exhaustion into `NoReachableNode`.
    pub async fn acquire(&self, ctx: &Context) -> Result<(K::Connection, BrokerNode)> {
        match self.scan(ctx).await {
            Acquisition::Connected { connection, node } => Ok((connection, node)),
            Acquisition::Exhausted { attempted } => Err(Error::NoReachableNode { attempted }),
        }
    }

    async fn attempt(&self, node: &BrokerNode, timings: &Timings) -> Result<K::Connection> {
        debug!(%node, timeout = ?timings.connect_timeout, "opening broker connection");

        match timeout(
            timings.connect_timeout,
            self.connector.connect(node, &self.credentials, timings),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::ConnectFailure(format!(
                "timed out after {:?}",
                timings.connect_timeout
            ))),
        }
    }
}
