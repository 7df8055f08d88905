use tracing::debug;

use crate::broker::{BrokerNode, ConnectionManager, Role, bind_topology};
use crate::transport::{BrokerConnection, Connector};
use crate::utils::{Context, Result};

/// Name reported for the node while no session is established.
pub const UNKNOWN_NODE: &str = "unknown";

/// A live connection, its channel, and the node they belong to.
///
/// The three are only ever created, replaced and dropped together.
pub struct Session<C: BrokerConnection> {
    pub node: BrokerNode,
    pub connection: C,
    pub channel: C::Channel,
}

impl<C: BrokerConnection> Session<C> {
    pub fn is_live(&self) -> bool {
        self.connection.is_connected()
    }
}

/// Holds at most one session for a role.
pub struct SessionSlot<C: BrokerConnection> {
    current: Option<Session<C>>,
}

impl<C: BrokerConnection> Default for SessionSlot<C> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<C: BrokerConnection> SessionSlot<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }

    /// Identity of the connected node, or `unknown`.
    pub fn node_name(&self) -> &str {
        self.current
            .as_ref()
            .map(|s| s.node.identity())
            .unwrap_or(UNKNOWN_NODE)
    }

    /// Returns the current session, establishing a new one if there is none
    /// or the current one has died.
    ///
    /// A dead session is closed before any new connection is opened, so a
    /// role never holds two connections at once. The second value is true
    /// when a new session was established by this call.
    pub async fn ensure<K>(
        &mut self,
        connections: &ConnectionManager<K>,
        role: Role,
        ctx: &Context,
    ) -> Result<(&mut Session<C>, bool)>
    where
        K: Connector<Connection = C>,
    {
        if let Some(session) = self.current.take() {
            if session.is_live() {
                return Ok((self.current.insert(session), false));
            }
            debug!(node = %session.node, "discarding dead session");
            session.connection.close().await;
        }

        let (connection, node) = connections.acquire(ctx).await?;
        let channel = match bind_topology(&connection, role).await {
            Ok(channel) => channel,
            Err(err) => {
                connection.close().await;
                return Err(err);
            }
        };

        let session = Session {
            node,
            connection,
            channel,
        };
        Ok((self.current.insert(session), true))
    }

    /// Drops the session, closing its connection. Returns the node it was on.
    pub async fn teardown(&mut self) -> Option<BrokerNode> {
        let session = self.current.take()?;
        session.connection.close().await;
        Some(session.node)
    }
}
