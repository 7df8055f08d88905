//! What a delivery loop does after something went wrong.
//!
//! Failures that leave the session untrustworthy (a lost connection, a
//! topology conflict, no reachable node) clear the session slot. Anything
//! else leaves a still-live session in place. Either way exactly one line
//! is logged and exactly one backoff pause is taken before the loop resumes.

use tracing::warn;

use crate::client::session::SessionSlot;
use crate::transport::BrokerConnection;
use crate::utils::{Context, Error};

/// What recovery did with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Session dropped; the next iteration reconnects from the first node.
    Reconnect { node: String },
    /// Session kept; the next iteration reuses it if it is still live.
    Retry { node: String },
}

pub async fn recover<C: BrokerConnection>(
    slot: &mut SessionSlot<C>,
    err: &Error,
    ctx: &Context,
) -> Recovery {
    let node = slot.node_name().to_string();

    let recovery = if err.invalidates_session() {
        let lost = slot.teardown().await;
        warn!(%node, "session invalidated: {err}");
        match lost {
            Some(_) => ctx.log(format!(
                "Connection lost from node: {node} ({err}), attempting to reconnect..."
            )),
            None => ctx.log(format!("{err}, attempting to reconnect...")),
        }
        Recovery::Reconnect { node }
    } else {
        warn!(%node, "recoverable error: {err}");
        ctx.log(format!("Error on node {node}: {err}"));
        Recovery::Retry { node }
    };

    tokio::time::sleep(ctx.timings.backoff).await;
    recovery
}
