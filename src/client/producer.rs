//! Producer loop: publish one request, sleep, repeat.
//!
//! The sequence counter lives outside the session, so it keeps climbing
//! across reconnects. It only advances after a publish succeeds. A publish
//! that fails mid-call is not retried and its number is handed to the next
//! request.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::broker::topology::{EXCHANGE_NAME, ROUTING_KEY};
use crate::broker::{ConnectionManager, Role};
use crate::client::message::Message;
use crate::client::recovery::{Recovery, recover};
use crate::client::session::SessionSlot;
use crate::transport::{BrokerChannel, Connector, Publication};
use crate::utils::{Context, Result};

/// Result of one producer iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Published(Message),
    Recovered(Recovery),
}

pub struct Producer<K: Connector> {
    connections: ConnectionManager<K>,
    session: SessionSlot<K::Connection>,
    ctx: Context,
    rng: StdRng,
    counter: u64,
}

impl<K: Connector> Producer<K> {
    pub fn new(connections: ConnectionManager<K>, ctx: Context) -> Self {
        Self {
            connections,
            session: SessionSlot::new(),
            ctx,
            rng: StdRng::from_entropy(),
            counter: 1,
        }
    }

    /// Replaces the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Number the next published request will carry.
    pub fn next_number(&self) -> u64 {
        self.counter
    }

    pub fn current_node(&self) -> &str {
        self.session.node_name()
    }

    /// Runs until the process is killed.
    pub async fn run(&mut self) {
        self.ctx.log("Producer started");
        loop {
            self.step().await;
        }
    }

    /// One iteration: publish and wait out the interval, or recover from the
    /// failure that prevented it.
    pub async fn step(&mut self) -> Step {
        match self.publish_next().await {
            Ok(message) => {
                tokio::time::sleep(self.ctx.timings.publish_interval).await;
                Step::Published(message)
            }
            Err(err) => Step::Recovered(recover(&mut self.session, &err, &self.ctx).await),
        }
    }

    async fn publish_next(&mut self) -> Result<Message> {
        let (session, fresh) = self
            .session
            .ensure(&self.connections, Role::Producer, &self.ctx)
            .await?;
        if fresh {
            self.ctx
                .log(format!("Producer connected to node: {}", session.node.identity()));
        }

        let message = Message::generate(&mut self.rng, self.counter, self.ctx.clock.now());
        let publication = Publication::json(EXCHANGE_NAME, ROUTING_KEY, &message)?;
        session.channel.publish(&publication).await?;
        debug!(number = message.number, node = %session.node, "published");

        self.ctx.log(format!(
            "Sent request #{}: {} - {}",
            message.number, message.action, message.msisdn
        ));
        self.counter += 1;
        Ok(message)
    }
}
