//! In-memory broker cluster for tests.
//!
//! Hosts are reachable, refused or unresponsive as configured. Declarations
//! follow broker rules: identical redeclaration is a no-op, a mismatch is a
//! topology error. Each `subscribe` replays the next scripted batch of
//! deliveries and then ends.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures::StreamExt;

use crate::broker::BrokerNode;
use crate::broker::topology::{ExchangeDeclaration, QueueBinding, QueueDeclaration};
use crate::config::{Credentials, Timings};
use crate::transport::{
    BrokerChannel, BrokerConnection, Connector, Deliveries, Envelope, Publication,
};
use crate::utils::{Error, Result};

#[derive(Debug, Default)]
pub struct ClusterState {
    pub reachable: HashSet<String>,
    pub unresponsive: HashSet<String>,
    /// Every connect call, as `host:port`, in order.
    pub attempts: Vec<String>,
    pub exchanges: HashMap<String, ExchangeDeclaration>,
    pub queues: HashMap<String, QueueDeclaration>,
    pub bindings: HashSet<QueueBinding>,
    pub declare_calls: usize,
    pub prefetch: Option<u16>,
    pub published: Vec<Publication>,
    pub acks: Vec<u64>,
    pub subscriptions: Vec<String>,
    pub scripts: VecDeque<Vec<Result<Envelope>>>,
    /// Number of upcoming publishes that break the connection.
    pub failing_publishes: usize,
    pub closed: usize,
    links: Vec<Arc<AtomicBool>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockCluster {
    state: Arc<Mutex<ClusterState>>,
}

#[derive(Debug)]
pub struct MockConnection {
    state: Arc<Mutex<ClusterState>>,
    live: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct MockChannel {
    state: Arc<Mutex<ClusterState>>,
    live: Arc<AtomicBool>,
}

impl MockCluster {
    /// A cluster where only `hosts` accept connections.
    pub fn with_reachable(hosts: &[&str]) -> Self {
        let cluster = Self::default();
        cluster.state().reachable = hosts.iter().map(|h| h.to_string()).collect();
        cluster
    }

    pub fn state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap()
    }

    pub fn set_reachable(&self, host: &str, reachable: bool) {
        let mut state = self.state();
        if reachable {
            state.reachable.insert(host.to_string());
        } else {
            state.reachable.remove(host);
        }
    }

    pub fn set_unresponsive(&self, host: &str) {
        self.state().unresponsive.insert(host.to_string());
    }

    /// Queues one batch of deliveries for the next subscription.
    pub fn script_subscription(&self, deliveries: Vec<Result<Envelope>>) {
        self.state().scripts.push_back(deliveries);
    }

    pub fn fail_next_publishes(&self, count: usize) {
        self.state().failing_publishes = count;
    }

    /// Drops every open connection, as if the node went away.
    pub fn sever_all(&self) {
        for link in &self.state().links {
            link.store(false, Ordering::SeqCst);
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.state().attempts.clone()
    }

    pub fn published(&self) -> Vec<Publication> {
        self.state().published.clone()
    }

    pub fn acks(&self) -> Vec<u64> {
        self.state().acks.clone()
    }
}

#[async_trait]
impl Connector for MockCluster {
    type Connection = MockConnection;

    async fn connect(
        &self,
        node: &BrokerNode,
        _credentials: &Credentials,
        _timings: &Timings,
    ) -> Result<MockConnection> {
        let verdict = {
            let mut state = self.state();
            state.attempts.push(node.to_string());
            if state.unresponsive.contains(&node.host) {
                None
            } else if state.reachable.contains(&node.host) {
                let live = Arc::new(AtomicBool::new(true));
                state.links.push(live.clone());
                Some(Ok(live))
            } else {
                Some(Err(Error::ConnectFailure("connection refused".to_string())))
            }
        };

        match verdict {
            None => std::future::pending().await,
            Some(Ok(live)) => Ok(MockConnection {
                state: self.state.clone(),
                live,
            }),
            Some(Err(e)) => Err(e),
        }
    }
}

#[async_trait]
impl BrokerConnection for MockConnection {
    type Channel = MockChannel;

    async fn open_channel(&self) -> Result<MockChannel> {
        if !self.is_connected() {
            return Err(Error::ConnectionLost("connection closed".to_string()));
        }
        Ok(MockChannel {
            state: self.state.clone(),
            live: self.live.clone(),
        })
    }

    fn is_connected(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    async fn close(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.state.lock().unwrap().closed += 1;
        }
    }
}

impl MockChannel {
    fn guard(&self) -> Result<MutexGuard<'_, ClusterState>> {
        if !self.live.load(Ordering::SeqCst) {
            return Err(Error::ConnectionLost("channel closed".to_string()));
        }
        Ok(self.state.lock().unwrap())
    }
}

#[async_trait]
impl BrokerChannel for MockChannel {
    async fn declare_exchange(&self, exchange: &ExchangeDeclaration) -> Result<()> {
        let mut state = self.guard()?;
        state.declare_calls += 1;
        match state.exchanges.get(&exchange.name) {
            Some(existing) if existing != exchange => Err(Error::Topology(format!(
                "PRECONDITION_FAILED - inequivalent arg for exchange '{}'",
                exchange.name
            ))),
            Some(_) => Ok(()),
            None => {
                state.exchanges.insert(exchange.name.clone(), exchange.clone());
                Ok(())
            }
        }
    }

    async fn declare_queue(&self, queue: &QueueDeclaration) -> Result<()> {
        let mut state = self.guard()?;
        state.declare_calls += 1;
        match state.queues.get(&queue.name) {
            Some(existing) if existing != queue => Err(Error::Topology(format!(
                "PRECONDITION_FAILED - inequivalent arg 'x-queue-type' for queue '{}'",
                queue.name
            ))),
            Some(_) => Ok(()),
            None => {
                state.queues.insert(queue.name.clone(), queue.clone());
                Ok(())
            }
        }
    }

    async fn bind_queue(&self, binding: &QueueBinding) -> Result<()> {
        let mut state = self.guard()?;
        if !state.queues.contains_key(&binding.queue)
            || !state.exchanges.contains_key(&binding.exchange)
        {
            return Err(Error::Topology("NOT_FOUND - no queue or exchange".to_string()));
        }
        state.bindings.insert(binding.clone());
        Ok(())
    }

    async fn set_prefetch(&self, count: u16) -> Result<()> {
        self.guard()?.prefetch = Some(count);
        Ok(())
    }

    async fn publish(&self, publication: &Publication) -> Result<()> {
        let mut state = self.guard()?;
        if state.failing_publishes > 0 {
            state.failing_publishes -= 1;
            self.live.store(false, Ordering::SeqCst);
            return Err(Error::ConnectionLost("socket closed by peer".to_string()));
        }
        state.published.push(publication.clone());
        Ok(())
    }

    async fn subscribe(&self, queue: &str, consumer_tag: &str) -> Result<Deliveries> {
        let mut state = self.guard()?;
        state.subscriptions.push(format!("{queue}/{consumer_tag}"));
        let script = state.scripts.pop_front().unwrap_or_default();
        Ok(futures::stream::iter(script).boxed())
    }

    async fn ack(&self, delivery_tag: u64) -> Result<()> {
        self.guard()?.acks.push(delivery_tag);
        Ok(())
    }
}
