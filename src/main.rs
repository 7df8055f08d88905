//! CLI for quorum-relay
//!
//! Subcommands:
//! - `producer`: publish a generated request every two seconds
//! - `consumer`: consume, log and acknowledge requests

use std::sync::Arc;

use clap::Parser;
use quorum_relay::broker::{ConnectionManager, Role};
use quorum_relay::client::{Consumer, Producer};
use quorum_relay::config::{Settings, Timings, load_config};
use quorum_relay::persistence::LogFile;
use quorum_relay::transport::amqp::AmqpConnector;
use quorum_relay::utils::{Context, LocalClock, Result, logging};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "quorum-relay")]
enum Command {
    /// Publish requests to the exchange
    Producer,
    /// Consume requests from the queue
    Consumer,
}

impl Command {
    fn role(&self) -> Role {
        match self {
            Command::Producer => Role::Producer,
            Command::Consumer => Role::Consumer,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cmd = Command::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            logging::init("info");
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&settings.log.level);

    let role = cmd.role();
    tokio::select! {
        result = run(role, settings) => {
            if let Err(e) = result {
                error!("{role} failed: {e}");
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting.");
        }
    }
}

/// Validates configuration, then runs the role's loop. Only returns on a
/// configuration error.
async fn run(role: Role, settings: Settings) -> Result<()> {
    let nodes = settings.nodes()?;
    let credentials = settings.credentials()?;
    info!(%role, nodes = nodes.len(), "configuration loaded");

    let journal = Arc::new(LogFile::new(settings.log_file(role)));
    let ctx = Context::new(journal, Arc::new(LocalClock), Timings::default());
    let connections = ConnectionManager::new(AmqpConnector, nodes, credentials);

    match role {
        Role::Producer => {
            let mut producer = Producer::new(connections, ctx);
            producer.run().await;
        }
        Role::Consumer => {
            let mut consumer = Consumer::new(connections, ctx);
            consumer.run().await;
        }
    }
    Ok(())
}
