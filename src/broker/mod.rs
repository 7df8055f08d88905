//! The `broker` module covers everything about reaching the remote cluster:
//! which nodes exist, how to fail over between them, and which queue and
//! exchange must be declared once a node answers.

pub mod connection;
pub mod node;
pub mod topology;

pub use connection::{Acquisition, ConnectionManager};
pub use node::{BrokerNode, NodeList};
pub use topology::{Role, Topology, bind_topology};
