//! The `client` module holds the two roles that talk to the broker.
//!
//! - `producer`: publishes a generated request every interval.
//! - `consumer`: drains the queue, logging and acking each delivery.
//!
//! Both keep their connection state in a `SessionSlot` and hand every
//! failure to `recovery`, which decides whether the session survives.

pub mod consumer;
pub mod message;
pub mod producer;
pub mod recovery;
pub mod session;

pub use consumer::{Consumer, handle_delivery};
pub use message::{Action, Message, ReceivedRequest};
pub use producer::{Producer, Step};
pub use recovery::Recovery;
pub use session::{Session, SessionSlot};
