//! The `utils` module collects the pieces every other module leans on:
//! the error taxonomy, tracing setup, the clock and the loop context.

pub mod clock;
pub mod context;
pub mod error;
pub mod logging;

pub use clock::{Clock, FixedClock, LocalClock};
pub use context::Context;
pub use error::{Error, Result};
