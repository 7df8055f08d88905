//! The `persistence` module keeps the human-readable journal of what each
//! role did: connection attempts, failovers, and every message sent or
//! received.
//!
//! Lines are appended to a per-role file and echoed to stdout.

pub mod log_file;

pub use log_file::{Journal, LogFile, MemoryJournal};

#[cfg(test)]
mod tests;
