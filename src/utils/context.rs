use std::fmt::Display;
use std::sync::Arc;

use crate::config::Timings;
use crate::persistence::Journal;
use crate::utils::clock::Clock;

/// Collaborators shared by every stage of a role's loop: where lines go,
/// what time it is, and how long to wait between steps.
#[derive(Clone)]
pub struct Context {
    pub journal: Arc<dyn Journal>,
    pub clock: Arc<dyn Clock>,
    pub timings: Timings,
}

impl Context {
    pub fn new(journal: Arc<dyn Journal>, clock: Arc<dyn Clock>, timings: Timings) -> Self {
        Self {
            journal,
            clock,
            timings,
        }
    }

    /// Stamps `event` with the current time and appends it to the journal.
    pub fn log(&self, event: impl Display) {
        let line = format!("[{}] {event}", self.clock.now());
        self.journal.record(&line);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("journal", &"dyn Journal")
            .field("timings", &self.timings)
            .finish()
    }
}
