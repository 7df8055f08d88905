use chrono::Local;

/// Format used for every timestamp the system writes, both in log lines and
/// inside produced messages.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of the current local time as a formatted string.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}

/// A clock frozen at one instant. Handy for asserting on exact log lines.
#[derive(Debug, Clone)]
pub struct FixedClock(pub String);

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
