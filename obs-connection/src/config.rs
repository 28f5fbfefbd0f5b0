//! Configuration for the connection manager

use std::time::Duration;

/// Configuration for the ConnectionManager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Time between worker iterations: one status poll while connected,
    /// one reconnect attempt while disconnected
    /// Default: 1 second
    pub poll_interval: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl ManagerConfig {
    /// Create a new ManagerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker iteration interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_interval_is_one_second() {
        assert_eq!(ManagerConfig::default().poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_with_poll_interval() {
        let config = ManagerConfig::new().with_poll_interval(Duration::from_millis(10));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
    }
}
