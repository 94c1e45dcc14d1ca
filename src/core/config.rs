//! # Eventbox configuration.
//!
//! Provides [`Config`], the settings an [`Eventbox`](crate::Eventbox) is built with.
//!
//! ## Sentinel values
//! - `max_handlers = 0` → unlimited handlers per topic

/// Configuration for one eventbox instance.
///
/// ## Field semantics
/// - `bus_capacity`: diagnostics ring buffer size (min 1; clamped by Bus)
/// - `max_handlers`: per-topic handler cap (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the diagnostics broadcast channel.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Maximum number of handlers subscribed to a single topic.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = the `n+1`-th subscribe on a topic fails with
    ///   [`EventboxError::TooManyHandlers`](crate::EventboxError::TooManyHandlers)
    pub max_handlers: usize,
}

impl Config {
    /// Returns the per-topic handler cap as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` handlers per topic
    #[inline]
    pub fn handler_limit(&self) -> Option<usize> {
        if self.max_handlers == 0 {
            None
        } else {
            Some(self.max_handlers)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `max_handlers = 0` (unlimited)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_handlers: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.handler_limit(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }

    #[test]
    fn test_sentinels() {
        let cfg = Config {
            bus_capacity: 0,
            max_handlers: 3,
        };
        assert_eq!(cfg.handler_limit(), Some(3));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
