//! Error types for `relaynet-core`.
//!
//! Routing itself never fails: unreachable hubs, stale ids and degenerate
//! geometry all produce empty results. Only configuration is validated.

/// Errors produced when validating a [`NetworkConfig`](crate::NetworkConfig).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// The refresh window must cover at least one tick.
    #[error("refresh window must be at least 1 tick")]
    ZeroRefreshWindow,

    /// Signal speed is used as a divisor for route delay.
    #[error("signal speed must be positive and finite, got {value}")]
    InvalidSignalSpeed {
        /// The rejected value in meters per second.
        value: f64,
    },

    /// Line-of-sight clearance cannot grow a body.
    #[error("line-of-sight clearance must be non-negative, got {value}")]
    NegativeClearance {
        /// The rejected value in meters.
        value: f64,
    },

    /// Omni listen factor scales the required omni range.
    #[error("omni listen factor must be positive and finite, got {value}")]
    InvalidListenFactor {
        /// The rejected factor.
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_signal_speed() {
        let err = ConfigError::InvalidSignalSpeed { value: -1.0 };
        assert_eq!(
            err.to_string(),
            "signal speed must be positive and finite, got -1"
        );
    }

    #[test]
    fn error_display_refresh_window() {
        assert_eq!(
            ConfigError::ZeroRefreshWindow.to_string(),
            "refresh window must be at least 1 tick"
        );
    }
}
