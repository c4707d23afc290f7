//! Network configuration overrides from environment.

use std::env;

use relaynet_core::NetworkConfig;
use tracing::warn;

pub const REFRESH_WINDOW_VAR: &str = "RELAYNET_REFRESH_WINDOW";
pub const SIGNAL_SPEED_VAR: &str = "RELAYNET_SIGNAL_SPEED";

/// Overlay `RELAYNET_*` variables on top of `config`.
pub fn apply_env(config: NetworkConfig) -> NetworkConfig {
    apply_overrides(config, |key| env::var(key).ok())
}

/// Overlay values from `lookup`. Unparseable values are ignored with a warning.
pub fn apply_overrides(
    mut config: NetworkConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> NetworkConfig {
    if let Some(raw) = lookup(REFRESH_WINDOW_VAR) {
        match raw.trim().parse() {
            Ok(window) => config.refresh_window = window,
            Err(_) => warn!("Ignoring {}={:?}: not a tick count", REFRESH_WINDOW_VAR, raw),
        }
    }
    if let Some(raw) = lookup(SIGNAL_SPEED_VAR) {
        match raw.trim().parse() {
            Ok(speed) => config.signal_speed_mps = speed,
            Err(_) => warn!("Ignoring {}={:?}: not a speed", SIGNAL_SPEED_VAR, raw),
        }
    }
    config
}
