//! Tunables for link evaluation and refresh scheduling.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ticks over which the whole graph is rebuilt once.
pub const DEFAULT_REFRESH_WINDOW: usize = 50;
/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Number of ticks between two refreshes of the same node.
    pub refresh_window: usize,
    /// Propagation speed used to turn route length into delay.
    pub signal_speed_mps: f64,
    /// Bodies are shrunk by this much before the occlusion test.
    pub los_clearance_m: f64,
    /// A dish reaches an omni-only receiver when
    /// `omni_range >= omni_listen_factor * distance`.
    pub omni_listen_factor: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            refresh_window: DEFAULT_REFRESH_WINDOW,
            signal_speed_mps: SPEED_OF_LIGHT_MPS,
            los_clearance_m: 5.0,
            omni_listen_factor: 2.0,
        }
    }
}

impl NetworkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_window == 0 {
            return Err(ConfigError::ZeroRefreshWindow);
        }
        if !(self.signal_speed_mps.is_finite() && self.signal_speed_mps > 0.0) {
            return Err(ConfigError::InvalidSignalSpeed {
                value: self.signal_speed_mps,
            });
        }
        if self.los_clearance_m.is_nan() || self.los_clearance_m < 0.0 {
            return Err(ConfigError::NegativeClearance {
                value: self.los_clearance_m,
            });
        }
        if !(self.omni_listen_factor.is_finite() && self.omni_listen_factor > 0.0) {
            return Err(ConfigError::InvalidListenFactor {
                value: self.omni_listen_factor,
            });
        }
        Ok(())
    }
}
