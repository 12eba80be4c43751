//! Processing configuration
//!
//! The stimulus amplitude and transimpedance-amplifier resistance are
//! instrument constants supplied by the caller per run. They are passed
//! explicitly to the processor so no component depends on ambient state.

use serde::{Deserialize, Serialize};

/// Default stimulus amplitude in volts
pub const DEFAULT_AMPLITUDE: f64 = 0.2;

/// Default transimpedance-amplifier feedback resistance in ohms
pub const DEFAULT_RTIA: f64 = 1000.0;

/// Constants used by the impedance derivation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    amplitude: f64,
    rtia: f64,
}

impl ProcessingConfig {
    /// Create a config with explicit amplitude (V) and Rtia (Ω).
    #[must_use]
    pub const fn new(amplitude: f64, rtia: f64) -> Self {
        Self { amplitude, rtia }
    }

    /// Stimulus amplitude in volts.
    #[must_use]
    pub const fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Transimpedance-amplifier feedback resistance in ohms.
    #[must_use]
    pub const fn rtia(&self) -> f64 {
        self.rtia
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_AMPLITUDE, DEFAULT_RTIA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        let config = ProcessingConfig::default();
        assert!((config.amplitude() - 0.2).abs() < f64::EPSILON);
        assert!((config.rtia() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_config() {
        let config = ProcessingConfig::new(0.1, 4700.0);
        assert!((config.amplitude() - 0.1).abs() < f64::EPSILON);
        assert!((config.rtia() - 4700.0).abs() < f64::EPSILON);
    }
}
