//! Engine tuning knobs.

use std::time::Duration;

/// Default number of validate-calculate-commit rounds per redemption.
pub const DEFAULT_MAX_REDEMPTION_ATTEMPTS: u32 = 3;

/// Default number of generated coupon codes tried before giving up.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 5;

/// Default pause between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Engine configuration.
///
/// ## Usage
/// ```rust
/// use promo_engine::EngineConfig;
///
/// let config = EngineConfig::default().max_redemption_attempts(5);
/// assert_eq!(config.max_redemption_attempts, 5);
/// assert_eq!(config.max_code_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Total redemption attempts, the first one included.
    pub max_redemption_attempts: u32,

    /// Generated codes tried when the previous one was already taken.
    pub max_code_attempts: u32,

    /// Pause between background sweeps.
    pub sweep_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_redemption_attempts: DEFAULT_MAX_REDEMPTION_ATTEMPTS,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl EngineConfig {
    /// Sets the redemption attempt limit. Zero is treated as one.
    pub fn max_redemption_attempts(mut self, attempts: u32) -> Self {
        self.max_redemption_attempts = attempts.max(1);
        self
    }

    /// Sets the generated-code attempt limit. Zero is treated as one.
    pub fn max_code_attempts(mut self, attempts: u32) -> Self {
        self.max_code_attempts = attempts.max(1);
        self
    }

    /// Sets the sweep interval.
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
