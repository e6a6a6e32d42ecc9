//! Randomized pacing between consecutive downloads

use std::time::Duration;

use rand::Rng;

use crate::constants::pacing::{DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY};
use crate::errors::{DownloadError, DownloadResult};

/// Closed interval the pause between downloads is drawn from
///
/// A zero maximum disables pacing entirely, whatever the minimum is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// Create a delay range
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::InvalidDelayRange` if `min > max` and pacing
    /// is not disabled
    pub fn new(min: Duration, max: Duration) -> DownloadResult<Self> {
        if !max.is_zero() && min > max {
            return Err(DownloadError::InvalidDelayRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Pacing switched off
    pub fn disabled() -> Self {
        Self {
            min: Duration::ZERO,
            max: Duration::ZERO,
        }
    }

    /// Build from fractional seconds, as used in settings files
    pub fn from_secs_f64(min: f64, max: f64) -> DownloadResult<Self> {
        Self::new(seconds(min), seconds(max))
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    pub fn is_disabled(&self) -> bool {
        self.max.is_zero()
    }

    /// Draw the next pause, or `None` when pacing is disabled
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Duration> {
        if self.is_disabled() {
            return None;
        }
        if self.min == self.max {
            return Some(self.min);
        }
        Some(rng.gen_range(self.min..=self.max))
    }
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_DELAY,
            max: DEFAULT_MAX_DELAY,
        }
    }
}

// Negative and NaN inputs clamp to zero.
fn seconds(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}
