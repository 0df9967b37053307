//! Configuration of the [`BeatDetector`].
//!
//! [`DetectorConfig::default`] is the tuned default profile. The values were
//! found empirically by watching a sprite flip along with a few songs. They
//! are a reasonable starting point, not a guarantee.
//!
//! A raw [`DetectorConfig`] is validated once into a [`ValidConfig`] when the
//! detector is created, so the per-frame hot path never has to check it again.
//!
//! [`BeatDetector`]: crate::BeatDetector

use crate::f32::{ensure_finite, InvalidF32Error, UnitF32};
use core::ops::Range;
use core::time::Duration;
use thiserror::Error;

/// Default analyzed bands. With the typical 64 bands per channel, the lowest
/// three bands carry the bass/kick energy.
pub const DEFAULT_BANDS: Range<usize> = 0..3;

/// Default length `W` of the rolling history per band (in frames).
pub const DEFAULT_HISTORY_LEN: usize = 30;

/// Default minimum interval between two beats. Anything faster than
/// 200 BPM is not plausible for the visual reaction.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(300);

/// Default frame-count cooldown for [`Cooldown::Frames`].
pub const DEFAULT_COOLDOWN_FRAMES: u32 = 6;

/// Possible errors of an invalid [`DetectorConfig`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidConfigError {
    #[error("the band range {0:?} is empty or inverted")]
    EmptyBandRange(Range<usize>),
    #[error("the history length must not be zero")]
    ZeroHistoryLen,
    #[error("the cooldown must not be zero")]
    ZeroCooldown,
    #[error("low threshold ({low}) must not exceed high threshold ({high})")]
    InvertedThresholds { low: f32, high: f32 },
    #[error("invalid value for `{field}`")]
    InvalidValue {
        field: &'static str,
        #[source]
        source: InvalidF32Error,
    },
}

/// Range of the incoming energy values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputScale {
    /// Energies are already in `[0, 1]`.
    #[default]
    Unit,
    /// Energies are in `[0, 255]`, as delivered by byte-based analyzers.
    Byte,
}

impl InputScale {
    /// Maps a raw energy value to the canonical range `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn normalize(self, raw: f32) -> f32 {
        match self {
            Self::Unit => raw,
            Self::Byte => raw / 255.0,
        }
    }
}

/// Logistic compression `1 / (1 + exp(-steepness·x + offset))`.
///
/// With the defaults, averages below ~0.4 are pushed towards 0 and averages
/// above ~0.6 towards 1. The center of the soft step is at
/// `offset / steepness`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sigmoid {
    pub steepness: f32,
    pub offset: f32,
}

impl Default for Sigmoid {
    fn default() -> Self {
        Self {
            steepness: 30.0,
            offset: 15.0,
        }
    }
}

/// Minimum spacing between two beats when no tempo hint is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cooldown {
    /// Wall-clock cooldown. The elapsed time since the last beat must reach
    /// this duration.
    Duration(Duration),
    /// Frame-count cooldown. More than this many frames must have passed
    /// since the last beat. Only useful when the frame rate is constant,
    /// e.g., for offline analysis.
    Frames(u32),
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::Duration(DEFAULT_COOLDOWN)
    }
}

/// User-facing configuration of the detector. See the module description.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DetectorConfig {
    /// Analyzed bands `[min, max)` of each incoming frame.
    pub bands: Range<usize>,
    /// Capacity `W` of the rolling history per band. Larger windows adapt
    /// slower to a changing loudness floor, smaller windows react faster to
    /// sudden dynamic shifts. Values between 30 and 100 work well.
    pub history_len: usize,
    pub input_scale: InputScale,
    pub sigmoid: Sigmoid,
    /// The previous frame must have been quieter than this.
    pub threshold_low: f32,
    /// The current frame must be at least this loud.
    pub threshold_high: f32,
    pub cooldown: Cooldown,
    /// Minimum tempo confidence when a tempo hint is available.
    pub confidence_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS,
            history_len: DEFAULT_HISTORY_LEN,
            input_scale: InputScale::default(),
            sigmoid: Sigmoid::default(),
            threshold_low: 0.5,
            threshold_high: 0.7,
            cooldown: Cooldown::default(),
            confidence_threshold: 0.75,
        }
    }
}

impl DetectorConfig {
    /// Validates the configuration.
    pub fn validate(self) -> Result<ValidConfig, InvalidConfigError> {
        if self.bands.is_empty() {
            return Err(InvalidConfigError::EmptyBandRange(self.bands));
        }
        if self.history_len == 0 {
            return Err(InvalidConfigError::ZeroHistoryLen);
        }
        match self.cooldown {
            Cooldown::Duration(d) if d.is_zero() => return Err(InvalidConfigError::ZeroCooldown),
            Cooldown::Frames(0) => return Err(InvalidConfigError::ZeroCooldown),
            _ => {}
        }

        let unit = |field: &'static str, value: f32| {
            UnitF32::try_from(value)
                .map_err(|source| InvalidConfigError::InvalidValue { field, source })
        };
        let finite = |field: &'static str, value: f32| {
            ensure_finite(value)
                .map_err(|source| InvalidConfigError::InvalidValue { field, source })
        };

        let threshold_low = unit("threshold_low", self.threshold_low)?;
        let threshold_high = unit("threshold_high", self.threshold_high)?;
        if threshold_low > threshold_high {
            return Err(InvalidConfigError::InvertedThresholds {
                low: self.threshold_low,
                high: self.threshold_high,
            });
        }
        let confidence_threshold = unit("confidence_threshold", self.confidence_threshold)?;
        finite("sigmoid.steepness", self.sigmoid.steepness)?;
        finite("sigmoid.offset", self.sigmoid.offset)?;

        Ok(ValidConfig {
            bands: self.bands,
            history_len: self.history_len,
            input_scale: self.input_scale,
            sigmoid: self.sigmoid,
            threshold_low,
            threshold_high,
            cooldown: self.cooldown,
            confidence_threshold,
        })
    }
}

/// A validated [`DetectorConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidConfig {
    bands: Range<usize>,
    history_len: usize,
    input_scale: InputScale,
    sigmoid: Sigmoid,
    threshold_low: UnitF32,
    threshold_high: UnitF32,
    cooldown: Cooldown,
    confidence_threshold: UnitF32,
}

impl ValidConfig {
    #[must_use]
    pub fn bands(&self) -> Range<usize> {
        self.bands.clone()
    }

    #[must_use]
    pub const fn history_len(&self) -> usize {
        self.history_len
    }

    #[must_use]
    pub const fn input_scale(&self) -> InputScale {
        self.input_scale
    }

    #[must_use]
    pub const fn sigmoid(&self) -> Sigmoid {
        self.sigmoid
    }

    #[must_use]
    pub const fn threshold_low(&self) -> UnitF32 {
        self.threshold_low
    }

    #[must_use]
    pub const fn threshold_high(&self) -> UnitF32 {
        self.threshold_high
    }

    #[must_use]
    pub const fn cooldown(&self) -> Cooldown {
        self.cooldown
    }

    #[must_use]
    pub const fn confidence_threshold(&self) -> UnitF32 {
        self.confidence_threshold
    }
}
