//! Document size tracking.
//!
//! Sizes are measured as the UTF-8 byte length of the serialized markup,
//! expressed in kilobytes. Every in-memory content change appends one sample
//! to the [`SessionSizeHistory`], which lives only for the current process.
//!
//! The progress/band constants are the contract consumed by the display
//! layer and never change during a session.

use serde::Serialize;

/// Bytes per kilobyte used for every size computation.
pub const BYTES_PER_KB: f64 = 1024.0;

/// Upper bound of the progress value derived from a size sample.
pub const PROGRESS_MAX: u8 = 100;

/// Progress values below this are in the [`SizeBand::Low`] band.
pub const MEDIUM_BAND_START: u8 = 50;

/// Progress values at or above this are in the [`SizeBand::High`] band.
pub const HIGH_BAND_START: u8 = 80;

/// Returns the serialized size of `content` in kilobytes.
///
/// # Examples
///
/// ```
/// use notepad_core::size::size_kb;
///
/// assert_eq!(size_kb(""), 0.0);
/// assert_eq!(size_kb(&"a".repeat(2048)), 2.0);
/// // Byte length, not character count
/// assert_eq!(size_kb("é"), 2.0 / 1024.0);
/// ```
pub fn size_kb(content: &str) -> f64 {
    content.len() as f64 / BYTES_PER_KB
}

/// Maps a size sample to a bounded 0-100 progress value.
pub fn progress_value(size_kb: f64) -> u8 {
    if !size_kb.is_finite() || size_kb <= 0.0 {
        return 0;
    }
    size_kb.round().min(f64::from(PROGRESS_MAX)) as u8
}

/// Color band of the size progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBand {
    Low,
    Medium,
    High,
}

impl SizeBand {
    /// Classifies a progress value into its band.
    ///
    /// # Examples
    ///
    /// ```
    /// use notepad_core::size::SizeBand;
    ///
    /// assert_eq!(SizeBand::for_progress(49), SizeBand::Low);
    /// assert_eq!(SizeBand::for_progress(50), SizeBand::Medium);
    /// assert_eq!(SizeBand::for_progress(80), SizeBand::High);
    /// ```
    pub fn for_progress(progress: u8) -> Self {
        if progress < MEDIUM_BAND_START {
            Self::Low
        } else if progress < HIGH_BAND_START {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// Append-only log of size samples observed during a session.
#[derive(Debug, Clone, Default)]
pub struct SessionSizeHistory {
    samples: Vec<f64>,
}

impl SessionSizeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the history with previously known sizes.
    ///
    /// Seeded values are informational only and are not checked against
    /// the files they came from.
    pub fn seed(&mut self, sizes: impl IntoIterator<Item = f64>) {
        self.samples.extend(sizes);
    }

    /// Computes the size of `content`, appends it, and returns it.
    pub fn record(&mut self, content: &str) -> f64 {
        let size = size_kb(content);
        self.samples.push(size);
        size
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.last().copied()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
