//! Scale functions for data-to-visual mappings.
//!
//! Scales transform data values to pixel positions. The brush inverts them to
//! map a pixel drag back into data space.

use crate::error::{Error, Result};

/// Trait for scale functions that map domain values to range values.
pub trait Scale<D, R> {
    /// Transform a domain value to a range value.
    fn scale(&self, value: D) -> R;

    /// Get the domain extent.
    fn domain(&self) -> (D, D);

    /// Get the range extent.
    fn range(&self) -> (R, R);
}

/// Linear scale for continuous-to-continuous mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_min: f32,
    domain_max: f32,
    range_min: f32,
    range_max: f32,
}

impl LinearScale {
    /// Create a new linear scale.
    ///
    /// # Errors
    ///
    /// Returns an error if domain_min equals domain_max.
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Result<Self> {
        if (domain.0 - domain.1).abs() < f32::EPSILON {
            return Err(Error::ScaleDomain("Domain min and max cannot be equal".to_string()));
        }

        Ok(Self {
            domain_min: domain.0,
            domain_max: domain.1,
            range_min: range.0,
            range_max: range.1,
        })
    }

    /// Create a scale from data extent.
    #[must_use]
    pub fn from_data(data: &[f32], range: (f32, f32)) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        let min = data.iter().copied().fold(f32::INFINITY, f32::min);
        let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Self::new((min, max), range).ok()
    }

    /// Invert the scale (range to domain).
    #[must_use]
    pub fn invert(&self, value: f32) -> f32 {
        let t = (value - self.range_min) / (self.range_max - self.range_min);
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// Round tick values covering the domain, aiming for `count` ticks.
    ///
    /// Uses the 1/2/5 step heuristic, so the actual number of ticks may
    /// differ slightly from the request.
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f32> {
        let lo = self.domain_min.min(self.domain_max);
        let hi = self.domain_min.max(self.domain_max);
        let span = hi - lo;
        if count == 0 || span <= 0.0 || !span.is_finite() {
            return Vec::new();
        }

        let raw_step = span / count as f32;
        let magnitude = 10f32.powf(raw_step.log10().floor());
        let residual = raw_step / magnitude;
        let factor = if residual >= 7.07 {
            10.0
        } else if residual >= 3.16 {
            5.0
        } else if residual >= 1.414 {
            2.0
        } else {
            1.0
        };
        let step = magnitude * factor;

        let mut ticks = Vec::new();
        let mut tick = (lo / step).ceil() * step;
        while tick <= hi + step * 1e-3 {
            ticks.push(tick);
            tick += step;
        }
        ticks
    }
}

impl Scale<f32, f32> for LinearScale {
    fn scale(&self, value: f32) -> f32 {
        let t = (value - self.domain_min) / (self.domain_max - self.domain_min);
        self.range_min + t * (self.range_max - self.range_min)
    }

    fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> (f32, f32) {
        (self.range_min, self.range_max)
    }
}

/// Band scale for categorical-to-continuous mapping.
///
/// Divides the range into `n` evenly spaced bands with proportional padding
/// between and around them (inner padding equals outer padding), matching the
/// layout the box plot uses for its group slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    range_min: f32,
    range_max: f32,
    padding: f32,
}

impl BandScale {
    /// Create a new band scale over `count` bands.
    ///
    /// # Errors
    ///
    /// Returns an error if `count` is zero.
    pub fn new(count: usize, range: (f32, f32), padding: f32) -> Result<Self> {
        if count == 0 {
            return Err(Error::ScaleDomain("Band scale requires at least one band".to_string()));
        }

        Ok(Self {
            count,
            range_min: range.0,
            range_max: range.1,
            padding: padding.clamp(0.0, 1.0),
        })
    }

    /// Number of bands.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance between the starts of adjacent bands.
    #[must_use]
    pub fn step(&self) -> f32 {
        (self.range_max - self.range_min) / (self.count as f32 + self.padding)
    }

    /// Width of one band.
    #[must_use]
    pub fn bandwidth(&self) -> f32 {
        self.step() * (1.0 - self.padding)
    }

    /// Start position of band `index`, or `None` when out of bounds.
    #[must_use]
    pub fn position(&self, index: usize) -> Option<f32> {
        if index >= self.count {
            return None;
        }
        Some(self.range_min + self.step() * (self.padding + index as f32))
    }

    /// Center position of band `index`, or `None` when out of bounds.
    #[must_use]
    pub fn center(&self, index: usize) -> Option<f32> {
        self.position(index).map(|p| p + self.bandwidth() / 2.0)
    }
}
