// src/stream/element.rs
//! Signed fixed-point stream element
//!
//! Models the `ap_fixed<W, I>` element type used on generated kernel
//! interfaces: `W` total bits, `I` integer bits (sign included), quantization
//! by truncation toward negative infinity and wrap-around on overflow.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Widest element supported. Raw values stay exact inside an `f64` mantissa.
pub const MAX_WIDTH: u32 = 32;

/// Precision of a fixed-point element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedSpec {
    pub width: u32,
    pub integer: u32,
}

impl FixedSpec {
    pub const fn new(width: u32, integer: u32) -> Self {
        Self { width, integer }
    }

    pub fn frac_bits(&self) -> u32 {
        self.width - self.integer
    }

    /// Smallest representable step (one LSB)
    pub fn resolution(&self) -> f64 {
        (2.0f64).powi(-(self.frac_bits() as i32))
    }

    pub fn max_value(&self) -> f64 {
        let max_raw = (1i64 << (self.width - 1)) - 1;
        max_raw as f64 * self.resolution()
    }

    pub fn min_value(&self) -> f64 {
        let min_raw = -(1i64 << (self.width - 1));
        min_raw as f64 * self.resolution()
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.width <= MAX_WIDTH && self.integer >= 1 && self.integer <= self.width
    }

    /// Quantize a float into this precision.
    ///
    /// NaN maps to zero; infinities saturate before wrapping.
    pub fn quantize(&self, value: f64) -> Fixed {
        let scaled = (value * (2.0f64).powi(self.frac_bits() as i32)).floor();
        let raw = if scaled.is_nan() { 0 } else { scaled as i64 };
        Fixed {
            raw: self.wrap(raw),
            spec: *self,
        }
    }

    /// Convert an element of another precision into this one
    pub fn requantize(&self, value: Fixed) -> Fixed {
        self.quantize(value.to_f64())
    }

    pub fn zero(&self) -> Fixed {
        Fixed { raw: 0, spec: *self }
    }

    fn wrap(&self, raw: i64) -> i64 {
        let shift = 64 - self.width;
        (raw << shift) >> shift
    }
}

impl Default for FixedSpec {
    /// `ap_fixed<16,6>`, the generator's default precision
    fn default() -> Self {
        Self::new(16, 6)
    }
}

impl fmt::Display for FixedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ap_fixed<{},{}>", self.width, self.integer)
    }
}

/// One fixed-point value as carried on a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fixed {
    raw: i64,
    spec: FixedSpec,
}

impl Fixed {
    pub fn raw(&self) -> i64 {
        self.raw
    }

    pub fn spec(&self) -> FixedSpec {
        self.spec
    }

    /// Canonical float conversion. Exact for every supported width.
    pub fn to_f64(&self) -> f64 {
        self.raw as f64 * self.spec.resolution()
    }

    pub fn is_positive(&self) -> bool {
        self.raw > 0
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_f64())
    }
}
