// src/validation/compare.rs
//! Bit-exact comparison of kernel output against golden predictions

use std::fmt;

use serde::{Deserialize, Serialize};

/// First element where a kernel output row differs from its prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MismatchReport {
    pub row: usize,
    pub index: usize,
    pub expected: f64,
    pub actual: f64,
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} element {}: expected {:?}, actual {:?}",
            self.row, self.index, self.expected, self.actual
        )
    }
}

/// Compare `actual` against the leading elements of `expected` with exact
/// equality. No tolerance is applied.
///
/// `expected` must hold at least `actual.len()` values; the driver checks
/// row lengths before calling this.
pub fn compare_row(row: usize, expected: &[f64], actual: &[f64]) -> Option<MismatchReport> {
    expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .map(|index| MismatchReport {
            row,
            index,
            expected: expected[index],
            actual: actual[index],
        })
}
