// src/validation/corpus.rs
//! Golden corpus reader
//!
//! A corpus is two line-aligned text files: input features and expected
//! predictions, one sample per line as whitespace-separated decimals.
//! Values are held at single precision, the precision the corpora are
//! written in, then widened for comparison.

use std::fs::File;
use std::io::{BufRead, BufReader, Split};
use std::path::{Path, PathBuf};

use crate::error::{HarnessError, Result};

/// One parsed line of numeric tokens
pub type VectorRow = Vec<f64>;

/// Convert a token the way C `atof` does: use the longest leading prefix
/// that parses as a float (decimal or `0x` hexadecimal), or zero when there
/// is none.
pub fn parse_token(token: &str) -> f64 {
    if let Ok(v) = token.parse::<f64>() {
        return v;
    }
    if let Some(v) = parse_hex_prefix(token) {
        return v;
    }

    token
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .skip(1)
        .find_map(|end| token[..end].parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Hexadecimal float prefix: `[+-]0x<hex>[.<hex>][p[+-]<dec>]`.
/// `None` when no hex digit follows the `0x`.
fn parse_hex_prefix(token: &str) -> Option<f64> {
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;

    let mut mantissa = 0.0f64;
    let mut exponent: i32 = 0;
    let mut seen_digit = false;
    let mut seen_point = false;
    let mut end = 0;
    for (i, c) in digits.char_indices() {
        if let Some(d) = c.to_digit(16) {
            mantissa = mantissa * 16.0 + d as f64;
            if seen_point {
                exponent -= 4;
            }
            seen_digit = true;
        } else if c == '.' && !seen_point {
            seen_point = true;
        } else {
            break;
        }
        end = i + 1;
    }
    if !seen_digit {
        return None;
    }

    let tail = &digits[end..];
    if let Some(exp) = tail.strip_prefix('p').or_else(|| tail.strip_prefix('P')) {
        let (sign, exp_digits) = match exp.as_bytes().first() {
            Some(b'-') => (-1, &exp[1..]),
            Some(b'+') => (1, &exp[1..]),
            _ => (1, exp),
        };
        let len = exp_digits.bytes().take_while(u8::is_ascii_digit).count();
        if len > 0 {
            let magnitude = exp_digits[..len].parse::<i32>().unwrap_or(i32::MAX);
            exponent = exponent.saturating_add(sign * magnitude);
        }
    }

    let value = mantissa * (2.0f64).powi(exponent);
    Some(if negative { -value } else { value })
}

/// Split a line on whitespace runs and convert every token, rounding each
/// value to single precision
pub fn parse_row(line: &str) -> VectorRow {
    line.split_whitespace()
        .map(|token| parse_token(token) as f32 as f64)
        .collect()
}

/// Decode a raw corpus line. Bytes that are not UTF-8 become replacement
/// characters, which then parse as zero.
fn decode_line(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Input row and its expected prediction row
#[derive(Debug, Clone, PartialEq)]
pub struct RowPair {
    pub index: usize,
    pub input: VectorRow,
    pub expected: VectorRow,
}

/// Lock-step reader over an input file and a predictions file
#[derive(Debug)]
pub struct CorpusReader {
    input_path: PathBuf,
    expected_path: PathBuf,
    input: Split<BufReader<File>>,
    expected: Split<BufReader<File>>,
    next_index: usize,
}

impl CorpusReader {
    /// Open both files. `None` when either cannot be opened; callers fall
    /// back to a self-test instead of failing.
    pub fn open(input_path: impl AsRef<Path>, expected_path: impl AsRef<Path>) -> Option<Self> {
        let input_path = input_path.as_ref();
        let expected_path = expected_path.as_ref();
        if !input_path.is_file() || !expected_path.is_file() {
            return None;
        }

        let input = File::open(input_path).ok()?;
        let expected = File::open(expected_path).ok()?;

        Some(Self {
            input_path: input_path.to_path_buf(),
            expected_path: expected_path.to_path_buf(),
            input: BufReader::new(input).split(b'\n'),
            expected: BufReader::new(expected).split(b'\n'),
            next_index: 0,
        })
    }

    /// Next row pair, or `None` once either file runs out
    pub fn next_row(&mut self) -> Result<Option<RowPair>> {
        let input_line = match self.input.next() {
            Some(line) => line.map_err(|e| HarnessError::io(&self.input_path, e))?,
            None => return Ok(None),
        };
        let expected_line = match self.expected.next() {
            Some(line) => line.map_err(|e| HarnessError::io(&self.expected_path, e))?,
            None => return Ok(None),
        };

        let pair = RowPair {
            index: self.next_index,
            input: parse_row(&decode_line(input_line)),
            expected: parse_row(&decode_line(expected_line)),
        };
        self.next_index += 1;
        Ok(Some(pair))
    }

    /// Rows produced so far
    pub fn rows_read(&self) -> usize {
        self.next_index
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn expected_path(&self) -> &Path {
        &self.expected_path
    }
}

impl Iterator for CorpusReader {
    type Item = Result<RowPair>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
