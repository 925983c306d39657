// src/stream/adapter.rs
//! Framing between flat corpus rows and kernel stream channels

use crate::error::{HarnessError, Result};
use crate::kernels::StreamKernel;
use crate::stream::{Channel, Fixed, FixedSpec};
use crate::trace::Diagnostics;
use crate::validation::VectorRow;

/// Copy the first `n` values of corpus row `row_index` into a fresh channel,
/// one element per cycle, quantized to `precision`.
pub fn to_channel(
    row: &[f64],
    row_index: usize,
    n: usize,
    precision: FixedSpec,
    name: &str,
) -> Result<Channel<Fixed>> {
    if row.len() < n {
        return Err(HarnessError::MalformedRow {
            source_name: name.to_string(),
            row: row_index,
            expected: n,
            actual: row.len(),
        });
    }

    let mut channel = Channel::with_capacity(name, n);
    channel.extend(row[..n].iter().map(|&v| precision.quantize(v)));
    Ok(channel)
}

/// Drain exactly `m` elements from `channel` as floats
pub fn from_channel(channel: &mut Channel<Fixed>, m: usize) -> Result<VectorRow> {
    let mut row = Vec::with_capacity(m);
    for _ in 0..m {
        row.push(channel.read()?.to_f64());
    }
    Ok(row)
}

/// All-zero input stream for runs without a golden corpus
pub fn fill_zero(n: usize, precision: FixedSpec, name: &str) -> Channel<Fixed> {
    let mut channel = Channel::with_capacity(name, n);
    channel.extend(std::iter::repeat(precision.zero()).take(n));
    channel
}

/// Run one sample through the kernel under test
pub fn invoke_kernel<K: StreamKernel + ?Sized>(
    kernel: &mut K,
    input: &mut Channel<Fixed>,
    diagnostics: &mut Diagnostics,
) -> Result<Channel<Fixed>> {
    Ok(kernel.invoke(input, diagnostics)?)
}
