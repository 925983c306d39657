// src/kernels/mod.rs
//! Streaming kernels under test
//!
//! The testbench only sees the [`StreamKernel`] capability: one input
//! channel in, one output channel out, with fixed lengths and element
//! precisions. The reference kernels here stand in for generated firmware.

pub mod relu;
pub mod linear;

pub use relu::ReluKernel;
pub use linear::LinearKernel;

use crate::stream::{Channel, ChannelError, Fixed, FixedSpec};
use crate::trace::Diagnostics;

/// Errors raised by kernel implementations
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("stream underflow: {0}")]
    Underflow(#[from] ChannelError),

    #[error("{kernel}: received {actual} element, interface expects {expected}")]
    PrecisionMismatch {
        kernel: String,
        expected: FixedSpec,
        actual: FixedSpec,
    },

    #[error("unknown activation: {0}")]
    UnknownActivation(String),
}

/// Capability interface of a streaming kernel
pub trait StreamKernel {
    fn name(&self) -> &str;

    /// Elements consumed from the input channel per invocation
    fn input_len(&self) -> usize;

    /// Elements produced on the output channel per invocation
    fn output_len(&self) -> usize;

    fn input_precision(&self) -> FixedSpec;

    fn result_precision(&self) -> FixedSpec;

    /// Drain one sample from `input` and return the produced output stream
    fn invoke(
        &mut self,
        input: &mut Channel<Fixed>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Channel<Fixed>, KernelError>;
}

impl<K: StreamKernel + ?Sized> StreamKernel for Box<K> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_len(&self) -> usize {
        (**self).input_len()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn input_precision(&self) -> FixedSpec {
        (**self).input_precision()
    }

    fn result_precision(&self) -> FixedSpec {
        (**self).result_precision()
    }

    fn invoke(
        &mut self,
        input: &mut Channel<Fixed>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Channel<Fixed>, KernelError> {
        (**self).invoke(input, diagnostics)
    }
}

/// Shape and precision of an elementwise activation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationConfig {
    pub n_in: usize,
    pub layer_name: String,
    pub input_precision: FixedSpec,
    pub result_precision: FixedSpec,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            n_in: 8,
            layer_name: "layer2_out".to_string(),
            input_precision: FixedSpec::default(),
            result_precision: FixedSpec::default(),
        }
    }
}

impl ActivationConfig {
    /// Read `n_in` elements, apply `op`, cast into the result precision
    pub(crate) fn stream(
        &self,
        kernel: &str,
        input: &mut Channel<Fixed>,
        diagnostics: &mut Diagnostics,
        op: impl Fn(Fixed) -> Fixed,
    ) -> Result<Channel<Fixed>, KernelError> {
        let mut output = Channel::with_capacity(self.layer_name.as_str(), self.n_in);
        let mut traced = Vec::with_capacity(self.n_in);

        for _ in 0..self.n_in {
            let x = input.read()?;
            if x.spec() != self.input_precision {
                return Err(KernelError::PrecisionMismatch {
                    kernel: kernel.to_string(),
                    expected: self.input_precision,
                    actual: x.spec(),
                });
            }
            let y = self.result_precision.requantize(op(x));
            traced.push(y.to_f64());
            output.write(y);
        }

        diagnostics.trace(&self.layer_name, || traced);
        Ok(output)
    }
}

/// Build a reference kernel by activation name
pub fn build_kernel(
    activation: &str,
    config: ActivationConfig,
) -> Result<Box<dyn StreamKernel>, KernelError> {
    match activation {
        "relu" => Ok(Box::new(ReluKernel::new(config))),
        "linear" => Ok(Box::new(LinearKernel::new(config))),
        other => Err(KernelError::UnknownActivation(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_known_kernels() {
        let relu = build_kernel("relu", ActivationConfig::default()).unwrap();
        assert_eq!(relu.name(), "relu");
        assert_eq!(relu.input_len(), 8);
        assert_eq!(relu.output_len(), 8);

        let linear = build_kernel("linear", ActivationConfig::default()).unwrap();
        assert_eq!(linear.name(), "linear");
    }

    #[test]
    fn test_build_unknown_kernel() {
        let err = build_kernel("softsign", ActivationConfig::default()).err().unwrap();
        assert!(matches!(err, KernelError::UnknownActivation(ref a) if a == "softsign"));
    }

    #[test]
    fn test_precision_mismatch_rejected() {
        let config = ActivationConfig {
            n_in: 1,
            ..ActivationConfig::default()
        };
        let mut kernel = ReluKernel::new(config);
        let mut input = Channel::new("input_1");
        input.write(FixedSpec::new(8, 4).quantize(1.0));

        let err = kernel.invoke(&mut input, &mut Diagnostics::disabled()).unwrap_err();
        assert!(matches!(err, KernelError::PrecisionMismatch { .. }));
    }
}
