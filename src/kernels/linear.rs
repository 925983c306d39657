// src/kernels/linear.rs
//! Linear (identity) activation, used as a pass-through reference

use crate::kernels::{ActivationConfig, KernelError, StreamKernel};
use crate::stream::{Channel, Fixed, FixedSpec};
use crate::trace::Diagnostics;

#[derive(Debug)]
pub struct LinearKernel {
    config: ActivationConfig,
}

impl LinearKernel {
    pub fn new(config: ActivationConfig) -> Self {
        Self { config }
    }

    pub fn reference(config: &ActivationConfig, x: f64) -> f64 {
        let q = config.input_precision.quantize(x);
        config.result_precision.requantize(q).to_f64()
    }
}

impl StreamKernel for LinearKernel {
    fn name(&self) -> &str {
        "linear"
    }

    fn input_len(&self) -> usize {
        self.config.n_in
    }

    fn output_len(&self) -> usize {
        self.config.n_in
    }

    fn input_precision(&self) -> FixedSpec {
        self.config.input_precision
    }

    fn result_precision(&self) -> FixedSpec {
        self.config.result_precision
    }

    fn invoke(
        &mut self,
        input: &mut Channel<Fixed>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Channel<Fixed>, KernelError> {
        self.config.stream("linear", input, diagnostics, |x| x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_passes_values_through() {
        let config = ActivationConfig {
            n_in: 3,
            ..ActivationConfig::default()
        };
        let spec = config.input_precision;
        let mut kernel = LinearKernel::new(config.clone());
        let mut input = Channel::new("input_1");
        input.extend([-1.5, 0.0, 7.25].iter().map(|&v| spec.quantize(v)));

        let mut output = kernel.invoke(&mut input, &mut Diagnostics::disabled()).unwrap();
        for expected in [-1.5, 0.0, 7.25] {
            assert_eq!(output.read().unwrap().to_f64(), expected);
            assert_eq!(LinearKernel::reference(&config, expected), expected);
        }
        assert!(output.is_empty());
    }
}
