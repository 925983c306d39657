// src/kernels/relu.rs
//! Rectified linear unit: `y = max(x, 0)`

use crate::kernels::{ActivationConfig, KernelError, StreamKernel};
use crate::stream::{Channel, Fixed, FixedSpec};
use crate::trace::Diagnostics;

#[derive(Debug)]
pub struct ReluKernel {
    config: ActivationConfig,
    invocations: u64,
}

impl ReluKernel {
    pub fn new(config: ActivationConfig) -> Self {
        Self {
            config,
            invocations: 0,
        }
    }

    pub fn invocations(&self) -> u64 {
        self.invocations
    }

    /// Float software model of the layer, including both quantization steps
    pub fn reference(config: &ActivationConfig, x: f64) -> f64 {
        let q = config.input_precision.quantize(x);
        let y = if q.is_positive() { q.to_f64() } else { 0.0 };
        config.result_precision.quantize(y).to_f64()
    }
}

impl StreamKernel for ReluKernel {
    fn name(&self) -> &str {
        "relu"
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
        self.invocations += 1;
        let zero = self.config.input_precision.zero();
        self.config.stream("relu", input, diagnostics, |x| {
            if x.is_positive() {
                x
            } else {
                zero
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel(n_in: usize) -> ReluKernel {
        ReluKernel::new(ActivationConfig {
            n_in,
            ..ActivationConfig::default()
        })
    }

    fn feed(values: &[f64]) -> Channel<Fixed> {
        let spec = FixedSpec::default();
        let mut ch = Channel::new("input_1");
        ch.extend(values.iter().map(|&v| spec.quantize(v)));
        ch
    }

    fn drain(mut ch: Channel<Fixed>) -> Vec<f64> {
        let mut out = Vec::new();
        while let Ok(v) = ch.read() {
            out.push(v.to_f64());
        }
        out
    }

    #[test]
    fn test_relu_clamps_negatives() {
        let mut relu = kernel(4);
        let mut input = feed(&[-1.0, 2.0, -3.0, 4.0]);
        let output = relu.invoke(&mut input, &mut Diagnostics::disabled()).unwrap();
        assert_eq!(drain(output), vec![0.0, 2.0, 0.0, 4.0]);
        assert!(input.is_empty());
        assert_eq!(relu.invocations(), 1);
    }

    #[test]
    fn test_relu_underflow() {
        let mut relu = kernel(4);
        let mut input = feed(&[1.0, 2.0]);
        let err = relu.invoke(&mut input, &mut Diagnostics::disabled()).unwrap_err();
        assert!(matches!(err, KernelError::Underflow(_)));
    }

    #[test]
    fn test_relu_traces_layer_output() {
        let mut relu = kernel(2);
        let mut diag = Diagnostics::recording();
        relu.invoke(&mut feed(&[-0.5, 0.5]), &mut diag).unwrap();
        let rows = diag.recorder().unwrap().layer("layer2_out").unwrap();
        assert_eq!(rows, &[vec![0.0, 0.5]]);
    }

    #[test]
    fn test_relu_narrow_result_precision() {
        let config = ActivationConfig {
            n_in: 1,
            result_precision: FixedSpec::new(8, 6),
            ..ActivationConfig::default()
        };
        let mut relu = ReluKernel::new(config.clone());
        let output = relu
            .invoke(&mut feed(&[1.3]), &mut Diagnostics::disabled())
            .unwrap();
        assert_eq!(drain(output), vec![1.25]);
        assert_eq!(ReluKernel::reference(&config, 1.3), 1.25);
        assert_eq!(ReluKernel::reference(&config, -1.3), 0.0);
    }
}
