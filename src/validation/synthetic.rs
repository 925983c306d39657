// src/validation/synthetic.rs
//! Seeded golden corpus generation
//!
//! Predictions come from the float software model of the layer, so a
//! generated corpus checks the streamed fixed-point kernel against an
//! independent computation of the same quantized function.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ConfigError;
use crate::error::{HarnessError, Result};
use crate::kernels::{ActivationConfig, KernelError, LinearKernel, ReluKernel};
use crate::validation::corpus::VectorRow;
use crate::validation::results::format_row;

/// Parameters for a generated corpus
#[derive(Debug, Clone)]
pub struct CorpusSpec {
    pub rows: usize,
    pub seed: u64,
    /// Inputs are drawn uniformly from `[-range, range)`
    pub range: f64,
}

impl CorpusSpec {
    /// `range` must be finite, non-negative, and small enough that the
    /// sampling interval width `2 * range` is finite
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.range.is_finite() || self.range < 0.0 || self.range > f64::MAX / 2.0 {
            return Err(ConfigError::Validation(format!(
                "Corpus range must be finite and within [0, {:e}], got {}",
                f64::MAX / 2.0,
                self.range
            )));
        }
        Ok(())
    }
}

impl Default for CorpusSpec {
    fn default() -> Self {
        Self {
            rows: 10,
            seed: 42,
            range: 4.0,
        }
    }
}

/// Generated input rows and their predictions
#[derive(Debug, Clone, PartialEq)]
pub struct GoldenCorpus {
    pub inputs: Vec<VectorRow>,
    pub predictions: Vec<VectorRow>,
}

impl GoldenCorpus {
    pub fn generate(
        activation: &str,
        config: &ActivationConfig,
        spec: &CorpusSpec,
    ) -> Result<Self> {
        spec.validate()?;
        let model: fn(&ActivationConfig, f64) -> f64 = match activation {
            "relu" => ReluKernel::reference,
            "linear" => LinearKernel::reference,
            other => return Err(KernelError::UnknownActivation(other.to_string()).into()),
        };

        let mut rng = StdRng::seed_from_u64(spec.seed);
        let mut inputs = Vec::with_capacity(spec.rows);
        let mut predictions = Vec::with_capacity(spec.rows);

        for _ in 0..spec.rows {
            // Inputs are written already quantized so the text is exact
            let input: VectorRow = (0..config.n_in)
                .map(|_| {
                    let x = if spec.range > 0.0 {
                        rng.gen_range(-spec.range..spec.range)
                    } else {
                        0.0
                    };
                    config.input_precision.quantize(x).to_f64()
                })
                .collect();
            let prediction = input.iter().map(|&x| model(config, x)).collect();
            inputs.push(input);
            predictions.push(prediction);
        }

        Ok(Self { inputs, predictions })
    }

    pub fn write(&self, input_path: &Path, predictions_path: &Path) -> Result<()> {
        write_rows(input_path, &self.inputs)?;
        write_rows(predictions_path, &self.predictions)
    }
}

fn write_rows(path: &Path, rows: &[VectorRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| HarnessError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| HarnessError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for row in rows {
        writeln!(out, "{}", format_row(row)).map_err(|e| HarnessError::io(path, e))?;
    }
    out.flush().map_err(|e| HarnessError::io(path, e))
}
