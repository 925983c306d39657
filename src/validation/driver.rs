// src/validation/driver.rs
//! Golden-vector testbench driver
//!
//! Streams every corpus row through the kernel under test and stops at the
//! first element that differs from its prediction. Without a corpus the
//! kernel runs once on an all-zero input and nothing is compared.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::kernels::StreamKernel;
use crate::stream::{adapter, Channel, Fixed};
use crate::trace::Diagnostics;
use crate::validation::compare::{compare_row, MismatchReport};
use crate::validation::corpus::{CorpusReader, RowPair, VectorRow};
use crate::validation::results::ResultLog;

const INPUT_CHANNEL: &str = "input_1";

/// Terminal state of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    AllRowsPassed { rows: usize },
    MismatchFound(MismatchReport),
    SelfTestCompleted,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::MismatchFound(_))
    }

    /// Process exit status: 0 on success or self-test, 1 on mismatch
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Turn a mismatch into [`HarnessError::ComparisonMismatch`]
    pub fn into_result(self) -> Result<Self> {
        match self {
            RunOutcome::MismatchFound(report) => Err(HarnessError::ComparisonMismatch(report)),
            other => Ok(other),
        }
    }
}

/// Which path the driver took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Corpus,
    SelfTest,
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub kernel: String,
    pub mode: RunMode,
    pub outcome: RunOutcome,
    pub rows_logged: usize,
    pub results_log: PathBuf,
}

impl RunReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).map_err(|e| HarnessError::io(path, e))
    }
}

/// Drives a kernel through a golden corpus
pub struct Testbench<K: StreamKernel> {
    kernel: K,
    input_path: PathBuf,
    predictions_path: PathBuf,
    results_path: PathBuf,
    diagnostics: Diagnostics,
}

impl<K: StreamKernel> Testbench<K> {
    pub fn new(
        kernel: K,
        input_path: impl Into<PathBuf>,
        predictions_path: impl Into<PathBuf>,
        results_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kernel,
            input_path: input_path.into(),
            predictions_path: predictions_path.into(),
            results_path: results_path.into(),
            diagnostics: Diagnostics::disabled(),
        }
    }

    pub fn from_config(config: &HarnessConfig, kernel: K) -> Self {
        Self::new(
            kernel,
            &config.corpus.input,
            &config.corpus.predictions,
            config.results_path(),
        )
        .with_diagnostics(config.diagnostics())
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    /// Run the bench to a terminal state.
    ///
    /// Mismatches are reported through [`RunOutcome::MismatchFound`];
    /// malformed rows, kernel failures and I/O errors abort with `Err`.
    pub fn run(&mut self) -> Result<RunReport> {
        let mut log = ResultLog::create(&self.results_path)?;

        let (mode, outcome) = match CorpusReader::open(&self.input_path, &self.predictions_path) {
            Some(corpus) => {
                info!(
                    kernel = self.kernel.name(),
                    input = %self.input_path.display(),
                    predictions = %self.predictions_path.display(),
                    "running golden corpus"
                );
                (RunMode::Corpus, self.run_corpus(corpus, &mut log)?)
            }
            None => {
                warn!(
                    input = %self.input_path.display(),
                    predictions = %self.predictions_path.display(),
                    "unable to open input/predictions file, using default input"
                );
                (RunMode::SelfTest, self.run_self_test(&mut log)?)
            }
        };

        let rows_logged = log.rows();
        let results_log = log.finish()?;
        info!(path = %results_log.display(), rows = rows_logged, "saved inference results");

        Ok(RunReport {
            kernel: self.kernel.name().to_string(),
            mode,
            outcome,
            rows_logged,
            results_log,
        })
    }

    fn run_corpus(&mut self, corpus: CorpusReader, log: &mut ResultLog) -> Result<RunOutcome> {
        let mut rows = 0;
        for pair in corpus {
            let pair = pair?;
            let actual = self.process_row(&pair)?;

            if let Some(report) = compare_row(pair.index, &pair.expected, &actual) {
                error!(
                    row = report.row,
                    index = report.index,
                    expected = report.expected,
                    actual = report.actual,
                    "FAILURE"
                );
                return Ok(RunOutcome::MismatchFound(report));
            }

            debug!(row = pair.index, "row passed");
            log.append(&actual)?;
            rows += 1;
        }

        info!(rows, "all rows matched");
        Ok(RunOutcome::AllRowsPassed { rows })
    }

    fn run_self_test(&mut self, log: &mut ResultLog) -> Result<RunOutcome> {
        let mut input = adapter::fill_zero(
            self.kernel.input_len(),
            self.kernel.input_precision(),
            INPUT_CHANNEL,
        );
        let output = self.invoke(&mut input)?;
        log.append(&output)?;
        Ok(RunOutcome::SelfTestCompleted)
    }

    /// Stream one row through the kernel and return its output values
    fn process_row(&mut self, pair: &RowPair) -> Result<VectorRow> {
        check_row_len(&pair.input, self.kernel.input_len(), "input", pair.index)?;
        check_row_len(&pair.expected, self.kernel.output_len(), "prediction", pair.index)?;

        let mut input = adapter::to_channel(
            &pair.input,
            pair.index,
            self.kernel.input_len(),
            self.kernel.input_precision(),
            INPUT_CHANNEL,
        )?;
        self.invoke(&mut input)
    }

    fn invoke(&mut self, input: &mut Channel<Fixed>) -> Result<VectorRow> {
        let mut output = adapter::invoke_kernel(&mut self.kernel, input, &mut self.diagnostics)?;
        adapter::from_channel(&mut output, self.kernel.output_len())
    }
}

fn check_row_len(row: &[f64], required: usize, source_name: &str, index: usize) -> Result<()> {
    if row.len() < required {
        return Err(HarnessError::MalformedRow {
            source_name: source_name.to_string(),
            row: index,
            expected: required,
            actual: row.len(),
        });
    }
    Ok(())
}
