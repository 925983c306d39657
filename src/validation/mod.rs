// src/validation/mod.rs
//! Golden-vector validation of streaming kernels
//!
//! Reads paired input/prediction corpora, streams them through a kernel,
//! compares bit-exactly and writes the result log.

pub mod corpus;
pub mod compare;
pub mod results;
pub mod driver;
pub mod synthetic;

// Re-export core validation types
pub use corpus::{parse_row, parse_token, CorpusReader, RowPair, VectorRow};
pub use compare::{compare_row, MismatchReport};
pub use results::{format_row, ResultLog, ResultsMode};
pub use driver::{RunMode, RunOutcome, RunReport, Testbench};
pub use synthetic::{CorpusSpec, GoldenCorpus};
