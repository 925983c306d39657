// src/validation/results.rs
//! Result log output
//!
//! One line per processed sample, values in encounter order. The file name
//! depends on whether the run is software simulation or RTL co-simulation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Which simulation flow produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultsMode {
    /// C/software simulation
    #[default]
    Csim,
    /// RTL co-simulation
    Cosim,
}

impl ResultsMode {
    pub fn file_name(&self) -> &'static str {
        match self {
            ResultsMode::Csim => "csim_results.log",
            ResultsMode::Cosim => "rtl_cosim_results.log",
        }
    }

    pub fn log_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Format values as shortest round-trip decimals separated by spaces
pub fn format_row(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Append-only result log. The file is flushed and closed on drop; call
/// [`ResultLog::finish`] to observe flush errors.
#[derive(Debug)]
pub struct ResultLog {
    path: PathBuf,
    out: BufWriter<File>,
    rows: usize,
}

impl ResultLog {
    /// Create (truncate) the log, creating parent directories as needed
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| HarnessError::io(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| HarnessError::io(&path, e))?;

        Ok(Self {
            path,
            out: BufWriter::new(file),
            rows: 0,
        })
    }

    pub fn append(&mut self, values: &[f64]) -> Result<()> {
        writeln!(self.out, "{}", format_row(values)).map_err(|e| HarnessError::io(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and close, returning the log path
    pub fn finish(mut self) -> Result<PathBuf> {
        self.out.flush().map_err(|e| HarnessError::io(&self.path, e))?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_paths() {
        let dir = Path::new("tb_data");
        assert_eq!(ResultsMode::Csim.log_path(dir), Path::new("tb_data/csim_results.log"));
        assert_eq!(ResultsMode::Cosim.log_path(dir), Path::new("tb_data/rtl_cosim_results.log"));
        assert_eq!(ResultsMode::default(), ResultsMode::Csim);
    }

    #[test]
    fn test_format_row() {
        assert_eq!(format_row(&[0.0, 2.0, 0.0, 4.0]), "0.0 2.0 0.0 4.0");
        assert_eq!(format_row(&[-1.5, 0.0009765625]), "-1.5 0.0009765625");
        assert_eq!(format_row(&[]), "");
    }

    #[test]
    fn test_log_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("csim_results.log");

        let mut log = ResultLog::create(&path).unwrap();
        log.append(&[1.0, 2.0]).unwrap();
        log.append(&[3.0, 4.5]).unwrap();
        assert_eq!(log.rows(), 2);
        let written = log.finish().unwrap();

        assert_eq!(written, path);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1.0 2.0\n3.0 4.5\n");
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rtl_cosim_results.log");
        {
            let mut log = ResultLog::create(&path).unwrap();
            log.append(&[0.5]).unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0.5\n");
    }
}
