// src/trace.rs
//! Per-layer output tracing
//!
//! Kernels receive a [`Diagnostics`] handle on every invocation instead of
//! consulting process-wide trace flags. When tracing is enabled and a
//! recorder is attached, kernels append each layer output row to it.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{HarnessError, Result};
use crate::validation::results::format_row;

/// Records layer outputs keyed by layer name, one row per invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct TraceRecorder {
    layers: BTreeMap<String, Vec<Vec<f64>>>,
}

impl TraceRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, layer: &str, values: &[f64]) {
        self.layers
            .entry(layer.to_string())
            .or_default()
            .push(values.to_vec());
    }

    pub fn layer(&self, layer: &str) -> Option<&[Vec<f64>]> {
        self.layers.get(layer).map(Vec::as_slice)
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Write one `<layer>_output.log` per traced layer into `dir`.
    /// Returns the written paths.
    pub fn write_layer_logs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;

        let mut written = Vec::with_capacity(self.layers.len());
        for (layer, rows) in &self.layers {
            let path = dir.join(format!("{}_output.log", layer));
            let file = File::create(&path).map_err(|e| HarnessError::io(&path, e))?;
            let mut out = BufWriter::new(file);
            for row in rows {
                writeln!(out, "{}", format_row(row)).map_err(|e| HarnessError::io(&path, e))?;
            }
            out.flush().map_err(|e| HarnessError::io(&path, e))?;
            written.push(path);
        }
        Ok(written)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.layers)?)
    }
}

/// Diagnostic settings threaded through kernel invocations
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub enabled: bool,
    pub sink: Option<TraceRecorder>,
}

impl Diagnostics {
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Tracing on, with a fresh recorder attached
    pub fn recording() -> Self {
        Self {
            enabled: true,
            sink: Some(TraceRecorder::new()),
        }
    }

    /// Record a layer output if tracing is on and a sink is attached
    pub fn trace(&mut self, layer: &str, values: impl FnOnce() -> Vec<f64>) {
        if !self.enabled {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.record(layer, &values());
        }
    }

    pub fn recorder(&self) -> Option<&TraceRecorder> {
        self.sink.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_records_nothing() {
        let mut diag = Diagnostics {
            enabled: false,
            sink: Some(TraceRecorder::new()),
        };
        diag.trace("layer2_out", || vec![1.0]);
        assert!(diag.recorder().unwrap().is_empty());
    }

    #[test]
    fn test_enabled_without_sink_is_noop() {
        let mut diag = Diagnostics {
            enabled: true,
            sink: None,
        };
        diag.trace("layer2_out", || panic!("values must not be computed"));
        assert!(diag.recorder().is_none());
    }

    #[test]
    fn test_recording_appends_rows() {
        let mut diag = Diagnostics::recording();
        diag.trace("layer2_out", || vec![0.0, 2.0]);
        diag.trace("layer2_out", || vec![1.0, 0.0]);
        let rec = diag.recorder().unwrap();
        assert_eq!(rec.layer("layer2_out").unwrap().len(), 2);
        assert_eq!(rec.layer_names().collect::<Vec<_>>(), vec!["layer2_out"]);
    }

    #[test]
    fn test_layer_logs_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut rec = TraceRecorder::new();
        rec.record("layer2_out", &[0.0, 2.5]);
        let paths = rec.write_layer_logs(dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        let content = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(content, "0.0 2.5\n");
        assert!(rec.to_json().unwrap().contains("layer2_out"));
    }
}
