// src/config/mod.rs
//! Testbench configuration system
//! Handles TOML parsing and validation

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::kernels::ActivationConfig;
use crate::stream::FixedSpec;
use crate::trace::{Diagnostics, TraceRecorder};
use crate::validation::ResultsMode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub corpus: CorpusConfig,
    pub results: ResultsConfig,
    pub kernel: KernelConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub input: PathBuf,
    pub predictions: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsConfig {
    #[serde(default)]
    pub mode: ResultsMode,
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub activation: String,
    pub layer_name: String,
    pub n_in: usize,
    pub input_precision: FixedSpec,
    pub result_precision: FixedSpec,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub enabled: bool,
    /// Where `<layer>_output.log` files go; the results directory when unset
    pub directory: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;

        let config: HarnessConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Default configuration matching the generated project layout
    pub fn default_test() -> Self {
        Self {
            corpus: CorpusConfig {
                input: PathBuf::from("tb_data/tb_input_features.dat"),
                predictions: PathBuf::from("tb_data/tb_output_predictions.dat"),
            },
            results: ResultsConfig {
                mode: ResultsMode::Csim,
                directory: PathBuf::from("tb_data"),
            },
            kernel: KernelConfig {
                activation: "relu".to_string(),
                layer_name: "layer2_out".to_string(),
                n_in: 8,
                input_precision: FixedSpec::default(),
                result_precision: FixedSpec::default(),
            },
            trace: TraceConfig::default(),
        }
    }

    /// Validate configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kernel.n_in == 0 {
            return Err(ConfigError::Validation("Kernel n_in must be > 0".to_string()));
        }

        let known = ["relu", "linear"];
        if !known.contains(&self.kernel.activation.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unsupported activation: {} (expected one of {:?})",
                self.kernel.activation, known
            )));
        }

        if self.kernel.layer_name.trim().is_empty() {
            return Err(ConfigError::Validation("Layer name must not be empty".to_string()));
        }

        for (label, spec) in [
            ("input", self.kernel.input_precision),
            ("result", self.kernel.result_precision),
        ] {
            if !spec.is_valid() {
                return Err(ConfigError::Validation(format!(
                    "Invalid {} precision {}: need 1 <= integer <= width <= {}",
                    label,
                    spec,
                    crate::stream::element::MAX_WIDTH
                )));
            }
        }

        Ok(())
    }

    pub fn results_path(&self) -> PathBuf {
        self.results.mode.log_path(&self.results.directory)
    }

    pub fn trace_directory(&self) -> &Path {
        self.trace
            .directory
            .as_deref()
            .unwrap_or(&self.results.directory)
    }

    pub fn activation_config(&self) -> ActivationConfig {
        ActivationConfig {
            n_in: self.kernel.n_in,
            layer_name: self.kernel.layer_name.clone(),
            input_precision: self.kernel.input_precision,
            result_precision: self.kernel.result_precision,
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            enabled: self.trace.enabled,
            sink: self.trace.enabled.then(TraceRecorder::new),
        }
    }

    /// Export configuration to TOML string
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_str = self.to_toml_string()?;
        std::fs::write(path.as_ref(), toml_str)?;
        Ok(())
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_test()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialize(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = HarnessConfig::default_test();
        assert!(config.validate().is_ok());
        assert_eq!(config.results_path(), PathBuf::from("tb_data/csim_results.log"));
    }

    #[test]
    fn test_cosim_results_path() {
        let mut config = HarnessConfig::default_test();
        config.results.mode = ResultsMode::Cosim;
        assert_eq!(config.results_path(), PathBuf::from("tb_data/rtl_cosim_results.log"));
    }

    #[test]
    fn test_config_validation_errors() {
        let mut config = HarnessConfig::default_test();

        config.kernel.n_in = 0;
        assert!(config.validate().is_err());

        config.kernel.n_in = 4;
        config.kernel.activation = "gelu".to_string();
        assert!(config.validate().is_err());

        config.kernel.activation = "relu".to_string();
        config.kernel.result_precision = FixedSpec::new(8, 12);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_serialization() {
        let config = HarnessConfig::default_test();
        let toml_str = config.to_toml_string().unwrap();

        let parsed: HarnessConfig = toml::from_str(&toml_str).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml_str = r#"
            [corpus]
            input = "a.dat"
            predictions = "b.dat"

            [results]
            directory = "out"

            [kernel]
            activation = "linear"
            layer_name = "layer3_out"
            n_in = 4
            input_precision = { width = 18, integer = 8 }
            result_precision = { width = 16, integer = 6 }
        "#;
        let config: HarnessConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.results.mode, ResultsMode::Csim);
        assert!(!config.trace.enabled);
        assert_eq!(config.trace_directory(), Path::new("out"));
        assert_eq!(config.activation_config().input_precision, FixedSpec::new(18, 8));
    }

    #[test]
    fn test_diagnostics_follow_trace_flag() {
        let mut config = HarnessConfig::default_test();
        assert!(config.diagnostics().sink.is_none());
        config.trace.enabled = true;
        let diag = config.diagnostics();
        assert!(diag.enabled);
        assert!(diag.sink.is_some());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testbench.toml");
        HarnessConfig::default_test().save_to_file(&path).unwrap();
        let loaded = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(loaded.kernel.activation, "relu");
    }
}
