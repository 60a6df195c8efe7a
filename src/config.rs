//! Compiler and decomposer settings.

use crate::bone::clip::DEFAULT_FRAME_RATE;
use serde::{Deserialize, Serialize};

/// Settings for the inverse decomposer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompileConfig {
    /// Residual distance `1 - |q·t|` accepted as a match
    pub tolerance: f32,
    /// Nelder-Mead iteration cap per restart
    pub max_iterations: usize,
    /// Degrees at or below this are dropped from the result
    pub negligible_degrees: f32,
    /// Initial simplex step as a fraction of each rule's limit
    pub initial_step: f32,
    /// Number of random restarts besides the fixed ones
    pub random_starts: usize,
    /// Fixed seed for reproducible output
    pub seed: Option<u64>,
    /// Run restarts on scoped threads (ignored on wasm32)
    pub parallel: bool,
    /// Decimal places kept in emitted degrees
    pub decimals: u32,
}

impl Default for DecompileConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 200,
            negligible_degrees: 0.01,
            initial_step: 0.1,
            random_starts: 1,
            seed: None,
            parallel: false,
            decimals: 3,
        }
    }
}

impl DecompileConfig {
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_tolerance(self, tolerance: f32) -> Self {
        Self { tolerance, ..self }
    }
}

/// Top-level compiler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Frames per second used to number VMD records
    pub frame_rate: f32,
    /// Model name written into the VMD header
    pub model_name: String,
    pub decompile: DecompileConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            model_name: String::new(),
            decompile: DecompileConfig::default(),
        }
    }
}

impl CompilerConfig {
    /// Load from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
