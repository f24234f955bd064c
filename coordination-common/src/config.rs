use serde::{Deserialize, Serialize};
use anyhow::Result;
use crate::params::AnalysisParams;
use crate::snapshot::ParticleType;
use std::path::Path;

// Geometry of the cubic periodic simulation box
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BoxConfig {
    /// Half of the cubic box side length. The box spans [-half_length, half_length) on every axis.
    #[serde(default = "default_half_length")]
    pub half_length: f64,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SamplingStrategy {
    /// The first `sample_size` particles of the target type, in file order.
    First,
    /// A seeded uniform sample without replacement.
    Random,
}

// Parameters of the coordination query and per-snapshot sampling
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CoordinationConfig {
    #[serde(default = "default_cutoff_radius")]
    pub cutoff_radius: f64,
    #[serde(default = "default_target_type")]
    pub target_type: ParticleType,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_sampling")]
    pub sampling: SamplingStrategy,
    #[serde(default)]
    pub seed: u64,
}

// Which dump files of a run are analyzed, and how they are laid out
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct FramesConfig {
    #[serde(default)]
    pub first: u64,
    #[serde(default = "default_last_frame")]
    pub last: u64, // Inclusive
    #[serde(default = "default_frame_stride")]
    pub stride: u64,
    /// Explicit frame ids; overrides first/last/stride when present.
    #[serde(default)]
    pub ids: Option<Vec<u64>>,
    #[serde(default = "default_frame_prefix")]
    pub prefix: String,
    #[serde(default = "default_frame_header_lines")]
    pub header_lines: usize,
}

// Layout of the study directory and of each run's results record
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct StudyConfig {
    pub directory: String,
    #[serde(default = "default_run_prefix")]
    pub run_prefix: String,
    #[serde(default = "default_results_file")]
    pub results_file: String,
    #[serde(default = "default_results_header_lines")]
    pub results_header_lines: usize,
}

// Configuration for output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    pub format: Option<String>, // Output format: "csv" (default) or "json"
    /// Optional per-run transport report (conductivity and diffusion coefficients).
    #[serde(default)]
    pub transport_path: Option<String>,
}

// Main analysis configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct AnalysisConfig {
    #[serde(rename = "box", default)]
    pub simulation_box: BoxConfig,
    #[serde(default)]
    pub coordination: CoordinationConfig,
    #[serde(default)]
    pub frames: FramesConfig,
    pub study: StudyConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for BoxConfig {
    fn default() -> Self {
        BoxConfig { half_length: default_half_length() }
    }
}

impl Default for CoordinationConfig {
    fn default() -> Self {
        CoordinationConfig {
            cutoff_radius: default_cutoff_radius(),
            target_type: default_target_type(),
            sample_size: default_sample_size(),
            sampling: default_sampling(),
            seed: 0,
        }
    }
}

impl Default for FramesConfig {
    fn default() -> Self {
        FramesConfig {
            first: 0,
            last: default_last_frame(),
            stride: default_frame_stride(),
            ids: None,
            prefix: default_frame_prefix(),
            header_lines: default_frame_header_lines(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            path: default_output_path(),
            format: None,
            transport_path: None,
        }
    }
}

impl FramesConfig {
    /// Frame identifiers in processing order.
    pub fn frame_ids(&self) -> Vec<u64> {
        if let Some(ids) = &self.ids {
            return ids.clone();
        }
        if self.stride == 0 || self.first > self.last {
            return Vec::new();
        }
        (self.first..=self.last).step_by(self.stride as usize).collect()
    }
}

impl AnalysisConfig {
    /// Loads the analysis configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the parameter ranges the periodic engine relies on.
    pub fn validate(&self) -> Result<()> {
        let half_length = self.simulation_box.half_length;
        if !(half_length > 0.0) || !half_length.is_finite() {
            anyhow::bail!("box.half_length must be a positive number (got {}).", half_length);
        }
        let cutoff = self.coordination.cutoff_radius;
        if !(cutoff > 0.0) || !cutoff.is_finite() {
            anyhow::bail!("coordination.cutoff_radius must be positive (got {}).", cutoff);
        }
        // The single-shift minimum-image correction only finds the nearest image below this bound.
        if cutoff >= half_length {
            anyhow::bail!(
                "coordination.cutoff_radius ({}) must be smaller than box.half_length ({}).",
                cutoff, half_length
            );
        }
        if self.coordination.sample_size == 0 {
            anyhow::bail!("coordination.sample_size must be greater than 0.");
        }
        if self.frames.ids.is_none() && self.frames.stride == 0 {
            anyhow::bail!("frames.stride must be greater than 0.");
        }
        if self.frames.frame_ids().is_empty() {
            anyhow::bail!("frames selects no frame ids.");
        }
        if self.study.run_prefix.is_empty() {
            anyhow::bail!("study.run_prefix must not be empty.");
        }
        match self.output.format.as_deref() {
            None | Some("csv") | Some("json") => {}
            Some(other) => anyhow::bail!("Unknown output format '{}' (expected csv or json).", other),
        }
        Ok(())
    }

    /// Converts the configuration into the parameters threaded through the analysis.
    pub fn get_analysis_params(&self) -> AnalysisParams {
        let half_length = self.simulation_box.half_length;
        let cutoff_radius = self.coordination.cutoff_radius;

        AnalysisParams {
            // Box
            half_length,
            box_length: 2.0 * half_length,
            // Query
            cutoff_radius,
            target_type: self.coordination.target_type,
            sample_size: self.coordination.sample_size,
            sampling: self.coordination.sampling,
            seed: self.coordination.seed,
            // Frames
            frame_ids: self.frames.frame_ids(),
            frame_prefix: self.frames.prefix.clone(),
            frame_header_lines: self.frames.header_lines,
            // Runs
            run_prefix: self.study.run_prefix.clone(),
            results_file: self.study.results_file.clone(),
            results_header_lines: self.study.results_header_lines,
        }
    }
}

// Defaults reproduce the constants of the original electrolyte study
fn default_half_length() -> f64 {
    1.1197216739351800e+01
}

fn default_cutoff_radius() -> f64 {
    1.5
}

fn default_target_type() -> ParticleType {
    ParticleType::Cation
}

fn default_sample_size() -> usize {
    50
}

fn default_sampling() -> SamplingStrategy {
    SamplingStrategy::First
}

fn default_last_frame() -> u64 {
    10_000_000
}

fn default_frame_stride() -> u64 {
    500_000
}

fn default_frame_prefix() -> String {
    "dump".to_string()
}

fn default_frame_header_lines() -> usize {
    9
}

fn default_run_prefix() -> String {
    "run".to_string()
}

fn default_results_file() -> String {
    "conductivity.data".to_string()
}

fn default_results_header_lines() -> usize {
    11
}

fn default_output_path() -> String {
    "coord.csv".to_string()
}
