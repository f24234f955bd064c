use crate::config::SamplingStrategy;
use crate::snapshot::ParticleType;
use serde::{Deserialize, Serialize};

/// Analysis parameters derived from the configuration, threaded through every engine call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisParams {
    // Box
    pub half_length: f64,
    pub box_length: f64, // Full side, 2 * half_length

    // Coordination query
    pub cutoff_radius: f64,
    pub target_type: ParticleType,
    pub sample_size: usize,
    pub sampling: SamplingStrategy,
    pub seed: u64,

    // Frames of a run
    pub frame_ids: Vec<u64>,
    pub frame_prefix: String,
    pub frame_header_lines: usize,

    // Run directories
    pub run_prefix: String,
    pub results_file: String,
    pub results_header_lines: usize,
}

impl AnalysisParams {
    /// File name of the dump written at `frame_id`, e.g. `dump500000`.
    pub fn frame_file_name(&self, frame_id: u64) -> String {
        format!("{}{}", self.frame_prefix, frame_id)
    }
}
