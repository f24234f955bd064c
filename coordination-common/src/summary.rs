use crate::snapshot::{ParticleType, NUM_PARTICLE_TYPES};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Neighborhood of one reference particle within the cutoff radius.
/// The count includes the reference particle itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationResult {
    pub reference_id: u64,
    /// Coordination number: particles (self included) within the cutoff.
    pub count: u32,
    /// Neighbor counts indexed by `ParticleType::index()`.
    pub type_counts: [u32; NUM_PARTICLE_TYPES],
    /// `type_counts[t] / count`; sums to 1 whenever `count > 0`.
    pub type_fractions: [f64; NUM_PARTICLE_TYPES],
}

impl CoordinationResult {
    pub fn fraction(&self, kind: ParticleType) -> f64 {
        self.type_fractions[kind.index()]
    }

    pub fn count_of(&self, kind: ParticleType) -> u32 {
        self.type_counts[kind.index()]
    }
}

/// Mean coordination over the sampled reference particles of one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub frame_id: u64,
    /// Number of reference particles averaged.
    pub sampled: usize,
    pub mean_coordination: f64,
    pub mean_type_fractions: [f64; NUM_PARTICLE_TYPES],
}

/// Arithmetic mean of `(coordination, type fractions)` pairs.
///
/// Returns `None` when `samples` is empty.
pub fn mean_composition<'a, I>(samples: I) -> Option<(f64, [f64; NUM_PARTICLE_TYPES])>
where
    I: IntoIterator<Item = (f64, &'a [f64; NUM_PARTICLE_TYPES])>,
{
    let mut n = 0usize;
    let mut mean_coordination = 0.0;
    let mut mean_type_fractions = [0.0f64; NUM_PARTICLE_TYPES];
    for (coordination, fractions) in samples {
        n += 1;
        mean_coordination += coordination;
        for (acc, f) in mean_type_fractions.iter_mut().zip(fractions.iter()) {
            *acc += f;
        }
    }
    if n == 0 {
        return None;
    }
    let n = n as f64;
    mean_type_fractions.iter_mut().for_each(|f| *f /= n);
    Some((mean_coordination / n, mean_type_fractions))
}

/// Scalar values read from a run's auxiliary results record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransportRecord {
    /// Control parameter of the run (e.g. secondary site radius).
    pub parameter_value: f64,
    pub conductivity: f64,
    pub cation_diffusion: Option<f64>,
    pub anion_diffusion: Option<f64>,
}

impl TransportRecord {
    /// Cation share of the conductivity, `Dc / (Dc + Da) * sigma`.
    pub fn cation_conductivity(&self) -> Option<f64> {
        let dc = self.cation_diffusion?;
        let da = self.anion_diffusion?;
        let total = dc + da;
        if total == 0.0 {
            return None;
        }
        Some(dc / total * self.conductivity)
    }
}

/// Frame-averaged coordination statistics of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Name of the run directory this summary was computed from.
    pub run_id: String,
    pub parameter_value: f64,
    pub conductivity: f64,
    pub mean_coordination: f64,
    pub mean_type_fractions: [f64; NUM_PARTICLE_TYPES],
    pub frames_analyzed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cation_diffusion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anion_diffusion: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cation_conductivity: Option<f64>,
}

impl RunSummary {
    pub fn transport(&self) -> TransportRecord {
        TransportRecord {
            parameter_value: self.parameter_value,
            conductivity: self.conductivity,
            cation_diffusion: self.cation_diffusion,
            anion_diffusion: self.anion_diffusion,
        }
    }
}

/// One row per successfully analyzed run, ordered by parameter value then run id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyTable {
    rows: Vec<RunSummary>,
}

impl StudyTable {
    pub fn new(mut rows: Vec<RunSummary>) -> Self {
        rows.sort_by(compare_runs);
        Self { rows }
    }

    pub fn rows(&self) -> &[RunSummary] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find(&self, run_id: &str) -> Option<&RunSummary> {
        self.rows.iter().find(|r| r.run_id == run_id)
    }
}

/// Ordering helper for callers that sort summaries outside a table.
pub fn compare_runs(a: &RunSummary, b: &RunSummary) -> Ordering {
    a.parameter_value
        .total_cmp(&b.parameter_value)
        .then_with(|| a.run_id.cmp(&b.run_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(id: &str, parameter_value: f64) -> RunSummary {
        RunSummary {
            run_id: id.to_string(),
            parameter_value,
            conductivity: 1.0,
            mean_coordination: 2.0,
            mean_type_fractions: [0.0, 0.5, 0.25, 0.25],
            frames_analyzed: 1,
            cation_diffusion: None,
            anion_diffusion: None,
            cation_conductivity: None,
        }
    }

    #[test]
    fn table_sorts_by_parameter_then_run_id() {
        let table = StudyTable::new(vec![run("run_c", 2.0), run("run_b", 1.0), run("run_a", 2.0)]);
        let ids: Vec<&str> = table.rows().iter().map(|r| r.run_id.as_str()).collect();
        assert_eq!(ids, vec!["run_b", "run_a", "run_c"]);
        assert!(table.find("run_a").is_some());
    }

    #[test]
    fn mean_composition_averages_counts_and_fractions() {
        let a = [0.0, 1.0, 0.0, 0.0];
        let b = [0.0, 0.5, 0.5, 0.0];
        let (cn, fractions) = mean_composition([(1.0, &a), (2.0, &b)]).unwrap();
        assert!((cn - 1.5).abs() < 1e-12);
        assert_eq!(fractions, [0.0, 0.75, 0.25, 0.0]);
        assert!(mean_composition(std::iter::empty::<(f64, &[f64; 4])>()).is_none());
    }

    #[test]
    fn cation_conductivity_needs_both_diffusivities() {
        let mut record = TransportRecord {
            parameter_value: 0.5,
            conductivity: 2.0,
            cation_diffusion: Some(3.0),
            anion_diffusion: None,
        };
        assert_eq!(record.cation_conductivity(), None);
        record.anion_diffusion = Some(1.0);
        let value = record.cation_conductivity().unwrap();
        assert!((value - 1.5).abs() < 1e-12);
    }
}
