use crate::engine::coordination_around;
use crate::error::{AnalysisError, AnalysisResult};
use crate::pbc::PeriodicBox;
use coordination_common::{
    mean_composition, AnalysisParams, CoordinationResult, Particle, ParticleType, SamplingStrategy,
    Snapshot, SnapshotSummary,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

/// Per-snapshot sampling of reference particles of one type.
#[derive(Debug, Clone)]
pub struct SnapshotSampler {
    pub target_type: ParticleType,
    pub cutoff_radius: f64,
    pub sample_size: usize,
    pub strategy: SamplingStrategy,
    pub seed: u64,
    pub periodic: PeriodicBox,
}

impl SnapshotSampler {
    pub fn from_params(params: &AnalysisParams) -> AnalysisResult<Self> {
        if params.sample_size == 0 {
            return Err(AnalysisError::InvalidParameter("sample size must be at least 1".into()));
        }
        Ok(Self {
            target_type: params.target_type,
            cutoff_radius: params.cutoff_radius,
            sample_size: params.sample_size,
            strategy: params.sampling,
            seed: params.seed,
            periodic: PeriodicBox::new(params.half_length)?,
        })
    }

    /// Picks the reference particles for `frame_id`.
    ///
    /// `First` keeps file order, which may bias the sample when dump order
    /// follows particle creation or position. `Random` draws without
    /// replacement from an RNG seeded by the configured seed and the frame id.
    pub fn select<'a>(&self, frame_id: u64, snapshot: &'a Snapshot) -> AnalysisResult<Vec<&'a Particle>> {
        let mut candidates: Vec<&Particle> = snapshot.of_type(self.target_type).collect();
        if candidates.len() < self.sample_size {
            return Err(AnalysisError::InsufficientSample {
                target: self.target_type,
                found: candidates.len(),
                required: self.sample_size,
            });
        }
        match self.strategy {
            SamplingStrategy::First => candidates.truncate(self.sample_size),
            SamplingStrategy::Random => {
                let mut rng = StdRng::seed_from_u64(self.seed ^ frame_id.wrapping_mul(0x9E37_79B9_7F4A_7C15));
                candidates.shuffle(&mut rng);
                candidates.truncate(self.sample_size);
            }
        }
        Ok(candidates)
    }

    /// Averages the coordination of the selected references against the full snapshot.
    pub fn sample(&self, frame_id: u64, snapshot: &Snapshot) -> AnalysisResult<SnapshotSummary> {
        let references = self.select(frame_id, snapshot)?;

        // Any failing reference aborts the whole snapshot summary.
        let results: Vec<CoordinationResult> = references
            .par_iter()
            .map(|reference| {
                coordination_around(reference, snapshot.particles(), self.cutoff_radius, &self.periodic)
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        let (mean_coordination, mean_type_fractions) =
            mean_composition(results.iter().map(|r| (r.count as f64, &r.type_fractions)))
                .ok_or_else(|| AnalysisError::InvalidParameter("no reference particles selected".into()))?;
        let summary = SnapshotSummary {
            frame_id,
            sampled: results.len(),
            mean_coordination,
            mean_type_fractions,
        };
        debug!(
            "Frame {}: {} references, mean CN = {:.4}",
            frame_id, summary.sampled, summary.mean_coordination
        );
        Ok(summary)
    }
}

/// Mean coordination of the first `sample_size` particles of `target_type`.
pub fn sample_snapshot(
    target_type: ParticleType,
    particles: &Snapshot,
    cutoff_radius: f64,
    sample_size: usize,
    periodic: &PeriodicBox,
) -> AnalysisResult<SnapshotSummary> {
    if sample_size == 0 {
        return Err(AnalysisError::InvalidParameter("sample size must be at least 1".into()));
    }
    let sampler = SnapshotSampler {
        target_type,
        cutoff_radius,
        sample_size,
        strategy: SamplingStrategy::First,
        seed: 0,
        periodic: *periodic,
    };
    sampler.sample(0, particles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coordination_common::Vec3;

    const HALF: f64 = 11.1972;

    // Cations on a line 5 apart, each with a private anion shell of `i` anions.
    fn shells_snapshot(cations: usize) -> Snapshot {
        let mut particles = Vec::new();
        let mut next_id = 1;
        for i in 0..cations {
            let center = Vec3::new(-10.0 + 5.0 * i as f64, 0.0, 0.0);
            particles.push(Particle::new(next_id, ParticleType::Cation, center));
            next_id += 1;
            for k in 0..i {
                let offset = Vec3::new(0.0, 0.3 * (k + 1) as f64, 0.0);
                particles.push(Particle::new(next_id, ParticleType::Anion, center.add(offset)));
                next_id += 1;
            }
        }
        particles.push(Particle::new(next_id, ParticleType::Monomer, Vec3::new(0.0, 8.0, 8.0)));
        Snapshot::new(particles).unwrap()
    }

    #[test]
    fn averages_first_n_references() {
        let pbox = PeriodicBox::new(HALF).unwrap();
        let snap = shells_snapshot(4);
        let summary = sample_snapshot(ParticleType::Cation, &snap, 1.5, 3, &pbox).unwrap();
        // First three cations have 0, 1 and 2 anions: CN = 1, 2, 3.
        assert_eq!(summary.sampled, 3);
        assert!((summary.mean_coordination - 2.0).abs() < 1e-12);
        let expected_cation = (1.0 + 0.5 + 1.0 / 3.0) / 3.0;
        assert!((summary.mean_type_fractions[ParticleType::Cation.index()] - expected_cation).abs() < 1e-12);
        let sum: f64 = summary.mean_type_fractions.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_target_particle_is_insufficient_for_fifty() {
        let pbox = PeriodicBox::new(HALF).unwrap();
        let snap = shells_snapshot(1);
        let err = sample_snapshot(ParticleType::Cation, &snap, 1.5, 50, &pbox).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientSample { found: 1, required: 50, target: ParticleType::Cation }
        ));
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        let pbox = PeriodicBox::new(HALF).unwrap();
        let err = sample_snapshot(ParticleType::Cation, &shells_snapshot(2), 1.5, 0, &pbox).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter(_)));
    }

    #[test]
    fn random_selection_is_reproducible_and_distinct() {
        let snap = shells_snapshot(5);
        let sampler = SnapshotSampler {
            target_type: ParticleType::Cation,
            cutoff_radius: 1.5,
            sample_size: 3,
            strategy: SamplingStrategy::Random,
            seed: 11,
            periodic: PeriodicBox::new(HALF).unwrap(),
        };
        let ids = |frame| -> Vec<u64> {
            sampler.select(frame, &snap).unwrap().iter().map(|p| p.id).collect()
        };
        let first = ids(500_000);
        assert_eq!(first, ids(500_000));
        assert_eq!(first.len(), 3);
        let mut unique = first.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 3);
        assert!(first.iter().all(|id| snap.get(*id).map(|p| p.kind) == Some(ParticleType::Cation)));

        let summary = sampler.sample(500_000, &snap).unwrap();
        assert_eq!(summary.frame_id, 500_000);
        assert_eq!(summary.sampled, 3);
    }
}
