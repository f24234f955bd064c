use crate::error::{AnalysisError, AnalysisResult};
use crate::pbc::PeriodicBox;
use coordination_common::{CoordinationResult, Particle, Snapshot, NUM_PARTICLE_TYPES};
use log::trace;

/// Computes the coordination number and local composition around `reference_id`.
///
/// Every particle of the snapshot (the reference included) is shifted into the
/// box frame, folded into `[0, side)` and moved to its nearest periodic image
/// of the reference, axis by axis. Particles at distance `<= cutoff_radius`
/// are counted, so the reference always counts itself.
///
/// The single-shift image correction finds the true minimum-image distance
/// only while `cutoff_radius < box half length`.
pub fn compute_coordination(
    reference_id: u64,
    particles: &Snapshot,
    cutoff_radius: f64,
    periodic: &PeriodicBox,
) -> AnalysisResult<CoordinationResult> {
    let reference = particles
        .get(reference_id)
        .ok_or(AnalysisError::ReferenceNotFound(reference_id))?;
    coordination_around(reference, particles.particles(), cutoff_radius, periodic)
}

/// Same as [`compute_coordination`] for a reference particle already in hand.
pub fn coordination_around(
    reference: &Particle,
    particles: &[Particle],
    cutoff_radius: f64,
    periodic: &PeriodicBox,
) -> AnalysisResult<CoordinationResult> {
    if !(cutoff_radius >= 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "cutoff radius must be non-negative, got {}",
            cutoff_radius
        )));
    }

    let ref_pos = periodic.wrap(reference.position);
    let mut type_counts = [0u32; NUM_PARTICLE_TYPES];
    let mut count = 0u32;

    for particle in particles {
        let image = periodic.nearest_image(periodic.wrap(particle.position), ref_pos);
        if image.distance(ref_pos) <= cutoff_radius {
            count += 1;
            type_counts[particle.kind.index()] += 1;
        }
    }

    if count == 0 {
        return Err(AnalysisError::EmptyNeighborhood(reference.id));
    }

    let total = count as f64;
    let mut type_fractions = [0.0f64; NUM_PARTICLE_TYPES];
    for (fraction, &n) in type_fractions.iter_mut().zip(type_counts.iter()) {
        *fraction = n as f64 / total;
    }

    trace!("Particle {}: CN = {}, counts = {:?}", reference.id, count, type_counts);

    Ok(CoordinationResult {
        reference_id: reference.id,
        count,
        type_counts,
        type_fractions,
    })
}
