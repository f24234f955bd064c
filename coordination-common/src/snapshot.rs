use crate::vecmath::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Number of particle types declared in the electrolyte model.
pub const NUM_PARTICLE_TYPES: usize = 4;

/// Particle species as encoded in the trajectory dump `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ParticleType {
    /// Type 1: monomer site (declared but absent from this dataset).
    MonomerAbsent,
    /// Type 2: cation (Li+).
    Cation,
    /// Type 3: anion.
    Anion,
    /// Type 4: monomer site present in the simulation.
    Monomer,
}

impl ParticleType {
    pub const ALL: [ParticleType; NUM_PARTICLE_TYPES] = [
        ParticleType::MonomerAbsent,
        ParticleType::Cation,
        ParticleType::Anion,
        ParticleType::Monomer,
    ];

    /// The integer code used in dump files (1..=4).
    pub fn code(self) -> u8 {
        match self {
            ParticleType::MonomerAbsent => 1,
            ParticleType::Cation => 2,
            ParticleType::Anion => 3,
            ParticleType::Monomer => 4,
        }
    }

    /// Zero-based slot in per-type arrays.
    #[inline(always)]
    pub fn index(self) -> usize {
        self.code() as usize - 1
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ParticleType::MonomerAbsent),
            2 => Some(ParticleType::Cation),
            3 => Some(ParticleType::Anion),
            4 => Some(ParticleType::Monomer),
            _ => None,
        }
    }
}

impl TryFrom<u8> for ParticleType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        ParticleType::from_code(code)
            .ok_or_else(|| format!("unknown particle type {} (expected 1-4)", code))
    }
}

impl From<ParticleType> for u8 {
    fn from(t: ParticleType) -> u8 {
        t.code()
    }
}

impl fmt::Display for ParticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParticleType::MonomerAbsent => "monomer (absent)",
            ParticleType::Cation => "cation",
            ParticleType::Anion => "anion",
            ParticleType::Monomer => "monomer",
        };
        write!(f, "{} ({})", self.code(), name)
    }
}

/// One particle record of a trajectory frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: u64,
    pub kind: ParticleType,
    /// Raw dump coordinates; the box is centered on the origin so these may be negative.
    pub position: Vec3,
}

impl Particle {
    pub fn new(id: u64, kind: ParticleType, position: Vec3) -> Self {
        Self { id, kind, position }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("particle id {0} appears more than once in the snapshot")]
pub struct DuplicateParticleId(pub u64);

/// All particles of a single trajectory frame, in file order, with an id index.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    particles: Vec<Particle>,
    by_id: HashMap<u64, usize>,
}

impl Snapshot {
    /// Builds a snapshot, rejecting duplicate particle ids.
    pub fn new(particles: Vec<Particle>) -> Result<Self, DuplicateParticleId> {
        let mut by_id = HashMap::with_capacity(particles.len());
        for (idx, p) in particles.iter().enumerate() {
            if by_id.insert(p.id, idx).is_some() {
                return Err(DuplicateParticleId(p.id));
            }
        }
        Ok(Self { particles, by_id })
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Particle> {
        self.by_id.get(&id).map(|&idx| &self.particles[idx])
    }

    /// Particles of the given type, in snapshot order.
    pub fn of_type(&self, kind: ParticleType) -> impl Iterator<Item = &Particle> + '_ {
        self.particles.iter().filter(move |p| p.kind == kind)
    }
}
