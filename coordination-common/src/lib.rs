pub mod config;
pub mod params;
pub mod snapshot;
pub mod summary;
pub mod table;
pub mod vecmath;

// Re-export key types for easier use by dependent crates
pub use config::{AnalysisConfig, BoxConfig, CoordinationConfig, FramesConfig, StudyConfig, OutputConfig, SamplingStrategy};
pub use params::AnalysisParams;
pub use snapshot::{DuplicateParticleId, Particle, ParticleType, Snapshot, NUM_PARTICLE_TYPES};
pub use summary::{mean_composition, CoordinationResult, RunSummary, SnapshotSummary, StudyTable, TransportRecord};
pub use table::{read_table, write_table, write_transport_report, TableFormat, TableRow};
pub use vecmath::Vec3;
