//! Periodic-boundary coordination analysis of electrolyte MD trajectories.
//!
//! Data flows upward: [`dump`] parses frames, [`engine`] counts neighbors of
//! one reference particle under the minimum-image convention, [`sampler`]
//! averages over reference particles of a frame, [`run`] over the frames of
//! one run, and [`study`] collects one row per run.

pub mod dump;
pub mod engine;
pub mod error;
pub mod pbc;
pub mod run;
pub mod sampler;
pub mod study;

pub use dump::{open_frame, read_snapshot, DumpReader};
pub use engine::compute_coordination;
pub use error::{AnalysisError, AnalysisResult};
pub use pbc::PeriodicBox;
pub use run::{aggregate_run, read_transport_record};
pub use sampler::{sample_snapshot, SnapshotSampler};
pub use study::{aggregate_study, find_run_directories};
