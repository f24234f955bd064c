use crate::error::AnalysisResult;
use crate::run::aggregate_run;
use coordination_common::{AnalysisParams, RunSummary, StudyTable};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Run directories directly under `study_directory` whose name starts with `run_prefix`,
/// sorted by name.
pub fn find_run_directories(study_directory: &Path, run_prefix: &str) -> AnalysisResult<Vec<PathBuf>> {
    let mut runs = Vec::new();
    for entry in fs::read_dir(study_directory)? {
        let path = entry?.path();
        let is_run = path
            .file_name()
            .map_or(false, |name| name.to_string_lossy().starts_with(run_prefix));
        if !is_run {
            continue;
        }
        // `Path::is_dir` follows symlinks.
        if path.is_dir() {
            runs.push(path);
        } else {
            debug!("Skipping '{}': not a directory", path.display());
        }
    }
    runs.sort();
    Ok(runs)
}

/// Analyzes every run of a study in parallel.
///
/// A run that fails is logged and left out of the table; the others are
/// unaffected. The table is ordered by parameter value, then run id.
pub fn aggregate_study(study_directory: &Path, params: &AnalysisParams) -> AnalysisResult<StudyTable> {
    let runs = find_run_directories(study_directory, &params.run_prefix)?;
    if runs.is_empty() {
        warn!(
            "No directories starting with '{}' found in {}",
            params.run_prefix,
            study_directory.display()
        );
    }
    info!("Analyzing {} runs in {}", runs.len(), study_directory.display());

    let outcomes: Vec<(PathBuf, AnalysisResult<RunSummary>)> = runs
        .into_par_iter()
        .map(|run_dir| {
            let outcome = aggregate_run(&run_dir, params);
            (run_dir, outcome)
        })
        .collect();

    let mut summaries = Vec::with_capacity(outcomes.len());
    let mut failed = 0;
    for (run_dir, outcome) in outcomes {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                failed += 1;
                error!("Excluding run '{}': {}", run_dir.display(), e);
            }
        }
    }

    if failed > 0 {
        warn!("{} of {} runs excluded from the study table", failed, failed + summaries.len());
    }
    Ok(StudyTable::new(summaries))
}
