use crate::dump::read_snapshot;
use crate::error::{AnalysisError, AnalysisResult};
use crate::sampler::SnapshotSampler;
use coordination_common::{mean_composition, AnalysisParams, RunSummary, TransportRecord};
use log::{debug, info};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;
use std::time::Instant;

/// Reads the run's auxiliary results record.
///
/// After `header_lines` skipped lines the record holds one number per line:
/// the control parameter, the conductivity and, optionally, the cation and
/// anion diffusion coefficients.
pub fn read_transport_record(path: &Path, header_lines: usize) -> AnalysisResult<TransportRecord> {
    let missing = |reason: String| AnalysisError::MissingRunData {
        path: path.to_path_buf(),
        reason,
    };
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => missing("results record not found".into()),
        _ => AnalysisError::Io(e),
    })?;

    let mut values = Vec::with_capacity(4);
    for (idx, line) in BufReader::new(file).lines().enumerate().skip(header_lines) {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 1 {
            return Err(missing(format!(
                "line {} has {} fields, expected a single value",
                idx + 1,
                fields.len()
            )));
        }
        let value = fields[0]
            .parse::<f64>()
            .map_err(|_| missing(format!("line {}: '{}' is not a number", idx + 1, fields[0])))?;
        values.push(value);
        if values.len() == 4 {
            break;
        }
    }

    if values.len() < 2 {
        return Err(missing(format!(
            "expected parameter and conductivity after {} header lines, found {} values",
            header_lines,
            values.len()
        )));
    }

    Ok(TransportRecord {
        parameter_value: values[0],
        conductivity: values[1],
        cation_diffusion: values.get(2).copied(),
        anion_diffusion: values.get(3).copied(),
    })
}

/// Analyzes every configured frame of one run directory.
///
/// Any missing frame, malformed frame or sampling failure aborts the run; no
/// partial summary is produced.
pub fn aggregate_run(run_directory: &Path, params: &AnalysisParams) -> AnalysisResult<RunSummary> {
    if params.frame_ids.is_empty() {
        return Err(AnalysisError::InvalidParameter("no frame ids to analyze".into()));
    }
    let run_id = run_directory
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| run_directory.display().to_string());
    let start_time = Instant::now();

    let transport = read_transport_record(
        &run_directory.join(&params.results_file),
        params.results_header_lines,
    )?;
    info!(
        "Run '{}': parameter = {}, conductivity = {}",
        run_id, transport.parameter_value, transport.conductivity
    );

    let sampler = SnapshotSampler::from_params(params)?;
    let mut frames = Vec::with_capacity(params.frame_ids.len());
    for &frame_id in &params.frame_ids {
        let path = run_directory.join(params.frame_file_name(frame_id));
        let snapshot = read_snapshot(&path, params.frame_header_lines)?;
        debug!("Run '{}': frame {} has {} particles", run_id, frame_id, snapshot.len());
        frames.push(sampler.sample(frame_id, &snapshot)?);
    }

    let (mean_coordination, mean_type_fractions) =
        mean_composition(frames.iter().map(|f| (f.mean_coordination, &f.mean_type_fractions)))
            .ok_or_else(|| AnalysisError::InvalidParameter("no frames analyzed".into()))?;
    info!(
        "Run '{}' done: {} frames, mean CN = {:.4} ({:.2} s)",
        run_id,
        frames.len(),
        mean_coordination,
        start_time.elapsed().as_secs_f64()
    );

    Ok(RunSummary {
        run_id,
        parameter_value: transport.parameter_value,
        conductivity: transport.conductivity,
        mean_coordination,
        mean_type_fractions,
        frames_analyzed: frames.len(),
        cation_diffusion: transport.cation_diffusion,
        anion_diffusion: transport.anion_diffusion,
        cation_conductivity: transport.cation_conductivity(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fmt::Write as _;
    use std::fs;
    use std::path::Path;

    pub const HALF: f64 = 11.1972167393518;

    /// Writes a dump frame with the standard 9-line header.
    pub fn write_frame(path: &Path, records: &[(u64, u8, [f64; 3])]) {
        let mut text = format!(
            "ITEM: TIMESTEP\n0\nITEM: NUMBER OF ATOMS\n{}\nITEM: BOX BOUNDS pp pp pp\n\
{h0} {h1}\n{h0} {h1}\n{h0} {h1}\nITEM: ATOMS id mol type x y z\n",
            records.len(),
            h0 = -HALF,
            h1 = HALF
        );
        for (id, kind, [x, y, z]) in records {
            writeln!(text, "{} 1 {} {} {} {}", id, kind, x, y, z).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    /// Writes a results record: 11 header lines then one value per line.
    pub fn write_results(path: &Path, values: &[f64]) {
        let mut text: String = (0..11).map(|i| format!("# header {}\n", i)).collect();
        for v in values {
            writeln!(text, "{}", v).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    /// A run directory with two cations, each 1.0 from one anion, in frames 0 and 10.
    pub fn write_run(dir: &Path, parameter: f64, conductivity: f64) {
        fs::create_dir_all(dir).unwrap();
        write_results(&dir.join("conductivity.data"), &[parameter, conductivity]);
        write_frame(
            &dir.join("dump0"),
            &[
                (1, 2, [0.0, 0.0, 0.0]),
                (2, 3, [1.0, 0.0, 0.0]),
                (3, 2, [5.0, 5.0, 5.0]),
                (4, 3, [5.0, 6.0, 5.0]),
            ],
        );
        // Second frame: the first cation's anion sits across the x boundary.
        write_frame(
            &dir.join("dump10"),
            &[
                (1, 2, [-HALF + 0.2, 0.0, 0.0]),
                (2, 3, [HALF - 0.3, 0.0, 0.0]),
                (3, 2, [5.0, 5.0, 5.0]),
                (4, 4, [5.0, 5.0, 5.0]),
                (5, 3, [5.5, 5.0, 5.0]),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use coordination_common::AnalysisConfig;

    fn params(sample_size: usize) -> AnalysisParams {
        let toml = format!(
            "[coordination]\nsample_size = {}\n[frames]\nids = [0, 10]\n[study]\ndirectory = \".\"\n",
            sample_size
        );
        AnalysisConfig::from_toml_str(&toml).unwrap().get_analysis_params()
    }

    #[test]
    fn reads_parameter_conductivity_and_diffusion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conductivity.data");
        write_results(&path, &[0.35, 1.25e-3, 4.0e-6, 1.0e-6]);
        let record = read_transport_record(&path, 11).unwrap();
        assert_eq!(record.parameter_value, 0.35);
        assert_eq!(record.conductivity, 1.25e-3);
        assert_eq!(record.cation_diffusion, Some(4.0e-6));
        assert_eq!(record.anion_diffusion, Some(1.0e-6));
        assert!((record.cation_conductivity().unwrap() - 1.0e-3).abs() < 1e-15);
    }

    #[test]
    fn short_or_missing_record_is_missing_run_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conductivity.data");
        assert!(matches!(
            read_transport_record(&path, 11),
            Err(AnalysisError::MissingRunData { .. })
        ));
        write_results(&path, &[0.35]);
        assert!(matches!(
            read_transport_record(&path, 11),
            Err(AnalysisError::MissingRunData { .. })
        ));
        std::fs::write(&path, "h\n".repeat(11) + "0.35 extra\n1.0\n").unwrap();
        assert!(matches!(
            read_transport_record(&path, 11),
            Err(AnalysisError::MissingRunData { .. })
        ));
    }

    #[test]
    fn averages_over_frames() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("run_a");
        write_run(&run_dir, 0.5, 2.0e-3);
        let summary = aggregate_run(&run_dir, &params(2)).unwrap();
        assert_eq!(summary.run_id, "run_a");
        assert_eq!(summary.parameter_value, 0.5);
        assert_eq!(summary.conductivity, 2.0e-3);
        assert_eq!(summary.frames_analyzed, 2);
        // Frame 0: CN 2 and 2. Frame 10: CN 2 (wrapped anion) and 3.
        assert!((summary.mean_coordination - 2.25).abs() < 1e-12);
        let f = summary.mean_type_fractions;
        let expected_cation = (0.5 + (0.5 + 1.0 / 3.0) / 2.0) / 2.0;
        assert!((f[1] - expected_cation).abs() < 1e-12);
        assert!((f.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(summary.cation_conductivity.is_none());
    }

    #[test]
    fn missing_frame_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("run_a");
        write_run(&run_dir, 0.5, 2.0e-3);
        std::fs::remove_file(run_dir.join("dump10")).unwrap();
        let err = aggregate_run(&run_dir, &params(2)).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingFrame(p) if p.ends_with("dump10")));
    }

    #[test]
    fn insufficient_sample_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("run_a");
        write_run(&run_dir, 0.5, 2.0e-3);
        let err = aggregate_run(&run_dir, &params(50)).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientSample { found: 2, required: 50, .. }));
    }
}
