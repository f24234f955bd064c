use crate::error::{AnalysisError, AnalysisResult};
use coordination_common::{Particle, ParticleType, Snapshot, Vec3};
use log::trace;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::Path;

// Column layout of a dump record: id, molecule id, type, x, y, z, ...
const ID_FIELD: usize = 0;
const TYPE_FIELD: usize = 2;
const POSITION_FIELD: usize = 3;
const MIN_FIELDS: usize = POSITION_FIELD + 3;

/// Streams the particle records of one trajectory frame.
///
/// The first `header_lines` lines are skipped without validation. Every
/// remaining non-blank line is one particle. The reader is single-pass;
/// open the frame again to re-read it.
pub struct DumpReader<R: BufRead> {
    lines: Lines<R>,
    source_name: String,
    header_lines: usize,
    line_no: usize,
    header_skipped: bool,
    finished: bool,
}

impl<R: BufRead> DumpReader<R> {
    pub fn new(reader: R, source_name: impl Into<String>, header_lines: usize) -> Self {
        Self {
            lines: reader.lines(),
            source_name: source_name.into(),
            header_lines,
            line_no: 0,
            header_skipped: false,
            finished: false,
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> AnalysisError {
        AnalysisError::MalformedFrame {
            source_name: self.source_name.clone(),
            line: self.line_no,
            reason: reason.into(),
        }
    }

    fn skip_header(&mut self) -> AnalysisResult<()> {
        for skipped in 0..self.header_lines {
            match self.lines.next() {
                Some(line) => {
                    line?;
                    self.line_no += 1;
                }
                None => {
                    return Err(self.malformed(format!(
                        "header ended after {} of {} lines",
                        skipped, self.header_lines
                    )))
                }
            }
        }
        self.header_skipped = true;
        Ok(())
    }

    fn parse_record(&self, line: &str) -> AnalysisResult<Particle> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(self.malformed(format!(
                "expected at least {} fields, found {}",
                MIN_FIELDS,
                fields.len()
            )));
        }
        let id = fields[ID_FIELD]
            .parse::<u64>()
            .map_err(|_| self.malformed(format!("invalid particle id '{}'", fields[ID_FIELD])))?;
        let kind = fields[TYPE_FIELD]
            .parse::<u8>()
            .ok()
            .and_then(ParticleType::from_code)
            .ok_or_else(|| self.malformed(format!("invalid particle type '{}'", fields[TYPE_FIELD])))?;
        let mut position = [0.0f64; 3];
        for (axis, slot) in position.iter_mut().enumerate() {
            let field = fields[POSITION_FIELD + axis];
            *slot = field
                .parse::<f64>()
                .map_err(|_| self.malformed(format!("invalid coordinate '{}'", field)))?;
            if !slot.is_finite() {
                return Err(self.malformed(format!("non-finite coordinate '{}'", field)));
            }
        }
        Ok(Particle::new(id, kind, Vec3::from(position)))
    }
}

impl<R: BufRead> Iterator for DumpReader<R> {
    type Item = AnalysisResult<Particle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if !self.header_skipped {
            if let Err(e) = self.skip_header() {
                self.finished = true;
                return Some(Err(e));
            }
        }
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = self.parse_record(&line);
            if record.is_err() {
                self.finished = true;
            }
            return Some(record);
        }
    }
}

/// Opens a frame file for streaming. A missing file is reported as `MissingFrame`.
pub fn open_frame(path: &Path, header_lines: usize) -> AnalysisResult<DumpReader<BufReader<File>>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AnalysisError::MissingFrame(path.to_path_buf()),
        _ => AnalysisError::Io(e),
    })?;
    Ok(DumpReader::new(
        BufReader::new(file),
        path.display().to_string(),
        header_lines,
    ))
}

/// Collects a streamed frame into an in-memory snapshot (single parse pass).
pub fn collect_snapshot<R: BufRead>(reader: DumpReader<R>) -> AnalysisResult<Snapshot> {
    let source_name = reader.source_name.clone();
    let particles = reader.collect::<AnalysisResult<Vec<Particle>>>()?;
    trace!("Parsed {} particles from {}", particles.len(), source_name);
    Snapshot::new(particles).map_err(|dup| AnalysisError::MalformedFrame {
        source_name,
        line: 0,
        reason: dup.to_string(),
    })
}

/// Reads one frame file into memory.
pub fn read_snapshot(path: &Path, header_lines: usize) -> AnalysisResult<Snapshot> {
    collect_snapshot(open_frame(path, header_lines)?)
}
