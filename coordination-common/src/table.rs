use crate::snapshot::NUM_PARTICLE_TYPES;
use crate::summary::{RunSummary, StudyTable};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Number of columns in the coordination table contract.
pub const TABLE_COLUMNS: usize = 3 + NUM_PARTICLE_TYPES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Headerless comma-separated rows, consumed by the plotting scripts.
    Csv,
    /// The full study table including run ids and transport details.
    Json,
}

impl TableFormat {
    pub fn from_name(name: Option<&str>) -> Result<Self> {
        match name.unwrap_or("csv") {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            other => anyhow::bail!("Unknown output format: '{}'.", other),
        }
    }
}

/// One row of the coordination table as seen by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub parameter_value: f64,
    pub conductivity: f64,
    pub mean_coordination: f64,
    pub mean_type_fractions: [f64; NUM_PARTICLE_TYPES],
}

impl From<&RunSummary> for TableRow {
    fn from(run: &RunSummary) -> Self {
        TableRow {
            parameter_value: run.parameter_value,
            conductivity: run.conductivity,
            mean_coordination: run.mean_coordination,
            mean_type_fractions: run.mean_type_fractions,
        }
    }
}

/// Shortest text that parses back to `value`, in exponent form when very small or large.
fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

impl TableRow {
    fn to_record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(TABLE_COLUMNS);
        record.push(format_value(self.parameter_value));
        record.push(format_value(self.conductivity));
        record.push(format_value(self.mean_coordination));
        record.extend(self.mean_type_fractions.iter().copied().map(format_value));
        record
    }

    fn from_record(record: &csv::StringRecord, row: usize) -> Result<Self> {
        if record.len() != TABLE_COLUMNS {
            anyhow::bail!("Row {} has {} fields, expected {}.", row, record.len(), TABLE_COLUMNS);
        }
        let mut values = [0.0f64; TABLE_COLUMNS];
        for (slot, field) in values.iter_mut().zip(record.iter()) {
            *slot = field
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Row {}: '{}' is not a number", row, field))?;
        }
        Ok(TableRow {
            parameter_value: values[0],
            conductivity: values[1],
            mean_coordination: values[2],
            mean_type_fractions: [values[3], values[4], values[5], values[6]],
        })
    }
}

/// Writes the coordination table rows without a header.
pub fn write_table_csv<W: Write>(table: &StudyTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for run in table.rows() {
        csv_writer.write_record(TableRow::from(run).to_record())?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Parses headerless coordination rows.
pub fn read_table_csv<R: Read>(reader: R) -> Result<Vec<TableRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read row {}", idx + 1))?;
        rows.push(TableRow::from_record(&record, idx + 1)?);
    }
    Ok(rows)
}

/// Writes the study table to `path` in the requested format.
pub fn write_table<P: AsRef<Path>>(table: &StudyTable, path: P, format: TableFormat) -> Result<()> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref)
        .with_context(|| format!("Error creating table file '{}'", path_ref.display()))?;
    match format {
        TableFormat::Csv => write_table_csv(table, file),
        TableFormat::Json => {
            serde_json::to_writer_pretty(file, table)
                .with_context(|| format!("Error serializing study table to '{}'", path_ref.display()))
        }
    }
}

/// Reads a CSV coordination table written by [`write_table`].
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<Vec<TableRow>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref)
        .with_context(|| format!("Error opening table file '{}'", path_ref.display()))?;
    read_table_csv(file)
}

/// Writes per-run transport values (with a header row) next to the coordination table.
pub fn write_transport_report<P: AsRef<Path>>(table: &StudyTable, path: P) -> Result<()> {
    let path_ref = path.as_ref();
    let mut writer = csv::Writer::from_path(path_ref)
        .with_context(|| format!("Error creating transport report '{}'", path_ref.display()))?;
    writer.write_record([
        "run_id",
        "parameter_value",
        "conductivity",
        "cation_diffusion",
        "anion_diffusion",
        "cation_conductivity",
    ])?;
    let optional = |v: Option<f64>| v.map(format_value).unwrap_or_default();
    for run in table.rows() {
        let transport = run.transport();
        writer.write_record([
            run.run_id.clone(),
            format_value(transport.parameter_value),
            format_value(transport.conductivity),
            optional(transport.cation_diffusion),
            optional(transport.anion_diffusion),
            optional(transport.cation_conductivity()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
