//! Flat tabular input and output.
//!
//! # Overview
//!
//! Three CSV tables feed the engines, all keyed by literal-encoded station
//! identifiers (see [`crate::literal`]):
//!
//! | table   | columns                                                  |
//! |---------|----------------------------------------------------------|
//! | nodes   | `Nearest_Stop`, `location`, `borough`, `routes`          |
//! | edges   | `from`, `to`, and a weight column (`ridership` or `total_ridership`) |
//! | targets | `Nearest_Stop`, `Connections`, `ridership`               |
//!
//! Extra columns (a leftover dataframe index, for instance) are ignored.
//! The solved flow table is written back as `from,to,ridership`.
//!
//! Rows are validated as they are read; any problem is reported as
//! [`AnalysisError::MalformedInput`] naming the table and line.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::AnalysisError;
use crate::literal;
use crate::model::{Station, StationKey};

/// Weight columns probed, in order, when no explicit column is configured.
pub const DEFAULT_WEIGHT_COLUMNS: [&str; 3] = ["ridership", "total_ridership", "weight"];

/// One row of an edge table.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub from: StationKey,
    pub to: StationKey,
    pub weight: f64,
}

/// One row of the ridership-target table.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetRow {
    pub key: StationKey,
    /// Stations this one connects to. Carried through but not used by the
    /// flow model, which links every pair.
    pub connections: Vec<StationKey>,
    pub ridership: f64,
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

/// Read the node table.
///
/// # Errors
///
/// Returns an error if the CSV is unreadable, the `Nearest_Stop` column is
/// missing, or a cell fails to parse.
pub fn read_nodes<R: Read>(reader: R) -> Result<Vec<Station>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers().context("reading node table header")?.clone();
    let key_col = require_column(&headers, "nodes", "Nearest_Stop")?;
    let location_col = find_column(&headers, "location");
    let borough_col = find_column(&headers, "borough");
    let routes_col = find_column(&headers, "routes");

    let mut stations = Vec::new();
    for result in rdr.records() {
        let record = result.context("parsing node table record")?;
        let line = line_of(&record);
        let key = StationKey::parse_literal(cell(&record, key_col))
            .map_err(|e| at_line("nodes", line, &e))?;

        let location = match location_col.map(|c| cell(&record, c)) {
            Some(raw) if !raw.is_empty() => {
                Some(literal::parse_position(raw).map_err(|e| at_line("nodes", line, &e))?)
            }
            _ => None,
        };
        let borough = borough_col
            .map(|c| cell(&record, c))
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        let routes = match routes_col.map(|c| cell(&record, c)) {
            Some(raw) => literal::parse_string_set(raw)
                .map_err(|e| at_line("nodes", line, &e))?
                .into_iter()
                .collect(),
            None => Default::default(),
        };

        stations.push(Station {
            key,
            location,
            borough,
            routes,
        });
    }

    debug!(count = stations.len(), "read node table");
    Ok(stations)
}

/// Read an edge table.
///
/// `weight_column` selects the weight column; when `None` the first of
/// [`DEFAULT_WEIGHT_COLUMNS`] present in the header is used.
///
/// # Errors
///
/// Returns an error if the CSV is unreadable, required columns are absent,
/// or a row carries a malformed key or a negative / non-finite weight.
pub fn read_edges<R: Read>(reader: R, weight_column: Option<&str>) -> Result<Vec<EdgeRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers().context("reading edge table header")?.clone();
    let from_col = require_column(&headers, "edges", "from")?;
    let to_col = require_column(&headers, "edges", "to")?;
    let weight_col = match weight_column {
        Some(name) => require_column(&headers, "edges", name)?,
        None => DEFAULT_WEIGHT_COLUMNS
            .iter()
            .find_map(|name| find_column(&headers, name))
            .ok_or_else(|| {
                AnalysisError::malformed(format!(
                    "edges: no weight column (expected one of {})",
                    DEFAULT_WEIGHT_COLUMNS.join(", ")
                ))
            })?,
    };

    let mut edges = Vec::new();
    for result in rdr.records() {
        let record = result.context("parsing edge table record")?;
        let line = line_of(&record);
        let from = StationKey::parse_literal(cell(&record, from_col))
            .map_err(|e| at_line("edges", line, &e))?;
        let to = StationKey::parse_literal(cell(&record, to_col))
            .map_err(|e| at_line("edges", line, &e))?;
        let weight = parse_non_negative(cell(&record, weight_col))
            .map_err(|e| at_line("edges", line, &e))?;
        edges.push(EdgeRow { from, to, weight });
    }

    debug!(count = edges.len(), "read edge table");
    Ok(edges)
}

/// Read the ridership-target table.
///
/// # Errors
///
/// Returns an error if the CSV is unreadable, required columns are absent,
/// or a row is malformed.
pub fn read_targets<R: Read>(reader: R) -> Result<Vec<TargetRow>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers().context("reading target table header")?.clone();
    let key_col = require_column(&headers, "targets", "Nearest_Stop")?;
    let ridership_col = require_column(&headers, "targets", "ridership")?;
    let connections_col = find_column(&headers, "Connections");

    let mut targets = Vec::new();
    for result in rdr.records() {
        let record = result.context("parsing target table record")?;
        let line = line_of(&record);
        let key = StationKey::parse_literal(cell(&record, key_col))
            .map_err(|e| at_line("targets", line, &e))?;
        let ridership = parse_non_negative(cell(&record, ridership_col))
            .map_err(|e| at_line("targets", line, &e))?;
        let connections = match connections_col.map(|c| cell(&record, c)) {
            Some(raw) if !raw.is_empty() => {
                parse_key_collection(raw).map_err(|e| at_line("targets", line, &e))?
            }
            _ => Vec::new(),
        };
        targets.push(TargetRow {
            key,
            connections,
            ridership,
        });
    }

    debug!(count = targets.len(), "read target table");
    Ok(targets)
}

/// Open and read a node table from `path`.
///
/// # Errors
///
/// See [`read_nodes`]; also fails if the file cannot be opened.
pub fn load_nodes(path: &Path) -> Result<Vec<Station>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_nodes(file).with_context(|| format!("loading nodes from {}", path.display()))
}

/// Open and read an edge table from `path`.
///
/// # Errors
///
/// See [`read_edges`]; also fails if the file cannot be opened.
pub fn load_edges(path: &Path, weight_column: Option<&str>) -> Result<Vec<EdgeRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_edges(file, weight_column)
        .with_context(|| format!("loading edges from {}", path.display()))
}

/// Open and read a target table from `path`.
///
/// # Errors
///
/// See [`read_targets`]; also fails if the file cannot be opened.
pub fn load_targets(path: &Path) -> Result<Vec<TargetRow>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_targets(file).with_context(|| format!("loading targets from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Write `(from, to, flow)` rows as `from,to,ridership` CSV.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_flows<'a, W, I>(writer: W, rows: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = (&'a StationKey, &'a StationKey, f64)>,
{
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(["from", "to", "ridership"])
        .context("writing flow header")?;
    for (from, to, flow) in rows {
        wtr.write_record([from.to_literal(), to.to_literal(), flow.to_string()])
            .context("writing flow row")?;
    }
    wtr.flush().context("flushing flow table")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn require_column(headers: &StringRecord, table: &str, name: &str) -> Result<usize> {
    find_column(headers, name).ok_or_else(|| {
        AnalysisError::malformed(format!("{table}: missing required column `{name}`")).into()
    })
}

fn cell(record: &StringRecord, col: usize) -> &str {
    record.get(col).unwrap_or("").trim()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

fn at_line(table: &str, line: u64, err: &AnalysisError) -> AnalysisError {
    let detail = match err {
        AnalysisError::MalformedInput { context } => context.clone(),
        other => other.to_string(),
    };
    AnalysisError::malformed(format!("{table} line {line}: {detail}"))
}

fn parse_non_negative(raw: &str) -> Result<f64, AnalysisError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| AnalysisError::malformed(format!("`{raw}` is not a number")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(AnalysisError::malformed(format!(
            "`{raw}` must be a finite non-negative number"
        )));
    }
    Ok(value)
}

fn parse_key_collection(raw: &str) -> Result<Vec<StationKey>, AnalysisError> {
    let lit = literal::parse(raw)?;
    let items = lit
        .items()
        .ok_or_else(|| AnalysisError::malformed(format!("`{raw}` is not a collection")))?;
    items
        .iter()
        .map(|item| match item.items() {
            Some([literal::Literal::Str(stop), literal::Literal::Str(line)]) => {
                Ok(StationKey::new(stop.as_str(), line.as_str()))
            }
            _ => match item.as_str() {
                Some(stop) => Ok(StationKey::new(stop, "")),
                None => Err(AnalysisError::malformed(format!(
                    "`{raw}` contains a non-station element"
                ))),
            },
        })
        .collect()
}
