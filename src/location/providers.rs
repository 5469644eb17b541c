//! Reference data providers: built-in table, local CSV file, remote CSV.
//!
//! All three yield the same rows; the file layout is one row per line,
//! `region,locality,lat,lon`.

use super::types::{LocationSource, ReferenceRow};
use crate::error::{EstimateError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = "MovingEstimate/0.3 (reference-data)";

/// A read-only provider of reference rows.
pub trait ReferenceSource {
    /// Fetch every row of the dataset.
    fn fetch_rows(&self) -> Result<Vec<ReferenceRow>>;

    /// Provenance reported for a resolver built from this source.
    fn kind(&self) -> LocationSource;
}

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinLocality {
    region: &'static str,
    locality: &'static str,
    lat: f64,
    lon: f64,
}

const BUILTIN_LOCALITIES: &[BuiltinLocality] = &[
    BuiltinLocality { region: "1", locality: "Sapporo-shi", lat: 43.0642, lon: 141.3469 },
    BuiltinLocality { region: "2", locality: "Aomori-shi", lat: 40.8246, lon: 140.7406 },
    BuiltinLocality { region: "4", locality: "Sendai-shi", lat: 38.2682, lon: 140.8694 },
    BuiltinLocality { region: "11", locality: "Saitama-shi", lat: 35.8617, lon: 139.6455 },
    BuiltinLocality { region: "12", locality: "Chiba-shi", lat: 35.6074, lon: 140.1065 },
    BuiltinLocality { region: "13", locality: "Chiyoda", lat: 35.6940, lon: 139.7536 },
    BuiltinLocality { region: "13", locality: "Shinjuku", lat: 35.6938, lon: 139.7034 },
    BuiltinLocality { region: "13", locality: "Shibuya", lat: 35.6640, lon: 139.6982 },
    BuiltinLocality { region: "13", locality: "Setagaya", lat: 35.6466, lon: 139.6532 },
    BuiltinLocality { region: "14", locality: "Yokohama-shi", lat: 35.4478, lon: 139.6425 },
    BuiltinLocality { region: "15", locality: "Niigata-shi", lat: 37.9022, lon: 139.0236 },
    BuiltinLocality { region: "23", locality: "Nagoya-shi", lat: 35.1815, lon: 136.9066 },
    BuiltinLocality { region: "26", locality: "Kyoto-shi", lat: 35.0116, lon: 135.7681 },
    BuiltinLocality { region: "27", locality: "Osaka-shi", lat: 34.6937, lon: 135.5023 },
    BuiltinLocality { region: "28", locality: "Kobe-shi", lat: 34.6901, lon: 135.1955 },
    BuiltinLocality { region: "34", locality: "Hiroshima-shi", lat: 34.3853, lon: 132.4553 },
    BuiltinLocality { region: "40", locality: "Fukuoka-shi", lat: 33.5904, lon: 130.4017 },
    BuiltinLocality { region: "47", locality: "Naha-shi", lat: 26.2124, lon: 127.6809 },
];

/// The always-available built-in table.
pub struct BuiltinSource;

impl ReferenceSource for BuiltinSource {
    fn fetch_rows(&self) -> Result<Vec<ReferenceRow>> {
        Ok(builtin_rows())
    }

    fn kind(&self) -> LocationSource {
        LocationSource::Builtin
    }
}

pub fn builtin_rows() -> Vec<ReferenceRow> {
    BUILTIN_LOCALITIES
        .iter()
        .map(|b| ReferenceRow::new(b.region, b.locality, b.lat, b.lon))
        .collect()
}

// ─── CSV parsing ────────────────────────────────────────────────

/// Parse `region,locality,lat,lon` lines.
///
/// Blank lines are ignored. Lines with fewer than four fields or with
/// unparsable numbers are skipped with a warning. Extra trailing fields
/// are ignored. Region and locality are taken verbatim (no trimming).
pub fn parse_reference_csv(text: &str) -> Vec<ReferenceRow> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = Vec::new();

    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(row) => rows.push(row),
            None => tracing::warn!(line = i + 1, content = %line, "skipping malformed reference row"),
        }
    }

    rows
}

/// Parse reference text from `origin`, failing when it has content but no
/// usable row (an error page served in place of the dataset, say).
pub fn rows_from_text(text: &str, origin: &str) -> Result<Vec<ReferenceRow>> {
    let rows = parse_reference_csv(text);
    let has_content = text.lines().any(|l| !l.trim().trim_start_matches('\u{feff}').is_empty());
    if rows.is_empty() && has_content {
        return Err(EstimateError::DataSourceUnavailable(format!(
            "{}: no valid reference rows",
            origin
        )));
    }
    Ok(rows)
}

fn parse_line(line: &str) -> Option<ReferenceRow> {
    let mut fields = line.split(',');
    let region = fields.next()?;
    let locality = fields.next()?;
    let lat: f64 = fields.next()?.trim().parse().ok()?;
    let lon: f64 = fields.next()?.trim().parse().ok()?;
    if !lat.is_finite() || !lon.is_finite() {
        return None;
    }
    Some(ReferenceRow::new(region, locality, lat, lon))
}

// ─── CSV file provider ──────────────────────────────────────────

/// Reference rows from a local CSV file.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReferenceSource for CsvFileSource {
    fn fetch_rows(&self) -> Result<Vec<ReferenceRow>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            EstimateError::DataSourceUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let rows = rows_from_text(&text, &self.path.display().to_string())?;
        tracing::debug!(path = %self.path.display(), rows = rows.len(), "read reference file");
        Ok(rows)
    }

    fn kind(&self) -> LocationSource {
        LocationSource::File
    }
}

// ─── Remote provider ────────────────────────────────────────────

/// Reference rows fetched as CSV over HTTP, with a bounded timeout.
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReferenceSource for HttpSource {
    fn fetch_rows(&self) -> Result<Vec<ReferenceRow>> {
        let response = ureq::get(&self.url)
            .set("User-Agent", USER_AGENT)
            .timeout(self.timeout)
            .call()
            .map_err(|e| EstimateError::DataSourceUnavailable(format!("{}: {}", self.url, e)))?;

        let body = response
            .into_string()
            .map_err(|e| EstimateError::DataSourceUnavailable(format!("{}: {}", self.url, e)))?;

        let rows = rows_from_text(&body, &self.url)?;
        tracing::debug!(url = %self.url, rows = rows.len(), "fetched remote reference data");
        Ok(rows)
    }

    fn kind(&self) -> LocationSource {
        LocationSource::Remote
    }
}
