//! Location resolver — loads the reference dataset and answers lookups.
//!
//! Load flow (remote):  fresh snapshot → remote fetch → stale snapshot → error
//! Load flow (file):    CSV file → error
//! Load flow (builtin): built-in table

use super::cache::SnapshotCache;
use super::index::{DuplicatePolicy, ReferenceIndex};
use super::providers::{builtin_rows, BuiltinSource, CsvFileSource, HttpSource, ReferenceSource};
use super::types::{Coordinate, LocationSource, ReferenceRow};
use crate::config::ReferenceConfig;
use crate::error::{EstimateError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Resolves (region, locality) pairs against an immutable reference index.
///
/// Cloning is cheap; clones share the index.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    index: Arc<ReferenceIndex>,
    source: LocationSource,
}

impl LocationResolver {
    /// Resolver over the built-in dataset.
    pub fn builtin() -> Self {
        Self {
            index: Arc::new(ReferenceIndex::last_wins(builtin_rows())),
            source: LocationSource::Builtin,
        }
    }

    /// Resolver over caller-supplied rows.
    pub fn from_rows(rows: Vec<ReferenceRow>, duplicates: DuplicatePolicy) -> Result<Self> {
        Ok(Self {
            index: Arc::new(ReferenceIndex::build(rows, duplicates)?),
            source: LocationSource::Manual,
        })
    }

    /// Resolver over any reference provider.
    pub fn from_source(source: &dyn ReferenceSource, duplicates: DuplicatePolicy) -> Result<Self> {
        let rows = source.fetch_rows()?;
        Ok(Self {
            index: Arc::new(ReferenceIndex::build(rows, duplicates)?),
            source: source.kind(),
        })
    }

    /// Load the configured source. Failures surface as `DataSourceUnavailable`.
    pub fn load(
        config: &ReferenceConfig,
        duplicates: DuplicatePolicy,
        cache: &mut SnapshotCache,
        offline: bool,
    ) -> Result<Self> {
        match config {
            ReferenceConfig::Builtin => Self::from_source(&BuiltinSource, duplicates),
            ReferenceConfig::File { path } => Self::from_source(&CsvFileSource::new(path), duplicates),
            ReferenceConfig::Remote { url, timeout_secs } => {
                let (rows, source) = load_remote(url, Duration::from_secs(*timeout_secs), cache, offline)?;
                Ok(Self {
                    index: Arc::new(ReferenceIndex::build(rows, duplicates)?),
                    source,
                })
            }
        }
    }

    /// Like [`load`](Self::load), but a failure is logged and yields an empty
    /// resolver, so every lookup misses.
    pub fn load_lenient(
        config: &ReferenceConfig,
        duplicates: DuplicatePolicy,
        cache: &mut SnapshotCache,
        offline: bool,
    ) -> Self {
        Self::load(config, duplicates, cache, offline).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "reference data failed to load; all lookups will miss");
            Self {
                index: Arc::new(ReferenceIndex::default()),
                source: LocationSource::Unavailable,
            }
        })
    }

    /// Coordinate for a region/locality pair, or `None` if no row matches.
    pub fn resolve(&self, region: &str, locality: &str) -> Option<Coordinate> {
        self.index.get(region, locality)
    }

    /// Coordinate for a region/locality pair, or a `LookupMiss` error.
    pub fn resolve_strict(&self, region: &str, locality: &str) -> Result<Coordinate> {
        self.resolve(region, locality)
            .ok_or_else(|| EstimateError::LookupMiss {
                region: region.to_string(),
                locality: locality.to_string(),
            })
    }

    /// Coordinate for a region/locality pair, or the zero coordinate on a miss.
    pub fn resolve_or_zero(&self, region: &str, locality: &str) -> Coordinate {
        self.resolve(region, locality).unwrap_or(Coordinate::ZERO)
    }

    pub fn source(&self) -> LocationSource {
        self.source
    }

    /// Number of distinct keys in the index.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn load_remote(
    url: &str,
    timeout: Duration,
    cache: &mut SnapshotCache,
    offline: bool,
) -> Result<(Vec<ReferenceRow>, LocationSource)> {
    // 1. Fresh snapshot
    if let Some(rows) = cache.get_fresh(url) {
        tracing::debug!(url, "using cached reference snapshot");
        return Ok((rows, LocationSource::Snapshot));
    }

    // 2. Remote fetch (if online)
    let mut failure = None;
    if !offline {
        // An empty fetch is never snapshotted; it would shadow the last good copy.
        let fetched = HttpSource::new(url, timeout).fetch_rows().and_then(|rows| {
            if rows.is_empty() {
                Err(EstimateError::DataSourceUnavailable(format!("{}: empty reference dataset", url)))
            } else {
                Ok(rows)
            }
        });
        match fetched {
            Ok(rows) => {
                cache.put(url, &rows);
                return Ok((rows, LocationSource::Remote));
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "remote reference data unreachable");
                failure = Some(e);
            }
        }
    }

    // 3. Stale snapshot
    if let Some(rows) = cache.get_stale(url) {
        tracing::warn!(url, "serving expired reference snapshot");
        return Ok((rows, LocationSource::Snapshot));
    }

    Err(failure.unwrap_or_else(|| {
        EstimateError::DataSourceUnavailable(format!("{}: offline and no snapshot cached", url))
    }))
}
