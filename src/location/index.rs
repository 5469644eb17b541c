//! In-memory index over the reference dataset, built once at load time.

use super::types::{normalize_region, Coordinate, ReferenceRow};
use crate::error::{EstimateError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do when two rows share a (region, locality) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Later rows overwrite earlier ones.
    #[default]
    LastWins,
    /// Any duplicate key fails the load.
    Reject,
}

/// Coordinates keyed by normalized region, then exact locality name.
///
/// Row region codes are normalized on insert as well, so a row for "02"
/// answers lookups for both "2" and "02" (and collides with a "2" row).
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    regions: HashMap<String, HashMap<String, Coordinate>>,
    len: usize,
}

impl ReferenceIndex {
    /// Build with last-write-wins semantics. Never fails.
    pub fn last_wins(rows: Vec<ReferenceRow>) -> Self {
        let mut index = Self::default();
        let mut duplicates = 0usize;
        for row in rows {
            if index.insert(row).is_some() {
                duplicates += 1;
            }
        }
        if duplicates > 0 {
            tracing::warn!(duplicates, "reference data contains duplicate keys; later rows win");
        }
        tracing::debug!(entries = index.len, "built reference index");
        index
    }

    pub fn build(rows: Vec<ReferenceRow>, policy: DuplicatePolicy) -> Result<Self> {
        match policy {
            DuplicatePolicy::LastWins => Ok(Self::last_wins(rows)),
            DuplicatePolicy::Reject => {
                let mut index = Self::default();
                for row in rows {
                    let (region, locality) = (row.region.clone(), row.locality.clone());
                    if index.insert(row).is_some() {
                        return Err(EstimateError::DuplicateKey { region, locality });
                    }
                }
                tracing::debug!(entries = index.len, "built reference index");
                Ok(index)
            }
        }
    }

    /// Insert a row, returning the coordinate it replaced.
    fn insert(&mut self, row: ReferenceRow) -> Option<Coordinate> {
        let coord = row.coordinate();
        let region = normalize_region(&row.region).to_string();
        let previous = self
            .regions
            .entry(region)
            .or_default()
            .insert(row.locality, coord);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Exact lookup. The region code is normalized first.
    pub fn get(&self, region: &str, locality: &str) -> Option<Coordinate> {
        self.regions
            .get(normalize_region(region))?
            .get(locality)
            .copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
