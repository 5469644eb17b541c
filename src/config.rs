//! Engine configuration, read from ~/.moving_estimate/config.json.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//!
//! ```json
//! {
//!   "reference": { "file": { "path": "/srv/data/lonlat.csv" } },
//!   "duplicates": "last_wins",
//!   "lookup_miss": "reject",
//!   "tiers": [ { "max_boxes": 80, "price": 30000 }, { "max_boxes": 200, "price": 50000 } ],
//!   "packages": { "1": 15, "2": 3 },
//!   "services": { "1": 8000 }
//! }
//! ```

use crate::error::{EstimateError, Result};
use crate::location::DuplicatePolicy;
use crate::pricing::{PriceTier, TierTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Per-user data directory (~/.moving_estimate).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".moving_estimate")
}

/// Where reference rows come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceConfig {
    #[default]
    Builtin,
    File { path: PathBuf },
    Remote {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// What a distance estimate does when an address is not in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Fail with `LookupMiss`.
    #[default]
    Reject,
    /// Substitute the zero coordinate and flag the endpoint as unresolved.
    ZeroFill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub reference: ReferenceConfig,
    pub duplicates: DuplicatePolicy,
    pub lookup_miss: MissPolicy,
    /// Truck classes, ascending by capacity.
    pub tiers: Vec<PriceTier>,
    /// Package id → boxes per package.
    pub packages: BTreeMap<u32, u32>,
    /// Optional service id → price.
    pub services: BTreeMap<u32, u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceConfig::default(),
            duplicates: DuplicatePolicy::default(),
            lookup_miss: MissPolicy::default(),
            tiers: vec![PriceTier::new(80, 30000), PriceTier::new(200, 50000)],
            packages: BTreeMap::new(),
            services: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn default_path() -> PathBuf {
        data_dir().join("config.json")
    }

    /// Load from the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .map_err(|e| EstimateError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| EstimateError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Fail fast on configuration that could never price a shipment.
    pub fn validate(&self) -> Result<()> {
        self.tier_table().map(|_| ())
    }

    pub fn tier_table(&self) -> Result<TierTable> {
        TierTable::new(self.tiers.clone())
    }
}
