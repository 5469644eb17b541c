//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Placeholder coordinate used by the zero-fill miss policy.
    pub const ZERO: Coordinate = Coordinate { lat: 0.0, lon: 0.0 };

    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coords(self.lat, self.lon))
    }
}

/// Format coordinates as "35.6938°N, 139.7034°E".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}

/// Strip the leading zero of the single-digit region forms "01".."09".
///
/// Every other code (including "00", "10".."47", and already-bare "1".."9")
/// is returned unchanged.
pub fn normalize_region(code: &str) -> &str {
    match code.as_bytes() {
        [b'0', b'1'..=b'9'] => &code[1..],
        _ => code,
    }
}

/// Lookup key into the reference dataset. The region is stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionLocalityKey {
    pub region: String,
    pub locality: String,
}

impl RegionLocalityKey {
    pub fn new(region: &str, locality: &str) -> Self {
        Self {
            region: normalize_region(region).to_string(),
            locality: locality.to_string(),
        }
    }
}

impl fmt::Display for RegionLocalityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.locality)
    }
}

/// One record of the geographic reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRow {
    pub region: String,
    pub locality: String,
    pub lat: f64,
    pub lon: f64,
}

impl ReferenceRow {
    pub fn new(region: &str, locality: &str, lat: f64, lon: f64) -> Self {
        Self {
            region: region.to_string(),
            locality: locality.to_string(),
            lat,
            lon,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Where the loaded reference dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    Builtin,
    File,
    Remote,
    Snapshot,
    /// Rows handed in directly by the caller.
    Manual,
    /// The configured source failed and the resolver runs with no rows.
    Unavailable,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "Built-in"),
            Self::File => write!(f, "File"),
            Self::Remote => write!(f, "Remote"),
            Self::Snapshot => write!(f, "Snapshot"),
            Self::Manual => write!(f, "Manual"),
            Self::Unavailable => write!(f, "Unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_single_digit_forms() {
        for n in 1..=9 {
            let padded = format!("0{}", n);
            assert_eq!(normalize_region(&padded), n.to_string());
        }
    }

    #[test]
    fn test_normalize_identity_otherwise() {
        for code in ["00", "10", "13", "47", "1", "9", "", "0", "001", "0a", "ab"] {
            assert_eq!(normalize_region(code), code);
        }
        for n in 10..=47 {
            let code = n.to_string();
            assert_eq!(normalize_region(&code), code);
        }
    }

    #[test]
    fn test_key_normalizes_region_only() {
        let key = RegionLocalityKey::new("01", "Sapporo-shi");
        assert_eq!(key.region, "1");
        assert_eq!(key.locality, "Sapporo-shi");
        assert_eq!(key, RegionLocalityKey::new("1", "Sapporo-shi"));
        assert_ne!(key, RegionLocalityKey::new("1", "sapporo-shi"));
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(35.69, 139.70), "35.6900\u{00B0}N, 139.7000\u{00B0}E");
        assert_eq!(format_coords(-33.8688, -70.5), "33.8688\u{00B0}S, 70.5000\u{00B0}W");
    }
}
