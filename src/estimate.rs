//! Estimate engine: resolves both addresses, measures the distance, and
//! prices the truck load.

use crate::catalog::{PackageCatalog, ServiceCatalog};
use crate::config::{EngineConfig, MissPolicy};
use crate::distance::great_circle_distance_km;
use crate::error::{EstimateError, Result};
use crate::location::{Coordinate, LocationResolver, RegionLocalityKey, SnapshotCache};
use crate::pricing::{TierTable, TruckPlan};
use serde::Serialize;

/// One end of a move, as resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Endpoint {
    pub region: String,
    pub locality: String,
    pub coordinate: Coordinate,
    /// False when the address was not found and a zero coordinate stands in.
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceEstimate {
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub distance_km: f64,
}

impl DistanceEstimate {
    /// True when both endpoints were found in the reference data.
    pub fn is_complete(&self) -> bool {
        self.origin.resolved && self.destination.resolved
    }
}

/// Everything needed to quote one move.
#[derive(Debug, Clone, Default)]
pub struct QuoteRequest {
    pub origin: Option<RegionLocalityKey>,
    pub destination: Option<RegionLocalityKey>,
    /// Boxes counted directly, on top of any packages.
    pub loose_boxes: u32,
    /// `(package_id, quantity)` pairs.
    pub packages: Vec<(u32, u32)>,
    pub services: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<DistanceEstimate>,
    pub box_count: u32,
    pub trucks: TruckPlan,
    pub truck_price: u64,
    pub options_price: u64,
    pub total: u64,
}

pub struct EstimateEngine {
    resolver: LocationResolver,
    tiers: TierTable,
    packages: PackageCatalog,
    services: ServiceCatalog,
    miss_policy: MissPolicy,
}

impl EstimateEngine {
    pub fn new(resolver: LocationResolver, tiers: TierTable) -> Self {
        Self {
            resolver,
            tiers,
            packages: PackageCatalog::default(),
            services: ServiceCatalog::default(),
            miss_policy: MissPolicy::default(),
        }
    }

    pub fn with_catalogs(mut self, packages: PackageCatalog, services: ServiceCatalog) -> Self {
        self.packages = packages;
        self.services = services;
        self
    }

    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    /// Build from configuration, loading the reference dataset.
    pub fn from_config(config: &EngineConfig, cache: &mut SnapshotCache, offline: bool) -> Result<Self> {
        let tiers = config.tier_table()?;
        let resolver = LocationResolver::load(&config.reference, config.duplicates, cache, offline)?;
        tracing::debug!(source = %resolver.source(), entries = resolver.len(), "reference data loaded");
        Ok(Self::new(resolver, tiers)
            .with_catalogs(
                PackageCatalog::new(config.packages.clone()),
                ServiceCatalog::new(config.services.clone()),
            )
            .with_miss_policy(config.lookup_miss))
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    fn endpoint(&self, region: &str, locality: &str) -> Result<Endpoint> {
        let (coordinate, resolved) = match self.resolver.resolve(region, locality) {
            Some(c) => (c, true),
            None => match self.miss_policy {
                MissPolicy::Reject => {
                    return Err(EstimateError::LookupMiss {
                        region: region.to_string(),
                        locality: locality.to_string(),
                    })
                }
                MissPolicy::ZeroFill => {
                    tracing::warn!(region, locality, "address not in reference data; using zero coordinate");
                    (Coordinate::ZERO, false)
                }
            },
        };
        Ok(Endpoint {
            region: region.to_string(),
            locality: locality.to_string(),
            coordinate,
            resolved,
        })
    }

    /// Great-circle distance between two addresses.
    pub fn estimate_distance_km(
        &self,
        origin_region: &str,
        origin_locality: &str,
        dest_region: &str,
        dest_locality: &str,
    ) -> Result<DistanceEstimate> {
        let origin = self.endpoint(origin_region, origin_locality)?;
        let destination = self.endpoint(dest_region, dest_locality)?;
        let distance_km = great_circle_distance_km(origin.coordinate, destination.coordinate);
        Ok(DistanceEstimate {
            origin,
            destination,
            distance_km,
        })
    }

    /// Truck price for a total box count.
    pub fn estimate_truck_price(&self, total_box_count: u32) -> u64 {
        self.tiers.price_for(total_box_count)
    }

    /// Total boxes for a request: loose boxes plus packed packages.
    pub fn box_count(&self, request: &QuoteRequest) -> Result<u32> {
        let packed = self.packages.total_box_count(&request.packages)?;
        Ok(packed.saturating_add(request.loose_boxes))
    }

    /// Assemble a full quote. The distance is reported but not priced.
    pub fn quote(&self, request: &QuoteRequest) -> Result<Quote> {
        let distance = match (&request.origin, &request.destination) {
            (Some(from), Some(to)) => Some(self.estimate_distance_km(
                &from.region,
                &from.locality,
                &to.region,
                &to.locality,
            )?),
            _ => None,
        };

        let box_count = self.box_count(request)?;
        let trucks = self.tiers.plan(box_count);
        let options_price = self.services.options_total(&request.services)?;

        Ok(Quote {
            distance,
            box_count,
            trucks,
            truck_price: trucks.price,
            options_price,
            total: trucks.price.saturating_add(options_price),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{DuplicatePolicy, ReferenceRow};
    use crate::pricing::PriceTier;
    use std::collections::BTreeMap;

    fn engine() -> EstimateEngine {
        let resolver = LocationResolver::from_rows(
            vec![
                ReferenceRow::new("13", "Shinjuku", 35.69, 139.70),
                ReferenceRow::new("27", "Osaka-shi", 34.69, 135.50),
                ReferenceRow::new("1", "Sapporo-shi", 43.06, 141.35),
            ],
            DuplicatePolicy::LastWins,
        )
        .unwrap();
        let tiers = TierTable::new(vec![PriceTier::new(10, 5000), PriceTier::new(20, 9000)]).unwrap();
        EstimateEngine::new(resolver, tiers).with_catalogs(
            PackageCatalog::new(BTreeMap::from([(1, 15), (2, 3)])),
            ServiceCatalog::new(BTreeMap::from([(1, 8000)])),
        )
    }

    #[test]
    fn test_distance_tokyo_osaka() {
        let est = engine().estimate_distance_km("13", "Shinjuku", "27", "Osaka-shi").unwrap();
        assert!(est.is_complete());
        assert!(est.distance_km > 390.0 && est.distance_km < 410.0);
    }

    #[test]
    fn test_distance_same_place() {
        let est = engine().estimate_distance_km("13", "Shinjuku", "13", "Shinjuku").unwrap();
        assert!(est.distance_km.abs() < 1e-3);
    }

    #[test]
    fn test_distance_padded_region() {
        let est = engine().estimate_distance_km("01", "Sapporo-shi", "13", "Shinjuku").unwrap();
        assert!(est.is_complete());
        assert_eq!(est.origin.region, "01");
        assert!(est.distance_km > 700.0 && est.distance_km < 900.0);
    }

    #[test]
    fn test_lookup_miss_rejected() {
        let result = engine().estimate_distance_km("13", "Shinjuku", "13", "Unknown");
        match result {
            Err(EstimateError::LookupMiss { region, locality }) => {
                assert_eq!(region, "13");
                assert_eq!(locality, "Unknown");
            }
            other => panic!("expected lookup miss, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_miss_zero_fill_is_flagged() {
        let engine = engine().with_miss_policy(MissPolicy::ZeroFill);
        let est = engine.estimate_distance_km("13", "Unknown", "13", "Shinjuku").unwrap();
        assert!(!est.is_complete());
        assert!(!est.origin.resolved);
        assert!(est.destination.resolved);
        assert_eq!(est.origin.coordinate, Coordinate::ZERO);
        assert!(est.distance_km.is_finite());
    }

    #[test]
    fn test_truck_price() {
        let engine = engine();
        assert_eq!(engine.estimate_truck_price(10), 5000);
        assert_eq!(engine.estimate_truck_price(45), 23000);
    }

    #[test]
    fn test_quote() {
        let request = QuoteRequest {
            origin: Some(RegionLocalityKey::new("13", "Shinjuku")),
            destination: Some(RegionLocalityKey::new("27", "Osaka-shi")),
            loose_boxes: 4,
            packages: vec![(1, 1), (2, 2)],
            services: vec![1],
        };
        let quote = engine().quote(&request).unwrap();
        assert_eq!(quote.box_count, 25);
        assert_eq!(quote.truck_price, 14000);
        assert_eq!(quote.trucks.truck_count(), 2);
        assert_eq!(quote.options_price, 8000);
        assert_eq!(quote.total, 22000);
        assert!(quote.distance.unwrap().is_complete());
    }

    #[test]
    fn test_quote_without_addresses() {
        let request = QuoteRequest { loose_boxes: 15, ..Default::default() };
        let quote = engine().quote(&request).unwrap();
        assert!(quote.distance.is_none());
        assert_eq!(quote.total, 9000);
    }

    #[test]
    fn test_quote_unknown_package() {
        let request = QuoteRequest { packages: vec![(42, 1)], ..Default::default() };
        assert!(matches!(engine().quote(&request), Err(EstimateError::UnknownPackage(42))));
    }

    #[test]
    fn test_from_default_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cache = SnapshotCache::load_from(dir.path().join("reference.json"));
        let engine = EstimateEngine::from_config(&EngineConfig::default(), &mut cache, true).unwrap();
        assert_eq!(engine.resolver().source(), crate::location::LocationSource::Builtin);
        assert_eq!(engine.estimate_truck_price(80), 30000);
        assert_eq!(engine.estimate_truck_price(81), 50000);
        assert!(engine.estimate_distance_km("13", "Shinjuku", "27", "Osaka-shi").is_ok());
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EstimateEngine>();
    }
}
