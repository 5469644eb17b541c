//! Lookup tables feeding a quote: boxes per package and optional-service prices.

use crate::error::{EstimateError, Result};
use std::collections::BTreeMap;

/// Package id → number of boxes one such package packs into.
#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    boxes: BTreeMap<u32, u32>,
}

impl PackageCatalog {
    pub fn new(boxes: BTreeMap<u32, u32>) -> Self {
        Self { boxes }
    }

    pub fn boxes_per_package(&self, package_id: u32) -> Result<u32> {
        self.boxes
            .get(&package_id)
            .copied()
            .ok_or(EstimateError::UnknownPackage(package_id))
    }

    /// Total boxes for `(package_id, quantity)` pairs.
    pub fn total_box_count(&self, packages: &[(u32, u32)]) -> Result<u32> {
        packages.iter().try_fold(0u32, |total, &(id, quantity)| {
            let boxes = self.boxes_per_package(id)?;
            Ok(total.saturating_add(boxes.saturating_mul(quantity)))
        })
    }
}

/// Optional service id → flat price.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    prices: BTreeMap<u32, u64>,
}

impl ServiceCatalog {
    pub fn new(prices: BTreeMap<u32, u64>) -> Self {
        Self { prices }
    }

    pub fn price(&self, service_id: u32) -> Result<u64> {
        self.prices
            .get(&service_id)
            .copied()
            .ok_or(EstimateError::UnknownService(service_id))
    }

    pub fn options_total(&self, service_ids: &[u32]) -> Result<u64> {
        service_ids
            .iter()
            .try_fold(0u64, |total, &id| Ok(total.saturating_add(self.price(id)?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packages() -> PackageCatalog {
        PackageCatalog::new(BTreeMap::from([(1, 15), (2, 3), (3, 0)]))
    }

    #[test]
    fn test_total_box_count() {
        let catalog = packages();
        assert_eq!(catalog.total_box_count(&[]).unwrap(), 0);
        assert_eq!(catalog.total_box_count(&[(1, 2), (2, 4), (3, 9)]).unwrap(), 42);
    }

    #[test]
    fn test_unknown_package() {
        assert!(matches!(
            packages().total_box_count(&[(1, 1), (99, 1)]),
            Err(EstimateError::UnknownPackage(99))
        ));
    }

    #[test]
    fn test_options_total() {
        let services = ServiceCatalog::new(BTreeMap::from([(1, 8000), (2, 2500)]));
        assert_eq!(services.options_total(&[1, 2]).unwrap(), 10500);
        assert_eq!(services.options_total(&[]).unwrap(), 0);
        assert!(matches!(services.options_total(&[3]), Err(EstimateError::UnknownService(3))));
    }
}
