//! Tiered truck pricing.
//!
//! A tier is one truck class: how many boxes it carries and its flat price.
//! A shipment that fits a single truck pays for the smallest truck that
//! carries it. A larger shipment is split into full loads of the largest
//! truck plus one more truck for the remainder, the smallest one that fits.
//!
//! With two tiers this reduces to:
//!
//! ```text
//! n <= t0.max               -> t0.price
//! n <= t1.max               -> t1.price
//! n % t1.max <= t0.max      -> (n / t1.max) * t1.price + t0.price
//! otherwise                 -> (n / t1.max) * t1.price + t1.price
//! ```
//!
//! The remainder is never split further, and a remainder of zero still
//! books one base truck.

use crate::error::{EstimateError, Result};
use serde::{Deserialize, Serialize};

/// One truck class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    pub max_boxes: u32,
    pub price: u64,
}

impl PriceTier {
    pub const fn new(max_boxes: u32, price: u64) -> Self {
        Self { max_boxes, price }
    }
}

/// Validated tier table: non-empty, ascending by capacity, largest capacity > 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierTable {
    tiers: Vec<PriceTier>,
}

impl TierTable {
    pub fn new(tiers: Vec<PriceTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(EstimateError::InvalidTierConfiguration(
                "at least one tier is required".into(),
            ));
        }
        if let Some(pair) = tiers.windows(2).find(|w| w[1].max_boxes < w[0].max_boxes) {
            return Err(EstimateError::InvalidTierConfiguration(format!(
                "tiers must ascend by capacity ({} boxes listed after {})",
                pair[1].max_boxes, pair[0].max_boxes
            )));
        }
        // Ascending order makes the last tier the largest.
        if tiers[tiers.len() - 1].max_boxes == 0 {
            return Err(EstimateError::InvalidTierConfiguration(
                "largest tier capacity must be greater than zero".into(),
            ));
        }
        if tiers.windows(2).any(|w| w[1].price < w[0].price) {
            tracing::warn!("tier prices are not ascending; prices may drop as box count grows");
        }
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[PriceTier] {
        &self.tiers
    }

    /// The largest truck class.
    pub fn largest(&self) -> PriceTier {
        self.tiers[self.tiers.len() - 1]
    }

    /// The first (smallest) tier that carries `boxes`.
    pub fn smallest_fitting(&self, boxes: u32) -> Option<PriceTier> {
        self.tiers.iter().copied().find(|t| boxes <= t.max_boxes)
    }

    /// Split a box count into trucks.
    pub fn plan(&self, box_count: u32) -> TruckPlan {
        let largest = self.largest();

        if let Some(tier) = self.smallest_fitting(box_count) {
            return TruckPlan::new(box_count, 0, largest, tier);
        }

        let full_loads = box_count / largest.max_boxes;
        let remainder = box_count % largest.max_boxes;
        // remainder < largest.max_boxes, so some tier always fits.
        let last = self.smallest_fitting(remainder).unwrap_or(largest);
        TruckPlan::new(box_count, full_loads, largest, last)
    }

    /// Truck price for a total box count.
    pub fn price_for(&self, box_count: u32) -> u64 {
        self.plan(box_count).price
    }
}

impl TryFrom<Vec<PriceTier>> for TierTable {
    type Error = EstimateError;

    fn try_from(tiers: Vec<PriceTier>) -> Result<Self> {
        Self::new(tiers)
    }
}

/// How a shipment is split over trucks, and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruckPlan {
    pub box_count: u32,
    /// Number of fully loaded trucks of the largest class.
    pub full_loads: u32,
    pub full_load_tier: PriceTier,
    /// The single truck carrying whatever is left (or everything, if `full_loads == 0`).
    pub last_tier: PriceTier,
    pub price: u64,
}

impl TruckPlan {
    fn new(box_count: u32, full_loads: u32, full_load_tier: PriceTier, last_tier: PriceTier) -> Self {
        let price = u64::from(full_loads)
            .saturating_mul(full_load_tier.price)
            .saturating_add(last_tier.price);
        Self {
            box_count,
            full_loads,
            full_load_tier,
            last_tier,
            price,
        }
    }

    pub fn truck_count(&self) -> u32 {
        self.full_loads.saturating_add(1)
    }
}

/// Truck price for `box_count` boxes against `tiers`.
pub fn price_for_box_count(box_count: u32, tiers: &TierTable) -> u64 {
    tiers.price_for(box_count)
}
