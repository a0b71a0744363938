//! Truck and forklift energy derived from cargo volumes.

/// Per-building annual energy rates.
pub mod rates;
/// Annual truck energy per carrier.
pub mod truck;
/// Shipment-weighted distance and truck capacity.
pub mod weights;

use std::fmt;

pub use rates::{EnergyRateSpec, RateDeriver};
pub use truck::{EfficiencyTable, TruckLogisticsModel};
pub use weights::{CargoDistribution, DistanceWeightResolver, TruckCapacityWeightResolver};

/// Direction of a truck trip relative to the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Row label used in the destination and cargo tables.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
