use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{LogisticsError, Result};
use crate::io::table::LabeledTable;
use crate::logistics::Direction;

/// Index column of the destination and monthly cargo tables.
pub const DESTINATION: &str = "destination";

/// Average trip distance per destination row, weighted by shipment count.
///
/// Columns of the destination table are distance tiers whose header carries
/// the distance (`18.33km`); cells are shipment counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceWeightResolver;

impl DistanceWeightResolver {
    /// `average = Σ(tier_distance * tier_count) / Σ(tier_count)` for every row.
    ///
    /// # Errors
    ///
    /// `Parse` for a header without a distance or a non-numeric count,
    /// `Configuration` for a row with no shipments or a negative count.
    pub fn resolve(&self, table: &LabeledTable) -> Result<BTreeMap<String, f64>> {
        let distances = table.header_values()?;
        let mut averages = BTreeMap::new();

        for label in table.labels() {
            let counts = table.row(label)?;
            if counts.iter().any(|c| *c < 0.0) {
                return Err(LogisticsError::Configuration(format!(
                    "destination `{label}` has a negative shipment count"
                )));
            }
            let total: f64 = counts.iter().sum();
            if total <= 0.0 {
                return Err(LogisticsError::Configuration(format!(
                    "destination `{label}` has no shipments to weight distances by"
                )));
            }
            let weighted: f64 = distances.iter().zip(&counts).map(|(d, c)| d * c).sum();
            averages.insert(label.to_string(), weighted / total);
        }

        debug!(?averages, "resolved average distances");
        Ok(averages)
    }
}

/// Shipped weight per direction and truck-capacity class, as shares of the total.
#[derive(Debug, Clone, PartialEq)]
pub struct CargoDistribution {
    /// Capacity class labels, in table order.
    pub classes: Vec<String>,
    /// Capacity of each class (tonnes), parsed from its label.
    pub capacities: Vec<f64>,
    /// Share of the total shipped weight, per direction row and class.
    pub shares: BTreeMap<String, Vec<f64>>,
    /// `Σ_class capacity * (inbound_share + outbound_share)`.
    pub weighted_average_capacity: f64,
}

impl CargoDistribution {
    /// Shares of one direction, one entry per class.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` if the cargo table has no row for the direction.
    pub fn direction(&self, direction: Direction) -> Result<&[f64]> {
        self.shares
            .get(direction.label())
            .map(Vec::as_slice)
            .ok_or_else(|| {
                LogisticsError::IndexMismatch(format!(
                    "monthly cargo table has no `{direction}` row"
                ))
            })
    }

    /// Sum of every share; 1 up to rounding.
    pub fn total_share(&self) -> f64 {
        self.shares.values().flatten().sum()
    }
}

/// Normalises shipped weights into a [`CargoDistribution`].
///
/// Columns of the monthly cargo table are truck-capacity classes whose
/// header carries the capacity (`2.5t`); rows are directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TruckCapacityWeightResolver;

impl TruckCapacityWeightResolver {
    /// # Errors
    ///
    /// `Parse` for a header without a capacity or a non-numeric weight,
    /// `Configuration` if nothing was shipped or a weight is negative,
    /// `IndexMismatch` if the `in` or `out` row is missing.
    pub fn resolve(&self, table: &LabeledTable) -> Result<CargoDistribution> {
        let capacities = table.header_values()?;

        let mut weights = BTreeMap::new();
        for label in table.labels() {
            let row = table.row(label)?;
            if row.iter().any(|w| *w < 0.0) {
                return Err(LogisticsError::Configuration(format!(
                    "monthly cargo `{label}` has a negative weight"
                )));
            }
            weights.insert(label.to_string(), row);
        }

        let total: f64 = weights.values().flatten().sum();
        if total <= 0.0 {
            return Err(LogisticsError::Configuration(
                "monthly cargo table has no shipped weight".to_string(),
            ));
        }
        let shares: BTreeMap<String, Vec<f64>> = weights
            .into_iter()
            .map(|(label, row)| (label, row.into_iter().map(|w| w / total).collect()))
            .collect();

        let mut distribution = CargoDistribution {
            classes: table.columns().to_vec(),
            capacities,
            shares,
            weighted_average_capacity: 0.0,
        };
        let inbound = distribution.direction(Direction::Inbound)?;
        let outbound = distribution.direction(Direction::Outbound)?;
        let weighted_average_capacity: f64 = distribution
            .capacities
            .iter()
            .zip(inbound.iter().zip(outbound))
            .map(|(cap, (i, o))| cap * (i + o))
            .sum();
        distribution.weighted_average_capacity = weighted_average_capacity;

        debug!(
            weighted_average_capacity,
            classes = distribution.classes.len(),
            "resolved truck capacity distribution"
        );
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::ErrorKind;

    fn table(content: &str) -> LabeledTable {
        LabeledTable::from_csv_str(content, Path::new("t.csv"), DESTINATION).expect("table should parse")
    }

    #[test]
    fn average_distance_weights_by_count() {
        let averages = DistanceWeightResolver
            .resolve(&table("destination,10km,100km\nin,1,1\nout,3,1\n"))
            .expect("resolvable");
        assert!((averages["in"] - 55.0).abs() < 1e-12);
        assert!((averages["out"] - (30.0 + 100.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn destination_without_shipments_is_configuration_error() {
        let err = DistanceWeightResolver
            .resolve(&table("destination,10km,100km\nin,0,0\n"))
            .expect_err("zero shipments");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn capacity_shares_form_a_distribution() {
        let dist = TruckCapacityWeightResolver
            .resolve(&table("destination,1t,5t,11t\nin,10,30,20\nout,5,25,10\n"))
            .expect("resolvable");
        assert!((dist.total_share() - 1.0).abs() < 1e-12);
        assert_eq!(dist.capacities, vec![1.0, 5.0, 11.0]);

        // (1*15 + 5*55 + 11*30) / 100
        assert!((dist.weighted_average_capacity - 6.2).abs() < 1e-12);
    }

    #[test]
    fn missing_direction_row_is_index_mismatch() {
        let err = TruckCapacityWeightResolver
            .resolve(&table("destination,1t,5t\nin,10,30\n"))
            .expect_err("no out row");
        assert_eq!(err.kind(), ErrorKind::IndexMismatch);
    }

    #[test]
    fn empty_cargo_is_configuration_error() {
        let err = TruckCapacityWeightResolver
            .resolve(&table("destination,1t,5t\nin,0,0\nout,0,0\n"))
            .expect_err("nothing shipped");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
