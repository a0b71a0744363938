use std::collections::BTreeMap;

use tracing::debug;

use crate::config::ScenarioPaths;
use crate::error::{LogisticsError, Result};
use crate::io::table::LabeledTable;
use crate::logistics::Direction;
use crate::logistics::weights::{
    CargoDistribution, DESTINATION, DistanceWeightResolver, TruckCapacityWeightResolver,
};

/// Index column of the efficiency table.
pub const CARRIER: &str = "energy";

/// Trip distance per unit of energy, per carrier and truck-capacity class.
///
/// Rows are carriers (`diesel`, `kWh`, ...), columns are the capacity classes
/// of the monthly cargo table.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyTable {
    classes: Vec<String>,
    carriers: BTreeMap<String, Vec<f64>>,
}

impl EfficiencyTable {
    /// # Errors
    ///
    /// `Parse` for a non-numeric cell, `Configuration` for a zero or negative
    /// efficiency, `Configuration` if the table has no carriers.
    pub fn from_table(table: &LabeledTable) -> Result<Self> {
        let mut carriers = BTreeMap::new();
        for carrier in table.labels() {
            let row = table.row(carrier)?;
            if let Some((class, eff)) = table
                .columns()
                .iter()
                .zip(&row)
                .find(|(_, eff)| !(eff.is_finite() && **eff > 0.0))
            {
                return Err(LogisticsError::Configuration(format!(
                    "efficiency of `{carrier}` for class `{class}` is {eff}; it must be > 0"
                )));
            }
            carriers.insert(carrier.to_string(), row);
        }
        if carriers.is_empty() {
            return Err(LogisticsError::Configuration(
                "efficiency table lists no carriers".to_string(),
            ));
        }
        Ok(Self {
            classes: table.columns().to_vec(),
            carriers,
        })
    }

    pub fn carriers(&self) -> impl Iterator<Item = &str> {
        self.carriers.keys().map(String::as_str)
    }

    /// Efficiency of every carrier re-ordered to match `classes`.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` unless both tables list exactly the same classes.
    fn aligned(&self, classes: &[String]) -> Result<BTreeMap<&str, Vec<f64>>> {
        let mut own: Vec<&String> = self.classes.iter().collect();
        let mut other: Vec<&String> = classes.iter().collect();
        own.sort();
        other.sort();
        if own != other {
            return Err(LogisticsError::IndexMismatch(format!(
                "efficiency classes {:?} do not match monthly cargo classes {:?}",
                self.classes, classes
            )));
        }

        let order: Vec<usize> = classes
            .iter()
            .filter_map(|c| self.classes.iter().position(|own| own == c))
            .collect();
        Ok(self
            .carriers
            .iter()
            .map(|(carrier, row)| (carrier.as_str(), order.iter().map(|&i| row[i]).collect()))
            .collect())
    }
}

/// Average trip distance in each direction (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalDistance {
    pub inbound: f64,
    pub outbound: f64,
}

impl DirectionalDistance {
    /// Picks the `in` and `out` rows of a resolved distance map.
    ///
    /// # Errors
    ///
    /// `IndexMismatch` if either row is missing.
    pub fn from_averages(averages: &BTreeMap<String, f64>) -> Result<Self> {
        let get = |direction: Direction| {
            averages.get(direction.label()).copied().ok_or_else(|| {
                LogisticsError::IndexMismatch(format!("destination table has no `{direction}` row"))
            })
        };
        Ok(Self {
            inbound: get(Direction::Inbound)?,
            outbound: get(Direction::Outbound)?,
        })
    }
}

/// Annual truck energy per carrier for a given monthly cargo tonnage.
///
/// For a building moving `m` tonnes a month:
///
/// 1. `trucks = 12 * m / average_capacity`
/// 2. per class `c` and direction `d`, `trucks[c][d] = share[d][c] * trucks`
/// 3. per class, `km[c] = Σ_d trucks[c][d] * distance[d]`
/// 4. per carrier, `energy = Σ_c km[c] / efficiency[carrier][c]`
#[derive(Debug, Clone)]
pub struct TruckLogisticsModel {
    distribution: CargoDistribution,
    distance: DirectionalDistance,
    efficiency: EfficiencyTable,
}

impl TruckLogisticsModel {
    /// # Errors
    ///
    /// `IndexMismatch` if the efficiency classes differ from the cargo classes.
    pub fn new(
        distribution: CargoDistribution,
        distance: DirectionalDistance,
        efficiency: EfficiencyTable,
    ) -> Result<Self> {
        efficiency.aligned(&distribution.classes)?;
        Ok(Self {
            distribution,
            distance,
            efficiency,
        })
    }

    /// Loads the destination, monthly cargo and efficiency tables of a scenario.
    pub fn load(paths: &ScenarioPaths) -> Result<Self> {
        let destination = LabeledTable::read(&paths.destination(), DESTINATION)?;
        let cargos = LabeledTable::read(&paths.monthly_cargos(), DESTINATION)?;
        let efficiency = LabeledTable::read(&paths.efficiency(), CARRIER)?;

        let averages = DistanceWeightResolver.resolve(&destination)?;
        let distance = DirectionalDistance::from_averages(&averages)?;
        let distribution = TruckCapacityWeightResolver.resolve(&cargos)?;
        let efficiency = EfficiencyTable::from_table(&efficiency)?;
        Self::new(distribution, distance, efficiency)
    }

    pub fn distribution(&self) -> &CargoDistribution {
        &self.distribution
    }

    pub fn distance(&self) -> DirectionalDistance {
        self.distance
    }

    pub fn carriers(&self) -> impl Iterator<Item = &str> {
        self.efficiency.carriers()
    }

    /// Annual energy per carrier for `monthly_cargo_ton` tonnes a month.
    ///
    /// # Errors
    ///
    /// `Configuration` if the average truck capacity is not positive or the
    /// tonnage is negative.
    pub fn annual_energy(&self, monthly_cargo_ton: f64) -> Result<BTreeMap<String, f64>> {
        self.annual_energy_with_capacity(monthly_cargo_ton, self.distribution.weighted_average_capacity)
    }

    /// As [`annual_energy`](Self::annual_energy) with an explicit average truck capacity.
    pub fn annual_energy_with_capacity(
        &self,
        monthly_cargo_ton: f64,
        average_truck_capacity: f64,
    ) -> Result<BTreeMap<String, f64>> {
        if !(average_truck_capacity.is_finite() && average_truck_capacity > 0.0) {
            return Err(LogisticsError::Configuration(format!(
                "average truck capacity is {average_truck_capacity}; it must be > 0"
            )));
        }
        if !(monthly_cargo_ton.is_finite() && monthly_cargo_ton >= 0.0) {
            return Err(LogisticsError::Configuration(format!(
                "monthly cargo of {monthly_cargo_ton} t must be non-negative"
            )));
        }

        let annual_load = monthly_cargo_ton * 12.0;
        let annual_trucks = annual_load / average_truck_capacity;

        let inbound = self.distribution.direction(Direction::Inbound)?;
        let outbound = self.distribution.direction(Direction::Outbound)?;
        let class_km: Vec<f64> = inbound
            .iter()
            .zip(outbound)
            .map(|(i, o)| {
                i * annual_trucks * self.distance.inbound + o * annual_trucks * self.distance.outbound
            })
            .collect();

        let efficiency = self.efficiency.aligned(&self.distribution.classes)?;
        let energy: BTreeMap<String, f64> = efficiency
            .into_iter()
            .map(|(carrier, eff)| {
                let total: f64 = class_km.iter().zip(&eff).map(|(km, e)| km / e).sum();
                (carrier.to_string(), total)
            })
            .collect();

        debug!(monthly_cargo_ton, annual_trucks, ?energy, "computed annual truck energy");
        Ok(energy)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::ErrorKind;

    fn table(content: &str, index: &str) -> LabeledTable {
        LabeledTable::from_csv_str(content, Path::new("t.csv"), index).expect("table should parse")
    }

    fn model(efficiency: &str) -> Result<TruckLogisticsModel> {
        let distribution = TruckCapacityWeightResolver
            .resolve(&table("destination,1t,5t\nin,30,20\nout,10,40\n", DESTINATION))?;
        let distance = DirectionalDistance {
            inbound: 10.0,
            outbound: 100.0,
        };
        let efficiency = EfficiencyTable::from_table(&table(efficiency, CARRIER))?;
        TruckLogisticsModel::new(distribution, distance, efficiency)
    }

    #[test]
    fn energy_per_carrier_follows_trip_kilometres() {
        let model = model("energy,1t,5t\ndiesel,5,2\nkWh,0.5,0.25\n").expect("valid model");
        // shares: in [0.3, 0.2], out [0.1, 0.4]; capacity = 1*0.4 + 5*0.6 = 3.4
        let capacity = model.distribution().weighted_average_capacity;
        assert!((capacity - 3.4).abs() < 1e-12);

        let energy = model.annual_energy(100.0).expect("positive capacity");
        let trucks = 1200.0 / 3.4;
        let km_1t = 0.3 * trucks * 10.0 + 0.1 * trucks * 100.0;
        let km_5t = 0.2 * trucks * 10.0 + 0.4 * trucks * 100.0;
        assert!((energy["diesel"] - (km_1t / 5.0 + km_5t / 2.0)).abs() < 1e-9);
        assert!((energy["kWh"] - (km_1t / 0.5 + km_5t / 0.25)).abs() < 1e-9);
    }

    #[test]
    fn efficiency_column_order_does_not_matter() {
        let a = model("energy,1t,5t\ndiesel,5,2\n").expect("valid model");
        let b = model("energy,5t,1t\ndiesel,2,5\n").expect("valid model");
        assert_eq!(a.annual_energy(50.0).ok(), b.annual_energy(50.0).ok());
    }

    #[test]
    fn zero_capacity_is_configuration_error() {
        let model = model("energy,1t,5t\ndiesel,5,2\n").expect("valid model");
        let err = model
            .annual_energy_with_capacity(100.0, 0.0)
            .expect_err("zero-capacity fleet");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn zero_efficiency_is_configuration_error() {
        let err = model("energy,1t,5t\ndiesel,0,2\n").expect_err("zero efficiency");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn mismatched_classes_are_index_mismatch() {
        let err = model("energy,1t,11t\ndiesel,5,2\n").expect_err("class 11t unknown");
        assert_eq!(err.kind(), ErrorKind::IndexMismatch);
    }

    #[test]
    fn distance_needs_both_directions() {
        let averages = BTreeMap::from([("in".to_string(), 12.0)]);
        let err = DirectionalDistance::from_averages(&averages).expect_err("no out row");
        assert_eq!(err.kind(), ErrorKind::IndexMismatch);
    }

    #[test]
    fn zero_cargo_means_zero_energy() {
        let model = model("energy,1t,5t\ndiesel,5,2\n").expect("valid model");
        let energy = model.annual_energy(0.0).expect("valid");
        assert_eq!(energy.get("diesel").copied(), Some(0.0));
    }
}
