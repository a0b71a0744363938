use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::{ForkliftConfig, ScenarioPaths};
use crate::error::{LogisticsError, Result};
use crate::io::table::LabeledTable;
use crate::logistics::truck::TruckLogisticsModel;
use crate::usage::UsageCategory;

/// Index column of the internal loads table.
pub const USAGE_CODE: &str = "code";
/// Monthly cargo tonnage column of the internal loads table.
pub const MONTHLY_PACKAGE_TON: &str = "monthly_package_ton";
/// Forklift capacity column of the internal loads table.
pub const FORKLIFT_CAPACITY_TON: &str = "forklift_capacity_ton";

/// Annual energy rates of one building, per unit of floor area.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRateSpec {
    pub forklift: f64,
    /// One rate per truck energy carrier.
    pub truck: BTreeMap<String, f64>,
}

impl EnergyRateSpec {
    /// All-zero rates for the given carriers.
    pub fn zero<'a>(carriers: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            forklift: 0.0,
            truck: carriers.into_iter().map(|c| (c.to_string(), 0.0)).collect(),
        }
    }
}

/// Derives [`EnergyRateSpec`]s from the usage internal loads and the truck model.
///
/// Shared read-only by every building job.
#[derive(Debug, Clone)]
pub struct RateDeriver {
    internal_loads: LabeledTable,
    forklift_charge_kwh: f64,
    truck: TruckLogisticsModel,
}

impl RateDeriver {
    pub fn new(internal_loads: LabeledTable, forklift: &ForkliftConfig, truck: TruckLogisticsModel) -> Self {
        Self {
            internal_loads,
            forklift_charge_kwh: forklift.charge_kwh(),
            truck,
        }
    }

    /// Loads the internal loads and logistics tables of a scenario.
    pub fn load(paths: &ScenarioPaths, forklift: &ForkliftConfig) -> Result<Self> {
        let internal_loads = LabeledTable::read(&paths.internal_loads(), USAGE_CODE)?;
        let truck = TruckLogisticsModel::load(paths)?;
        Ok(Self::new(internal_loads, forklift, truck))
    }

    pub fn truck_model(&self) -> &TruckLogisticsModel {
        &self.truck
    }

    /// Rates for one usage. Non-logistics usages get zero rates without
    /// touching the internal loads table.
    ///
    /// # Errors
    ///
    /// * `Lookup` if a logistics usage has no internal loads row.
    /// * `Configuration` for a non-positive forklift capacity, plus any
    ///   error of [`TruckLogisticsModel::annual_energy`].
    pub fn rates_for(&self, usage: &UsageCategory) -> Result<EnergyRateSpec> {
        if !usage.is_logistics() {
            return Ok(EnergyRateSpec::zero(self.truck.carriers()));
        }

        let monthly_ton = self.internal_loads.value(usage.code(), MONTHLY_PACKAGE_TON)?;
        let forklift_capacity = self.internal_loads.value(usage.code(), FORKLIFT_CAPACITY_TON)?;
        if !(forklift_capacity.is_finite() && forklift_capacity > 0.0) {
            return Err(LogisticsError::Configuration(format!(
                "forklift capacity of {usage} is {forklift_capacity} t; it must be > 0"
            )));
        }

        Ok(EnergyRateSpec {
            forklift: self.forklift_charge_kwh * monthly_ton * 12.0 / forklift_capacity,
            truck: self.truck.annual_energy(monthly_ton)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::error::ErrorKind;
    use crate::io::table::LabeledTable;
    use crate::logistics::truck::{CARRIER, DirectionalDistance, EfficiencyTable};
    use crate::logistics::weights::{DESTINATION, TruckCapacityWeightResolver};

    fn table(content: &str, index: &str) -> LabeledTable {
        LabeledTable::from_csv_str(content, Path::new("t.csv"), index).expect("table should parse")
    }

    fn deriver(loads: &str) -> RateDeriver {
        let distribution = TruckCapacityWeightResolver
            .resolve(&table("destination,2t\nin,1\nout,1\n", DESTINATION))
            .expect("valid cargo");
        let efficiency =
            EfficiencyTable::from_table(&table("energy,2t\ndiesel,4\nkWh,1\n", CARRIER)).expect("valid");
        let truck = TruckLogisticsModel::new(
            distribution,
            DirectionalDistance {
                inbound: 20.0,
                outbound: 40.0,
            },
            efficiency,
        )
        .expect("aligned classes");
        RateDeriver::new(table(loads, USAGE_CODE), &ForkliftConfig::default(), truck)
    }

    #[test]
    fn forklift_rate_scales_with_cargo_over_capacity() {
        let d = deriver("code,monthly_package_ton,forklift_capacity_ton\nCOLD,100,2\n");
        let rates = d.rates_for(&"COLD".into()).expect("COLD is listed");
        assert!((rates.forklift - 19.2 * 100.0 * 12.0 / 2.0).abs() < 1e-9);

        // 1200 t / 2 t = 600 trucks, half each way: 300*20 + 300*40 km
        assert!((rates.truck["diesel"] - 18000.0 / 4.0).abs() < 1e-9);
        assert!((rates.truck["kWh"] - 18000.0).abs() < 1e-9);
    }

    #[test]
    fn non_logistics_usage_gets_zero_rates_without_lookup() {
        let d = deriver("code,monthly_package_ton,forklift_capacity_ton\nCOLD,100,2\n");
        let rates = d.rates_for(&"OFFICE".into()).expect("not looked up");
        assert_eq!(rates, EnergyRateSpec::zero(["diesel", "kWh"]));
    }

    #[test]
    fn missing_logistics_usage_is_lookup_failure() {
        let d = deriver("code,monthly_package_ton,forklift_capacity_ton\nCOLD,100,2\n");
        let err = d.rates_for(&"COOL".into()).expect_err("COOL is not listed");
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn zero_forklift_capacity_is_configuration_error() {
        let d = deriver("code,monthly_package_ton,forklift_capacity_ton\nGENERAL,100,0\n");
        let err = d.rates_for(&"GENERAL".into()).expect_err("zero capacity");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
