//! Shared test fixtures for integration tests.
//!
//! [`Scenario::standard`] writes a complete miniature scenario in the default
//! layout: four buildings, three logistics usage schedules, the internal loads
//! and logistics reference tables, and one week of hourly demand per building.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDate, NaiveDateTime};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Buildings of the standard fixture: (name, footprint m2, floors, usage).
pub const BUILDINGS: [(&str, f64, f64, &str); 4] = [
    ("B001", 250.0, 4.0, "COLD"),
    ("B002", 120.0, 3.0, "OFFICE"),
    ("B003", 400.0, 1.0, "GENERAL"),
    ("B004", 80.0, 2.0, "COOL"),
];

/// Hours of demand written per building: one week starting Monday 2007-01-01.
pub const HOURS: usize = 7 * 24;

/// Monthly tonnage and forklift capacity of each logistics usage.
pub const INTERNAL_LOADS: &str = "\
code,monthly_package_ton,forklift_capacity_ton
COLD,100,2
COOL,40,1.5
GENERAL,250,2.5
";

pub const DESTINATION: &str = "\
destination,10km,100km
in,1,1
out,3,1
";

pub const MONTHLY_CARGOS: &str = "\
destination,2t,10t
in,30,20
out,10,40
";

pub const EFFICIENCY: &str = "\
energy,10t,2t
diesel,2,3
kWh,0.5,0.8
";

/// A scenario directory under the system temp dir, removed on drop.
pub struct Scenario {
    pub root: PathBuf,
}

impl Scenario {
    pub fn empty(tag: &str) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        let root = std::env::temp_dir().join(format!("logistic-load-{tag}-{}-{id}", process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).expect("create scenario root");
        Self { root }
    }

    pub fn standard(tag: &str) -> Self {
        let scenario = Self::empty(tag);

        let mut zone = String::from("Name,footprint_area_m2\n");
        let mut typology = String::from("Name,1ST_USE,2ND_USE\n");
        let mut architecture = String::from("Name,floors_ag,floors_bg\n");
        for (name, footprint, floors, usage) in BUILDINGS {
            zone.push_str(&format!("{name},{footprint}\n"));
            typology.push_str(&format!("{name},{usage},NONE\n"));
            architecture.push_str(&format!("{name},{floors},1\n"));
        }
        scenario.write("inputs/building-geometry/zone.csv", &zone);
        scenario.write("inputs/building-properties/typology.csv", &typology);
        scenario.write("inputs/building-properties/architecture.csv", &architecture);

        for (usage, scale) in [("COLD", 1.0), ("COOL", 0.5), ("GENERAL", 2.0)] {
            scenario.write(
                &format!("inputs/technology/archetypes/use_types/{usage}.csv"),
                &occupancy_csv(scale),
            );
        }
        scenario.write(
            "inputs/technology/archetypes/use_types/INTERNAL_LOADS.csv",
            INTERNAL_LOADS,
        );
        scenario.write("inputs/technology/logistics/destination.csv", DESTINATION);
        scenario.write("inputs/technology/logistics/monthly_cargos.csv", MONTHLY_CARGOS);
        scenario.write("inputs/technology/logistics/efficiency.csv", EFFICIENCY);

        for (name, ..) in BUILDINGS {
            scenario.write(
                &format!("outputs/data/demand/{name}.csv"),
                &demand_csv(name, HOURS),
            );
        }
        scenario
    }

    /// Writes a file relative to the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(&path, content).expect("write fixture file");
    }

    pub fn demand_path(&self, building: &str) -> PathBuf {
        self.root.join(format!("outputs/data/demand/{building}.csv"))
    }

    pub fn read_demand(&self, building: &str) -> String {
        fs::read_to_string(self.demand_path(building)).expect("read demand file")
    }

    pub fn remove_demand(&self, building: &str) {
        fs::remove_file(self.demand_path(building)).expect("remove demand file");
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}

impl Drop for Scenario {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Day labels of the occupancy files with their base intensity.
pub const DAY_BASES: [(&str, f64); 3] = [("WEEKDAY", 1.0), ("SATURDAY", 0.5), ("SUNDAY", 0.1)];

/// Occupancy weight of the 1-based `hour` row of a day type.
pub fn occupancy_weight(base: f64, scale: f64, hour: u32) -> f64 {
    if (7..=19).contains(&hour) {
        base * scale * (1.0 + f64::from(hour % 4) / 4.0)
    } else {
        0.0
    }
}

/// Sum of one day's weights for weekday, Saturday and Sunday.
pub fn daily_weight_sums(scale: f64) -> [f64; 3] {
    DAY_BASES.map(|(_, base)| (1..=24).map(|h| occupancy_weight(base, scale, h)).sum())
}

/// Two metadata lines, then 24 rows per day type with uneven weights.
pub fn occupancy_csv(scale: f64) -> String {
    let mut out = String::from("METADATA,logistics\nMONTHLY_MULTIPLIER,1,1,1,1,1,1,1,1,1,1,1,1\n");
    out.push_str("DAY,HOUR,OCCUPANCY,APPLIANCES\n");
    for (day, base) in DAY_BASES {
        for hour in 1..=24 {
            let weight = occupancy_weight(base, scale, hour);
            out.push_str(&format!("{day},{hour},{weight},0.1\n"));
        }
    }
    out
}

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2007, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start")
}

/// Hourly demand with offset timestamps and a couple of unrelated columns.
pub fn demand_csv(building: &str, hours: usize) -> String {
    let mut out = String::from("Name,DATE,GRID_kWh,QH_sys_kWh\n");
    for h in 0..hours {
        let ts = start() + Duration::hours(h as i64);
        out.push_str(&format!(
            "{building},{}+08:00,{:.2},{}\n",
            ts.format("%Y-%m-%d %H:%M:%S"),
            1.0 + (h % 5) as f64 * 0.25,
            h % 3
        ));
    }
    out
}

/// Parses a rewritten demand file into its header and rows.
pub fn parse_demand(content: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());
    let headers = rdr
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect();
    let rows = rdr
        .records()
        .map(|r| r.expect("record").iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

/// Numeric values of one column of a rewritten demand file.
pub fn column(content: &str, name: &str) -> Vec<f64> {
    let (headers, rows) = parse_demand(content);
    let idx = headers
        .iter()
        .position(|h| h == name)
        .unwrap_or_else(|| panic!("column {name} missing from {headers:?}"));
    rows.iter()
        .map(|row| row[idx].parse().expect("numeric cell"))
        .collect()
}
