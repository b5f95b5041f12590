//! Test data generation utilities.
//!
//! Writes national and per-county CSV files shaped like the DSSG Portugal
//! datasets, with known values so tests can assert on them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Counties present on every date of the regional fixture
pub const COUNTIES: [&str; 2] = ["Gondomar", "PORTO"];

/// National rows for 01-04-2020 through `days`-04-2020.
///
/// `confirmados` on day `d` is `1000 + d * 10`.
pub fn national_csv(days: u32) -> String {
    let mut csv = String::from("data,data_dados,confirmados,obitos,recuperados\n");
    for day in 1..=days {
        csv.push_str(&format!(
            "{:02}-04-2020,{:02}-04-2020 00:00,{},{},\n",
            day,
            day,
            1000 + day * 10,
            day
        ));
    }
    csv
}

/// Regional rows for every county in [`COUNTIES`] on 01-04-2020 through `days`-04-2020.
pub fn regional_csv(days: u32) -> String {
    let mut csv = String::from("concelho,data,confirmados_14,incidencia\n");
    for day in 1..=days {
        for (idx, county) in COUNTIES.iter().enumerate() {
            csv.push_str(&format!(
                "{},{:02}-04-2020,{},{:.1}\n",
                county,
                day,
                day * (idx as u32 + 1),
                day as f64 * 1.5
            ));
        }
    }
    csv
}

/// Write both fixtures into `dir`, returning (national, regional) paths
pub fn write_fixtures(dir: &Path, days: u32) -> io::Result<(PathBuf, PathBuf)> {
    let national = dir.join("data.csv");
    let regional = dir.join("data_concelhos_new.csv");
    fs::write(&national, national_csv(days))?;
    fs::write(&regional, regional_csv(days))?;
    Ok((national, regional))
}
