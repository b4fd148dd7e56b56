// src/aggregate.rs
//
// Cross-source summary: one row per country reported by all three sources.

use tracing::{debug, instrument};

use crate::sources::{Source, SourceTable};

/// Region label for countries the ECDC feed files under a broader continent.
pub const EASTERN_MEDITERRANEAN: &str = "Eastern Mediterranean";

pub const EASTERN_MEDITERRANEAN_COUNTRIES: [&str; 19] = [
    "Israel",
    "UAE",
    "Egypt",
    "Iran",
    "Lebanon",
    "Cyprus",
    "Palestine",
    "Iraq",
    "Kuwait",
    "Oman",
    "Bahrain",
    "Azerbaijan",
    "Qatar",
    "Saudi Arabia",
    "Jordan",
    "Turkey",
    "Uzbekistan",
    "Kyrgyzstan",
    "Syria",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Confirmed,
    Deaths,
    Recovered,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Confirmed => "Confirmed",
            Metric::Deaths => "Deaths",
            Metric::Recovered => "Recovered",
        }
    }
}

/// Numeric summary columns, after the continent column. The ECDC feed has no
/// recovered figure, so that pair is absent.
pub const SUMMARY_COLUMNS: [(Metric, Source); 8] = [
    (Metric::Confirmed, Source::Ecdc),
    (Metric::Confirmed, Source::Worldometers),
    (Metric::Confirmed, Source::NCov2019),
    (Metric::Deaths, Source::Ecdc),
    (Metric::Deaths, Source::Worldometers),
    (Metric::Deaths, Source::NCov2019),
    (Metric::Recovered, Source::Worldometers),
    (Metric::Recovered, Source::NCov2019),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub country: String,
    pub continent: String,
    /// ecdc, worldometers, nCov2019
    pub confirmed: [u64; 3],
    /// ecdc, worldometers, nCov2019
    pub deaths: [u64; 3],
    /// worldometers, nCov2019
    pub recovered: [u64; 2],
}

impl SummaryRow {
    /// Values in [`SUMMARY_COLUMNS`] order.
    pub fn values(&self) -> [u64; 8] {
        let [c0, c1, c2] = self.confirmed;
        let [d0, d1, d2] = self.deaths;
        let [r0, r1] = self.recovered;
        [c0, c1, c2, d0, d1, d2, r0, r1]
    }
}

/// Replace the continent of the listed Middle-Eastern countries.
pub fn override_continent<'a>(country: &str, continent: &'a str) -> &'a str {
    if EASTERN_MEDITERRANEAN_COUNTRIES.contains(&country) {
        EASTERN_MEDITERRANEAN
    } else {
        continent
    }
}

/// Intersection join of the three tables on canonical country name.
///
/// The ECDC table is the join base and fixes the initial row order; a country
/// missing from any table is dropped. Rows are then stable-sorted by the
/// (overridden) continent.
#[instrument(level = "info", skip_all, fields(
    worldometers = worldometers.len(),
    ecdc = ecdc.len(),
    ncov = ncov.len(),
))]
pub fn aggregate(
    worldometers: &SourceTable,
    ecdc: &SourceTable,
    ncov: &SourceTable,
) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = ecdc
        .iter()
        .filter_map(|(country, e)| {
            let w = worldometers.get(country)?;
            let n = ncov.get(country)?;
            let continent = e.continent.as_deref().unwrap_or("");
            Some(SummaryRow {
                country: country.to_string(),
                continent: override_continent(country, continent).to_string(),
                confirmed: [e.confirmed, w.confirmed, n.confirmed],
                deaths: [e.deaths, w.deaths, n.deaths],
                recovered: [w.recovered.unwrap_or(0), n.recovered.unwrap_or(0)],
            })
        })
        .collect();

    rows.sort_by(|a, b| a.continent.cmp(&b.continent));
    debug!(rows = rows.len(), "aggregated summary");
    rows
}
