// src/sources/ecdc.rs
//
// ECDC open-data case distribution feed: one record per country per day.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

use super::{CountryRecord, Source, SourceTable};
use crate::{error::ScrapeError, names::NameTable, parse};

const PAGE: &str = "ecdc";

#[derive(Debug, Deserialize)]
struct Feed {
    records: Vec<DailyRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyRecord {
    countries_and_territories: String,
    #[serde(default)]
    continent_exp: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    cases: i64,
    #[serde(default, deserialize_with = "lenient_count")]
    deaths: i64,
}

/// The feed publishes counts as numbers or as strings, depending on vintage.
fn lenient_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => n,
        Some(Raw::Float(f)) => parse::float_count(f).unwrap_or(0),
        Some(Raw::Text(s)) => parse::signed(&s),
        Some(Raw::Other(_)) | None => 0,
    })
}

/// Sum daily rows into cumulative per-country totals.
///
/// Labels have underscores turned into spaces and then go through `names`.
/// Daily corrections can be negative; a total below zero is clamped to 0.
#[instrument(level = "info", skip(json, names))]
pub fn parse(json: &str, names: &NameTable, captured_at: NaiveDateTime) -> Result<SourceTable> {
    let feed: Feed = serde_json::from_str(json)
        .map_err(|e| ScrapeError::layout(PAGE, format!("unexpected feed shape: {}", e)))?;
    debug!(days = feed.records.len(), "decoded ecdc feed");

    let mut totals: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    let mut continents: HashMap<&str, Option<&str>> = HashMap::new();
    for day in &feed.records {
        let country = day.countries_and_territories.as_str();
        let entry = totals.entry(country).or_default();
        entry.0 = entry.0.saturating_add(day.cases);
        entry.1 = entry.1.saturating_add(day.deaths);
        continents
            .entry(country)
            .or_insert(day.continent_exp.as_deref());
    }

    let records = totals.into_iter().map(|(raw, (cases, deaths))| {
        let label = raw.replace('_', " ");
        let record = CountryRecord {
            confirmed: cases.max(0) as u64,
            deaths: deaths.max(0) as u64,
            continent: continents.get(raw).copied().flatten().map(str::to_string),
            ..Default::default()
        };
        (names.normalize(&label).to_string(), record)
    });

    Ok(SourceTable::from_records(Source::Ecdc, captured_at, records))
}
