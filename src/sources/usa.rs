// src/sources/usa.rs
//
// Per-state breakdown of US figures from two of the sources.

use anyhow::Result;
use scraper::Html;
use tracing::{debug, instrument};

use super::{all_rows, cell_texts, data_slice, find_table, ncov, require_cells, td_texts};
use crate::parse;

/// Rows kept per source in the report.
pub const TOP_N: usize = 15;

const NCOV_PAGE: &str = "nCov2019 (US)";
const NCOV_TABLE_ID: &str = "sortable_table_unitedstates";
const NCOV_CONFIRMED: usize = 1;
const NCOV_DEATHS: usize = 5;
const NCOV_RECOVERED: usize = 10;

const WORLDOMETERS_PAGE: &str = "worldometers (US)";
const WORLDOMETERS_TABLE_ID: &str = "usa_table_countries_today";
/// Header row and the country total row.
const WORLDOMETERS_LEADING: usize = 2;
const WORLDOMETERS_TRAILING: usize = 1;
const WORLDOMETERS_CELLS: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionRecord {
    pub region: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// The largest states of each source, highest confirmed count first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsaBreakdown {
    pub ncov: Vec<RegionRecord>,
    pub worldometers: Vec<RegionRecord>,
}

impl UsaBreakdown {
    pub fn new(ncov: Vec<RegionRecord>, worldometers: Vec<RegionRecord>) -> Self {
        Self {
            ncov: top(ncov),
            worldometers: top(worldometers),
        }
    }
}

fn top(mut rows: Vec<RegionRecord>) -> Vec<RegionRecord> {
    rows.sort_by(|a, b| b.confirmed.cmp(&a.confirmed));
    rows.truncate(TOP_N);
    rows
}

/// US table of the nCov2019 page. Figures are coerced leniently.
pub fn parse_ncov(doc: &Html) -> Result<Vec<RegionRecord>> {
    let table = find_table(doc, NCOV_PAGE, NCOV_TABLE_ID)?;
    let rows = all_rows(table);
    let data = data_slice(&rows, NCOV_PAGE, ncov::HEADER_ROWS, 0)?;

    let mut out = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let cells = cell_texts(*row);
        let cells = cells.get(1..).unwrap_or_default();
        require_cells(cells, NCOV_PAGE, i, ncov::CELLS)?;
        out.push(RegionRecord {
            region: cells[0].clone(),
            confirmed: parse::count(&cells[NCOV_CONFIRMED]),
            deaths: parse::count(&cells[NCOV_DEATHS]),
            recovered: parse::count(&cells[NCOV_RECOVERED]),
        });
    }
    debug!(regions = out.len(), "parsed nCov2019 US table");
    Ok(out)
}

/// US page of worldometers. The site publishes active rather than recovered
/// cases, so recovered is derived as confirmed - deaths - active. States with
/// any of the three figures missing are skipped.
#[instrument(level = "info", skip(html))]
pub fn parse_worldometers(html: &str) -> Result<Vec<RegionRecord>> {
    let doc = Html::parse_document(html);
    let table = find_table(&doc, WORLDOMETERS_PAGE, WORLDOMETERS_TABLE_ID)?;
    let rows = all_rows(table);
    let data = data_slice(&rows, WORLDOMETERS_PAGE, WORLDOMETERS_LEADING, WORLDOMETERS_TRAILING)?;

    let mut out = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let cells = td_texts(*row);
        require_cells(&cells, WORLDOMETERS_PAGE, i, WORLDOMETERS_CELLS)?;
        let figures = (
            parse::strict_count(&cells[2]),
            parse::strict_count(&cells[4]),
            parse::strict_count(&cells[6]),
        );
        let (Some(confirmed), Some(deaths), Some(active)) = figures else {
            debug!(region = %cells[1], "skipping state with missing figures");
            continue;
        };
        out.push(RegionRecord {
            region: parse::clean_str(&cells[1]),
            confirmed,
            deaths,
            recovered: confirmed.saturating_sub(deaths).saturating_sub(active),
        });
    }
    debug!(regions = out.len(), "parsed worldometers US table");
    Ok(out)
}
