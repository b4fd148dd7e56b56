// src/sources/worldometers.rs
//
// Global ranking table from worldometers.info.

use anyhow::Result;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use super::{data_slice, find_table, require_cells, td_texts, CountryRecord, Source, SourceTable};
use crate::{error::ScrapeError, parse};

const PAGE: &str = "worldometers";
const TABLE_ID: &str = "main_table_countries_today";

/// World and continent rows at the top of the table body.
const AGGREGATE_ROWS: usize = 8;
/// The totals row closing the table body.
const FOOTER_ROWS: usize = 1;
/// Rank, country and seven figures.
const CELLS: usize = 9;

/// Header fragments expected over cells 1..9, compared via `parse::header_key`.
const EXPECTED_HEADERS: [&str; CELLS - 1] = [
    "country",
    "totalcases",
    "newcases",
    "totaldeaths",
    "newdeaths",
    "totalrecovered",
    "activecases",
    "critical",
];

static TH: Lazy<Selector> = Lazy::new(|| Selector::parse("thead th").expect("selector should parse"));
static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("selector should parse"));

/// Parse the main page into a table keyed by the site's own country names,
/// which serve as the canonical spelling.
#[instrument(level = "info", skip(html))]
pub fn parse(html: &str, captured_at: NaiveDateTime) -> Result<SourceTable> {
    let doc = Html::parse_document(html);
    let table = find_table(&doc, PAGE, TABLE_ID)?;
    check_headers(table)?;

    let tbody = table
        .select(&TBODY)
        .next()
        .ok_or_else(|| ScrapeError::layout(PAGE, "table has no body"))?;
    let rows: Vec<ElementRef> = tbody
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .collect();
    let data = data_slice(&rows, PAGE, AGGREGATE_ROWS, FOOTER_ROWS)?;
    check_offset(&rows)?;

    let mut records = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let cells = td_texts(*row);
        require_cells(&cells, PAGE, i, CELLS)?;

        let record = CountryRecord {
            confirmed: parse::count(&cells[2]),
            new_confirmed: Some(parse::count(&cells[3])),
            deaths: parse::count(&cells[4]),
            new_deaths: Some(parse::count(&cells[5])),
            recovered: Some(parse::count(&cells[6])),
            active: Some(parse::count(&cells[7])),
            critical: Some(parse::count(&cells[8])),
            continent: None,
        };
        records.push((cells[1].clone(), record));
    }

    debug!(countries = records.len(), "parsed worldometers");
    Ok(SourceTable::from_records(
        Source::Worldometers,
        captured_at,
        records,
    ))
}

/// Aggregate rows carry no rank, country rows do. The last skipped row must be
/// unranked and the first kept row ranked, otherwise the offset has drifted.
fn check_offset(rows: &[ElementRef<'_>]) -> Result<(), ScrapeError> {
    let rank = |row: ElementRef<'_>| {
        td_texts(row)
            .first()
            .and_then(|c| c.parse::<u32>().ok())
    };
    if let Some(r) = rank(rows[AGGREGATE_ROWS - 1]) {
        return Err(ScrapeError::layout(
            PAGE,
            format!("country ranked {} inside the aggregate rows", r),
        ));
    }
    if rank(rows[AGGREGATE_ROWS]).is_none() {
        return Err(ScrapeError::layout(PAGE, "first data row is not ranked"));
    }
    Ok(())
}

fn check_headers(table: ElementRef<'_>) -> Result<(), ScrapeError> {
    let headers: Vec<String> = table
        .select(&TH)
        .map(|th| parse::header_key(&th.text().collect::<String>()))
        .collect();
    if headers.len() < CELLS {
        return Err(ScrapeError::layout(
            PAGE,
            format!("expected at least {} header cells, found {}", CELLS, headers.len()),
        ));
    }
    for (expected, found) in EXPECTED_HEADERS.iter().zip(&headers[1..CELLS]) {
        if !found.contains(expected) {
            return Err(ScrapeError::layout(
                PAGE,
                format!("header {:?} where {:?} was expected", found, expected),
            ));
        }
    }
    Ok(())
}
