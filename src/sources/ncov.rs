// src/sources/ncov.rs
//
// World table of the ncov2019.live tracker.

use anyhow::Result;
use chrono::NaiveDateTime;
use scraper::Html;
use tracing::{debug, instrument};

use super::{all_rows, cell_texts, data_slice, find_table, require_cells, CountryRecord, Source, SourceTable};
use crate::{names::NameTable, parse};

const PAGE: &str = "nCov2019";
const TABLE_ID: &str = "sortable_table_world";

/// Column header row plus the world total row.
pub(crate) const HEADER_ROWS: usize = 2;
/// Cells left once the leading flag cell is dropped.
pub(crate) const CELLS: usize = 11;

// Positions after the flag cell; 3, 4, 7 and 8 hold percentages and tests.
const COUNTRY: usize = 0;
const CONFIRMED: usize = 1;
const NEW_CONFIRMED: usize = 2;
const DEATHS: usize = 5;
const NEW_DEATHS: usize = 6;
const ACTIVE: usize = 9;
const RECOVERED: usize = 10;

/// Parse the world table; `"Unknown"` cells count as 0 and country labels go
/// through `names`.
pub fn parse(html: &str, names: &NameTable, captured_at: NaiveDateTime) -> Result<SourceTable> {
    let doc = Html::parse_document(html);
    parse_document(&doc, names, captured_at)
}

/// Same as [`parse`] over an already parsed page, which also carries the US table.
#[instrument(level = "info", skip(doc, names))]
pub(crate) fn parse_document(
    doc: &Html,
    names: &NameTable,
    captured_at: NaiveDateTime,
) -> Result<SourceTable> {
    let table = find_table(doc, PAGE, TABLE_ID)?;
    let rows = all_rows(table);
    let data = data_slice(&rows, PAGE, HEADER_ROWS, 0)?;

    let mut records = Vec::with_capacity(data.len());
    for (i, row) in data.iter().enumerate() {
        let cells = cell_texts(*row);
        let cells = cells.get(1..).unwrap_or_default();
        require_cells(cells, PAGE, i, CELLS)?;

        let record = CountryRecord {
            confirmed: parse::count(&cells[CONFIRMED]),
            new_confirmed: Some(parse::count(&cells[NEW_CONFIRMED])),
            deaths: parse::count(&cells[DEATHS]),
            new_deaths: Some(parse::count(&cells[NEW_DEATHS])),
            recovered: Some(parse::count(&cells[RECOVERED])),
            active: Some(parse::count(&cells[ACTIVE])),
            critical: None,
            continent: None,
        };
        records.push((names.normalize(&cells[COUNTRY]).to_string(), record));
    }

    debug!(countries = records.len(), "parsed nCov2019");
    Ok(SourceTable::from_records(Source::NCov2019, captured_at, records))
}
