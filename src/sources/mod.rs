// src/sources/mod.rs

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use tracing::warn;

use crate::error::ScrapeError;

pub mod ecdc;
pub mod ncov;
pub mod usa;
pub mod worldometers;

/// One of the three independent data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Worldometers,
    Ecdc,
    NCov2019,
}

impl Source {
    /// Used as sheet name and as sub-header in the summary.
    pub const fn name(self) -> &'static str {
        match self {
            Source::Worldometers => "worldometers",
            Source::Ecdc => "ecdc",
            Source::NCov2019 => "nCov2019",
        }
    }

    /// The fields this source reports, in sheet column order.
    pub fn fields(self) -> &'static [Field] {
        use Field::*;
        match self {
            Source::Worldometers => &[
                Confirmed,
                NewConfirmed,
                Deaths,
                NewDeaths,
                Recovered,
                Active,
                Critical,
            ],
            Source::Ecdc => &[Continent, Confirmed, Deaths],
            Source::NCov2019 => &[Confirmed, NewConfirmed, Deaths, NewDeaths, Active, Recovered],
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A column of a [`CountryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Continent,
    Confirmed,
    NewConfirmed,
    Deaths,
    NewDeaths,
    Recovered,
    Active,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(u64),
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Continent => "Continent",
            Field::Confirmed => "Confirmed",
            Field::NewConfirmed => "New Confirmed",
            Field::Deaths => "Deaths",
            Field::NewDeaths => "New Deaths",
            Field::Recovered => "Recovered",
            Field::Active => "Active",
            Field::Critical => "Critical",
        }
    }

    /// Fields the record does not carry render as 0 / empty text.
    pub fn value(self, record: &CountryRecord) -> FieldValue<'_> {
        let n = |v: Option<u64>| FieldValue::Number(v.unwrap_or(0));
        match self {
            Field::Continent => FieldValue::Text(record.continent.as_deref().unwrap_or("")),
            Field::Confirmed => FieldValue::Number(record.confirmed),
            Field::NewConfirmed => n(record.new_confirmed),
            Field::Deaths => FieldValue::Number(record.deaths),
            Field::NewDeaths => n(record.new_deaths),
            Field::Recovered => n(record.recovered),
            Field::Active => n(record.active),
            Field::Critical => n(record.critical),
        }
    }
}

/// Per-country figures from one source.
///
/// `None` marks a field the source does not publish; a published but blank or
/// malformed cell is `Some(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryRecord {
    pub confirmed: u64,
    pub new_confirmed: Option<u64>,
    pub deaths: u64,
    pub new_deaths: Option<u64>,
    pub recovered: Option<u64>,
    pub active: Option<u64>,
    pub critical: Option<u64>,
    pub continent: Option<String>,
}

/// Canonical country name → record for one source, ordered by confirmed count
/// (highest first).
#[derive(Debug, Clone)]
pub struct SourceTable {
    source: Source,
    captured_at: NaiveDateTime,
    rows: Vec<(String, CountryRecord)>,
    index: HashMap<String, usize>,
}

impl SourceTable {
    /// Build a table from parsed rows.
    ///
    /// Names must be canonical already. When two rows share a name the first
    /// one wins. Rows are stable-sorted descending by confirmed count.
    pub fn from_records<I>(source: Source, captured_at: NaiveDateTime, records: I) -> Self
    where
        I: IntoIterator<Item = (String, CountryRecord)>,
    {
        let mut seen = HashSet::new();
        let mut rows = Vec::new();
        for (name, record) in records {
            if !seen.insert(name.clone()) {
                warn!(%source, country = %name, "duplicate country after normalization; keeping first");
                continue;
            }
            rows.push((name, record));
        }
        rows.sort_by(|a, b| b.1.confirmed.cmp(&a.1.confirmed));

        let index = rows
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Self {
            source,
            captured_at,
            rows,
            index,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    pub fn get(&self, country: &str) -> Option<&CountryRecord> {
        self.index.get(country).map(|&i| &self.rows[i].1)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.index.contains_key(country)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CountryRecord)> {
        self.rows.iter().map(|(name, rec)| (name.as_str(), rec))
    }
}

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("selector should parse"));
static TR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector should parse"));
static TD: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("selector should parse"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("selector should parse"));

/// Find `<table id="...">` or report the layout change.
pub(crate) fn find_table<'a>(
    doc: &'a Html,
    page: &'static str,
    id: &str,
) -> Result<ElementRef<'a>, ScrapeError> {
    doc.select(&TABLE)
        .find(|t| t.value().id() == Some(id))
        .ok_or_else(|| ScrapeError::layout(page, format!("no table with id {:?}", id)))
}

/// Every `<tr>` under `table`, header rows included.
pub(crate) fn all_rows<'a>(table: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    table.select(&TR).collect()
}

/// Trimmed text of each `<td>` in a row.
pub(crate) fn td_texts(row: ElementRef<'_>) -> Vec<String> {
    texts(row, &TD)
}

/// Trimmed text of each `<td>` or `<th>` in a row.
pub(crate) fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    texts(row, &CELL)
}

fn texts(row: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    row.select(sel)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Rows between a fixed number of leading header rows and trailing footer
/// rows. Fails when the table is too short to hold any data row.
pub(crate) fn data_slice<'r, T>(
    rows: &'r [T],
    page: &'static str,
    leading: usize,
    trailing: usize,
) -> Result<&'r [T], ScrapeError> {
    if rows.len() <= leading + trailing {
        return Err(ScrapeError::layout(
            page,
            format!(
                "expected more than {} header/footer rows, found {} rows",
                leading + trailing,
                rows.len()
            ),
        ));
    }
    Ok(&rows[leading..rows.len() - trailing])
}

/// Ensure a row has at least `expected` cells.
pub(crate) fn require_cells(
    cells: &[String],
    page: &'static str,
    row: usize,
    expected: usize,
) -> Result<(), ScrapeError> {
    if cells.len() < expected {
        return Err(ScrapeError::layout(
            page,
            format!("row {} has {} cells, expected {}", row, cells.len(), expected),
        ));
    }
    Ok(())
}
