// src/report.rs
//
// Workbook layout for the source tables, the US breakdown and the summary.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;
use tracing::{info, instrument};

use crate::{
    aggregate::{Metric, SummaryRow, SUMMARY_COLUMNS},
    sources::{
        usa::{RegionRecord, UsaBreakdown, TOP_N},
        FieldValue, Source, SourceTable,
    },
};

pub const SUMMARY_SHEET: &str = "Summary";
pub const USA_SHEET: &str = "USA_stats";
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Everything one run renders.
#[derive(Debug, Clone)]
pub struct Report {
    pub worldometers: SourceTable,
    pub ecdc: SourceTable,
    pub ncov: SourceTable,
    pub usa: Option<UsaBreakdown>,
    pub summary: Vec<SummaryRow>,
}

/// Render `report` and save it to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    for table in [&report.worldometers, &report.ecdc, &report.ncov] {
        let sheet = workbook
            .add_worksheet()
            .set_name(table.source().name())
            .with_context(|| format!("creating sheet {}", table.source()))?;
        write_source_sheet(sheet, table)
            .with_context(|| format!("writing sheet {}", table.source()))?;
    }

    if let Some(usa) = &report.usa {
        let sheet = workbook
            .add_worksheet()
            .set_name(USA_SHEET)
            .context("creating sheet USA_stats")?;
        write_usa_sheet(sheet, usa).context("writing sheet USA_stats")?;
    }

    let sheet = workbook
        .add_worksheet()
        .set_name(SUMMARY_SHEET)
        .context("creating sheet Summary")?;
    write_summary_sheet(sheet, &report.summary).context("writing sheet Summary")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    workbook
        .save(path)
        .with_context(|| format!("saving report to {}", path.display()))?;
    info!(summary_rows = report.summary.len(), "report saved");
    Ok(())
}

fn centered() -> Format {
    Format::new()
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Header at row 1, one row per country, capture time in the last column.
fn write_source_sheet(sheet: &mut Worksheet, table: &SourceTable) -> Result<()> {
    let fields = table.source().fields();
    let stamp_col = fields.len() as u16 + 1;
    let stamp = table.captured_at().format(TIMESTAMP_FORMAT).to_string();

    sheet.write_string(0, 0, "Country")?;
    for (i, field) in fields.iter().enumerate() {
        sheet.write_string(0, i as u16 + 1, field.label())?;
    }
    sheet.write_string(0, stamp_col, "Captured At")?;

    for (r, (country, record)) in table.iter().enumerate() {
        let row = r as u32 + 1;
        sheet.write_string(row, 0, country)?;
        for (i, field) in fields.iter().enumerate() {
            let col = i as u16 + 1;
            match field.value(record) {
                FieldValue::Text(s) => sheet.write_string(row, col, s)?,
                FieldValue::Number(n) => sheet.write_number(row, col, n as f64)?,
            };
        }
        sheet.write_string(row, stamp_col, &stamp)?;
    }
    Ok(())
}

/// Two side-by-side blocks (nCov2019 in B:E, worldometers in G:J) under merged
/// titles, ranks in column A.
fn write_usa_sheet(sheet: &mut Worksheet, usa: &UsaBreakdown) -> Result<()> {
    let title = centered();
    let blocks: [(Source, &[RegionRecord]); 2] = [
        (Source::NCov2019, &usa.ncov),
        (Source::Worldometers, &usa.worldometers),
    ];

    for rank in 0..TOP_N {
        sheet.write_number_with_format(rank as u32 + 2, 0, (rank + 1) as f64, &title)?;
    }

    for (b, (source, regions)) in blocks.iter().enumerate() {
        let first = 1 + b as u16 * 5;
        sheet.merge_range(0, first, 0, first + 3, source.name(), &title)?;
        for (i, label) in ["Region", "Confirmed", "Deaths", "Recovered"].iter().enumerate() {
            sheet.write_string(1, first + i as u16, *label)?;
        }
        for (r, region) in regions.iter().enumerate() {
            let row = r as u32 + 2;
            sheet.write_string(row, first, &region.region)?;
            sheet.write_number(row, first + 1, region.confirmed as f64)?;
            sheet.write_number(row, first + 2, region.deaths as f64)?;
            sheet.write_number(row, first + 3, region.recovered as f64)?;
        }
    }
    Ok(())
}

/// Two-level header: merged metric groups on row 1, source names on row 2.
fn write_summary_sheet(sheet: &mut Worksheet, rows: &[SummaryRow]) -> Result<()> {
    let title = centered();
    sheet.write_string_with_format(0, 1, "Continent", &title)?;
    sheet.write_string(1, 0, "Country")?;
    sheet.write_string(1, 1, "Continent")?;

    let mut col = 2u16;
    for (metric, width) in metric_groups() {
        if width > 1 {
            sheet.merge_range(0, col, 0, col + width - 1, metric.label(), &title)?;
        } else {
            sheet.write_string_with_format(0, col, metric.label(), &title)?;
        }
        col += width;
    }
    for (i, (_, source)) in SUMMARY_COLUMNS.iter().enumerate() {
        sheet.write_string(1, i as u16 + 2, source.name())?;
    }

    for (r, row) in rows.iter().enumerate() {
        let line = r as u32 + 2;
        sheet.write_string(line, 0, &row.country)?;
        sheet.write_string(line, 1, &row.continent)?;
        for (i, value) in row.values().iter().enumerate() {
            sheet.write_number(line, i as u16 + 2, *value as f64)?;
        }
    }
    Ok(())
}

/// Runs of equal metrics in [`SUMMARY_COLUMNS`] with their width.
fn metric_groups() -> Vec<(Metric, u16)> {
    let mut groups: Vec<(Metric, u16)> = Vec::new();
    for (metric, _) in SUMMARY_COLUMNS {
        match groups.last_mut() {
            Some((last, width)) if *last == metric => *width += 1,
            _ => groups.push((metric, 1)),
        }
    }
    groups
}
