// src/pipeline.rs
//
// fetch → parse → aggregate → report, each stage a function of the previous
// stage's output.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use reqwest::Client;
use scraper::Html;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::{
    aggregate::aggregate,
    config::Config,
    fetch,
    names::NameTables,
    report::{write_report, Report},
    sources::{ecdc, ncov, usa, worldometers},
};

/// Raw bodies of every page one run needs.
#[derive(Debug, Clone)]
pub struct Pages {
    pub worldometers: String,
    pub worldometers_usa: String,
    pub ecdc: String,
    pub ncov: String,
}

/// Fetch all pages concurrently. The first failure aborts the run.
#[instrument(level = "info", skip_all)]
pub async fn fetch_pages(client: &Client, config: &Config) -> Result<Pages> {
    let (worldometers, worldometers_usa, ecdc, ncov) = tokio::try_join!(
        fetch::get_text(client, &config.worldometers_url),
        fetch::get_text(client, &config.worldometers_usa_url),
        fetch::get_text(client, &config.ecdc_url),
        fetch::get_text(client, &config.ncov_url),
    )?;
    Ok(Pages {
        worldometers,
        worldometers_usa,
        ecdc,
        ncov,
    })
}

/// Parse and reconcile the fetched pages. A layout change in any of the three
/// main sources is fatal; the US breakdown is optional and only logged.
#[instrument(level = "info", skip(pages, names))]
pub fn build_report(
    pages: &Pages,
    names: &NameTables,
    captured_at: NaiveDateTime,
) -> Result<Report> {
    let worldometers = worldometers::parse(&pages.worldometers, captured_at)
        .context("parsing worldometers")?;
    let ecdc = ecdc::parse(&pages.ecdc, &names.ecdc, captured_at).context("parsing ecdc")?;

    let ncov_doc = Html::parse_document(&pages.ncov);
    let ncov = ncov::parse_document(&ncov_doc, &names.ncov, captured_at)
        .context("parsing nCov2019")?;

    let usa = match usa_breakdown(&ncov_doc, &pages.worldometers_usa) {
        Ok(b) => Some(b),
        Err(e) => {
            warn!(error = %format!("{:#}", e), "skipping USA_stats sheet");
            None
        }
    };

    let summary = aggregate(&worldometers, &ecdc, &ncov);
    info!(
        worldometers = worldometers.len(),
        ecdc = ecdc.len(),
        ncov = ncov.len(),
        summary = summary.len(),
        "reconciled sources"
    );

    Ok(Report {
        worldometers,
        ecdc,
        ncov,
        usa,
        summary,
    })
}

fn usa_breakdown(ncov_doc: &Html, worldometers_usa: &str) -> Result<usa::UsaBreakdown> {
    let ncov = usa::parse_ncov(ncov_doc)?;
    let worldometers = usa::parse_worldometers(worldometers_usa)?;
    Ok(usa::UsaBreakdown::new(ncov, worldometers))
}

/// One complete run: load name tables, fetch, reconcile, write the workbook.
/// Returns the path written.
pub async fn run(config: &Config) -> Result<PathBuf> {
    let names = NameTables::load(config)?;
    let client = fetch::build_client(config)?;
    let captured_at = Local::now().naive_local();

    let pages = fetch_pages(&client, config).await?;
    let report = build_report(&pages, &names, captured_at)?;
    write_report(&report, &config.output)?;
    Ok(config.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ScrapeError,
        fixtures::{self, NcovRow, WorldometersRow},
        names::NameTable,
        report::SUMMARY_SHEET,
    };
    use calamine::{open_workbook, Data, Reader, Xlsx};
    use chrono::NaiveDate;
    use std::path::Path;
    use tempfile::tempdir;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 12, 14)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid date")
    }

    fn names() -> NameTables {
        NameTables {
            ecdc: NameTable::from_pairs([
                ("United States of America", "USA"),
                ("United Arab Emirates", "UAE"),
            ]),
            ncov: NameTable::from_pairs([("United States", "USA"), ("Emirates", "UAE")]),
        }
    }

    /// Five countries per source, three of them (USA, Italy, UAE) in all three.
    fn pages() -> Pages {
        let w = |c: &str, total: &str, deaths: &str, recovered: &str| {
            WorldometersRow::new(c, [total, "+1", deaths, "", recovered, "7", "N/A"])
        };
        let n = |c: &str, total: &str, deaths: &str, recovered: &str| {
            NcovRow::new(c, [total, "", deaths, "Unknown", "5", recovered])
        };
        Pages {
            worldometers: fixtures::worldometers_page(&[
                w("USA", "1,000", "50", "400"),
                w("Italy", "800", "80", "300"),
                w("UAE", "300", "3", "200"),
                w("Japan", "200", "2", "100"),
                w("Chile", "100", "1", "50"),
            ]),
            ecdc: fixtures::ecdc_feed(&[
                ("United_States_of_America", "America", 600, 30),
                ("Italy", "Europe", 700, 70),
                ("United_States_of_America", "America", 390, 19),
                ("United_Arab_Emirates", "Asia", 290, 4),
                ("Peru", "America", 150, 9),
                ("Kenya", "Africa", 50, 1),
                ("Norway", "Europe", 40, 0),
            ]),
            ncov: fixtures::ncov_page(
                &[
                    n("United States", "1,010", "52", "410"),
                    n("Italy", "810", "81", "310"),
                    n("Emirates", "310", "3", "210"),
                    n("Peru", "160", "9", "80"),
                    n("Ghana", "90", "1", "40"),
                ],
                &[("New York", "500", "40", "100"), ("Texas", "400", "10", "200")],
            ),
            worldometers_usa: fixtures::worldometers_usa_page(&[
                ("Texas", "420", "11", "100"),
                ("New York", "510", "41", "300"),
            ]),
        }
    }

    fn read_sheets(path: &Path) -> Result<Vec<(String, Vec<Vec<Data>>)>> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let mut out = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let rows = range.rows().map(|r| r.to_vec()).collect();
            out.push((name, rows));
        }
        Ok(out)
    }

    #[test]
    fn three_common_countries_make_three_summary_rows() -> Result<()> {
        let report = build_report(&pages(), &names(), stamp())?;
        assert_eq!(report.summary.len(), 3);

        let countries: Vec<_> = report.summary.iter().map(|r| r.country.as_str()).collect();
        // America < Eastern Mediterranean < Europe
        assert_eq!(countries, ["USA", "UAE", "Italy"]);

        let usa = &report.summary[0];
        assert_eq!(usa.continent, "America");
        assert_eq!(usa.confirmed, [990, 1000, 1010]);
        assert_eq!(usa.deaths, [49, 50, 52]);
        assert_eq!(usa.recovered, [400, 410]);
        assert_eq!(usa.values().len() + 1, 9);

        let uae = &report.summary[1];
        assert_eq!(uae.continent, "Eastern Mediterranean");
        assert_eq!(uae.confirmed, [290, 300, 310]);

        let usa_stats = report.usa.expect("US tables parsed");
        assert_eq!(usa_stats.ncov[0].region, "New York");
        assert_eq!(usa_stats.worldometers[0].region, "New York");
        assert_eq!(usa_stats.worldometers[0].recovered, 510 - 41 - 300);
        Ok(())
    }

    #[test]
    fn summary_sheet_matches_per_source_lookups() -> Result<()> {
        let report = build_report(&pages(), &names(), stamp())?;
        let dir = tempdir()?;
        let path = dir.path().join("COVID19.xlsx");
        write_report(&report, &path)?;

        let mut workbook: Xlsx<_> = open_workbook(&path)?;
        let range = workbook.worksheet_range(SUMMARY_SHEET)?;
        for (i, row) in report.summary.iter().enumerate() {
            let line = i as u32 + 2;
            assert_eq!(
                range.get_value((line, 0)),
                Some(&Data::String(row.country.clone()))
            );
            let e = report.ecdc.get(&row.country).expect("in ecdc");
            let w = report.worldometers.get(&row.country).expect("in worldometers");
            let n = report.ncov.get(&row.country).expect("in nCov2019");
            let expected = [
                e.confirmed,
                w.confirmed,
                n.confirmed,
                e.deaths,
                w.deaths,
                n.deaths,
                w.recovered.unwrap_or(0),
                n.recovered.unwrap_or(0),
            ];
            for (j, value) in expected.iter().enumerate() {
                assert_eq!(
                    range.get_value((line, j as u32 + 2)),
                    Some(&Data::Float(*value as f64))
                );
            }
        }
        Ok(())
    }

    #[test]
    fn rerun_on_frozen_pages_is_identical() -> Result<()> {
        let dir = tempdir()?;
        let first = dir.path().join("first.xlsx");
        let second = dir.path().join("second.xlsx");
        write_report(&build_report(&pages(), &names(), stamp())?, &first)?;
        write_report(&build_report(&pages(), &names(), stamp())?, &second)?;
        assert_eq!(read_sheets(&first)?, read_sheets(&second)?);
        Ok(())
    }

    #[test]
    fn broken_main_source_is_fatal() {
        let mut broken = pages();
        broken.worldometers = "<html><body>maintenance</body></html>".to_string();
        let err = build_report(&broken, &names(), stamp()).unwrap_err();
        let layout = err
            .chain()
            .filter_map(|e| e.downcast_ref::<ScrapeError>())
            .any(ScrapeError::is_layout_change);
        assert!(layout, "{:#}", err);
    }

    #[test]
    fn broken_usa_page_only_drops_the_usa_sheet() -> Result<()> {
        let mut broken = pages();
        broken.worldometers_usa = String::new();
        let report = build_report(&broken, &names(), stamp())?;
        assert!(report.usa.is_none());
        assert_eq!(report.summary.len(), 3);
        Ok(())
    }
}
