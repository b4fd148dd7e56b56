//! Scrapes COVID-19 case statistics from three public sources, reconciles
//! country names, and writes a multi-sheet workbook comparing them.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod names;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod sources;

#[cfg(test)]
mod fixtures;

pub use aggregate::{aggregate, SummaryRow};
pub use config::Config;
pub use error::ScrapeError;
pub use sources::{CountryRecord, Source, SourceTable};
