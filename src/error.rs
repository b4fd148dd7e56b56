// src/error.rs

use thiserror::Error;

/// Conditions callers may want to tell apart from plain I/O or network failures.
///
/// These travel inside `anyhow::Error` like everything else; use
/// `err.downcast_ref::<ScrapeError>()` to match on them.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A scraped page no longer has the shape the parser depends on.
    #[error("{page}: source layout changed: {detail}")]
    LayoutChanged { page: &'static str, detail: String },

    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

impl ScrapeError {
    pub(crate) fn layout(page: &'static str, detail: impl Into<String>) -> Self {
        ScrapeError::LayoutChanged {
            page,
            detail: detail.into(),
        }
    }

    pub fn is_layout_change(&self) -> bool {
        matches!(self, ScrapeError::LayoutChanged { .. })
    }
}
