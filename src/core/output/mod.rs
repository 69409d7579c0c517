//! Delimited output for warehouse tables
//!
//! - [`row`] - row rendering and free-text cleaning
//! - [`writer`] - append-only detail table sink

pub mod row;
pub mod writer;

pub use row::{clean, iso8601, Row, TIMESTAMP_FORMAT};
pub use writer::DetailTableWriter;

use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Builds the comma-delimited writer shared by every table
///
/// Fields are cleaned before they reach the writer, so quoting is disabled.
pub(crate) fn csv_writer<W: Write>(sink: W) -> csv::Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .flexible(true)
        .from_writer(sink)
}
