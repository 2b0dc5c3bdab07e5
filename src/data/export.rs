use std::io::Write;

use log::debug;

use super::aggregate::DashboardViews;
use super::filter::FilteredDataset;
use super::model::{SalesRecord, SalesTable};
use crate::error::ExportError;

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write a header row and one row per record, cells exactly as loaded.
///
/// Output is comma-separated UTF-8; cells containing commas, quotes or
/// newlines are quoted.
pub fn write_csv<'r, W, I>(writer: W, headers: &[String], records: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'r SalesRecord>,
{
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(headers)?;

    let mut rows = 0;
    for rec in records {
        out.write_record(&rec.raw)?;
        rows += 1;
    }
    out.flush()?;

    debug!("exported {rows} rows");
    Ok(rows)
}

/// Export the rows surviving a filter.
pub fn export_filtered<W: Write>(writer: W, data: &FilteredDataset) -> Result<usize, ExportError> {
    write_csv(writer, &data.table().headers, data.records())
}

/// Export the whole loaded table.
pub fn export_table<W: Write>(writer: W, table: &SalesTable) -> Result<usize, ExportError> {
    write_csv(writer, &table.headers, &table.records)
}

/// The filtered rows as a CSV download payload.
pub fn filtered_csv_string(data: &FilteredDataset) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    export_filtered(&mut buf, data)?;
    Ok(String::from_utf8(buf)?)
}

// ---------------------------------------------------------------------------
// JSON export of the derived views
// ---------------------------------------------------------------------------

pub fn write_views_json<W: Write>(writer: W, views: &DashboardViews) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(writer, views)?;
    Ok(())
}
