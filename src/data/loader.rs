use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{SalesRecord, SalesTable, ORDER_DATE, PROFIT, QUANTITY, REQUIRED_COLUMNS, SALES};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Load options
// ---------------------------------------------------------------------------

/// Largest accepted magnitude of a Sales or Profit cell. Sums of up to
/// 10^13 such values stay inside `Decimal`'s range.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Date layouts tried in order when no configuration overrides them.
pub const DEFAULT_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%d/%m/%Y"];

/// Text encoding of delimited input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Encoding {
    /// UTF-8 per cell, falling back to ISO-8859-1 for cells that are not.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin1", alias = "iso-8859-1")]
    Latin1,
}

/// What to do with a row whose date or number cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Fail the whole load.
    #[default]
    Reject,
    /// Drop the row, log it and list it in [`LoadReport::skipped`].
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub encoding: Encoding,
    /// chrono format strings for the `Order Date` column.
    pub date_formats: Vec<String>,
    pub policy: ParsePolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: Encoding::default(),
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            policy: ParsePolicy::default(),
        }
    }
}

/// A loaded table plus the rows dropped under [`ParsePolicy::Skip`].
#[derive(Debug)]
pub struct LoadReport {
    pub table: SalesTable,
    pub skipped: Vec<LoadError>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text using [`LoadOptions::delimiter`]
/// * `.tsv`          – tab-separated text
/// * `.json`         – `[{ "Order Date": "...", "Region": "...", ... }, ...]`
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<LoadReport, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let report = match ext.as_str() {
        "csv" | "txt" => load_delimited(File::open(path)?, options)?,
        "tsv" => {
            let tab = LoadOptions {
                delimiter: b'\t',
                ..options.clone()
            };
            load_delimited(File::open(path)?, &tab)?
        }
        "json" => load_json(File::open(path)?, options)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    debug!(
        "loaded {} records ({} skipped) from {}",
        report.table.len(),
        report.skipped.len(),
        path.display()
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, one order line per following row.
/// Cells and header names are kept exactly as read; surrounding whitespace
/// is ignored only when matching column names and parsing typed fields.
pub fn load_delimited<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadReport, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| decode(h, options.encoding, 1))
        .collect::<Result<_, _>>()?;

    let mut normalizer = Normalizer::new(ColumnIndex::resolve(&headers)?, options);

    let mut record = csv::ByteRecord::new();
    while reader.read_byte_record(&mut record)? {
        let line = record.position().map(|p| p.line() as usize).unwrap_or_default();
        let cells = record
            .iter()
            .map(|cell| decode(cell, options.encoding, line))
            .collect::<Result<Vec<_>, _>>();
        normalizer.push_row(line, cells)?;
    }

    Ok(normalizer.finish(headers))
}

fn decode(bytes: &[u8], encoding: Encoding, line: usize) -> Result<String, LoadError> {
    match encoding {
        Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| LoadError::Encoding { line }),
        Encoding::Latin1 => Ok(latin1(bytes)),
        Encoding::Auto => Ok(String::from_utf8(bytes.to_vec()).unwrap_or_else(|_| latin1(bytes))),
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Order Date": "2023-01-05", "Region": "West", "Sales": 100.0, ... },
///   ...
/// ]
/// ```
///
/// Column order follows the key order of the first record as written.
pub fn load_json<R: Read>(reader: R, options: &LoadOptions) -> Result<LoadReport, LoadError> {
    let root: JsonValue = serde_json::from_reader(reader)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::JsonShape("expected a top-level array of records".into()))?;

    let headers: Vec<String> = match rows.first() {
        Some(JsonValue::Object(first)) => first.keys().cloned().collect(),
        Some(_) => return Err(LoadError::JsonShape("record 1 is not an object".into())),
        None => Vec::new(),
    };

    let mut normalizer = Normalizer::new(ColumnIndex::resolve(&headers)?, options);

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::JsonShape(format!("record {line} is not an object")))?;
        let cells = headers
            .iter()
            .map(|h| obj.get(h).map(json_cell).unwrap_or_default())
            .collect();
        normalizer.push_row(line, Ok(cells))?;
    }

    Ok(normalizer.finish(headers))
}

fn json_cell(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Normalisation: raw cells → SalesRecord
// ---------------------------------------------------------------------------

/// Positions of the required columns within a header row.
struct ColumnIndex {
    order_date: usize,
    region: usize,
    state: usize,
    city: usize,
    category: usize,
    sub_category: usize,
    sales: usize,
    profit: usize,
    quantity: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, LoadError> {
        let positions: Vec<Option<usize>> = REQUIRED_COLUMNS
            .iter()
            .map(|col| headers.iter().position(|h| h.trim() == *col))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, pos)| pos.is_none())
            .map(|(col, _)| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        // Same order as REQUIRED_COLUMNS.
        let p: Vec<usize> = positions.into_iter().flatten().collect();
        Ok(ColumnIndex {
            order_date: p[0],
            region: p[1],
            state: p[2],
            city: p[3],
            category: p[4],
            sub_category: p[5],
            sales: p[6],
            profit: p[7],
            quantity: p[8],
        })
    }
}

struct Normalizer<'o> {
    columns: ColumnIndex,
    options: &'o LoadOptions,
    records: Vec<SalesRecord>,
    skipped: Vec<LoadError>,
}

impl<'o> Normalizer<'o> {
    fn new(columns: ColumnIndex, options: &'o LoadOptions) -> Self {
        Self {
            columns,
            options,
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }

    fn push_row(&mut self, line: usize, cells: Result<Vec<String>, LoadError>) -> Result<(), LoadError> {
        match cells.and_then(|cells| self.parse_record(line, cells)) {
            Ok(record) => self.records.push(record),
            Err(e) if e.is_row_error() && self.options.policy == ParsePolicy::Skip => {
                warn!("skipping row: {e}");
                self.skipped.push(e);
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn parse_record(&self, line: usize, raw: Vec<String>) -> Result<SalesRecord, LoadError> {
        let c = &self.columns;
        let cell = |idx: usize| raw.get(idx).map(String::as_str).unwrap_or("");

        let order_date = parse_date(cell(c.order_date), &self.options.date_formats)
            .ok_or_else(|| parse_error(line, ORDER_DATE, cell(c.order_date), "date"))?;
        let sales = parse_amount(cell(c.sales))
            .ok_or_else(|| parse_error(line, SALES, cell(c.sales), AMOUNT))?;
        let profit = parse_amount(cell(c.profit))
            .ok_or_else(|| parse_error(line, PROFIT, cell(c.profit), AMOUNT))?;
        let quantity = cell(c.quantity)
            .trim()
            .parse::<i64>()
            .map_err(|_| parse_error(line, QUANTITY, cell(c.quantity), "integer"))?;

        let region = cell(c.region).to_string();
        let state = cell(c.state).to_string();
        let city = cell(c.city).to_string();
        let category = cell(c.category).to_string();
        let sub_category = cell(c.sub_category).to_string();

        Ok(SalesRecord {
            order_date,
            region,
            state,
            city,
            category,
            sub_category,
            sales,
            profit,
            quantity,
            raw,
        })
    }

    fn finish(self, headers: Vec<String>) -> LoadReport {
        LoadReport {
            table: SalesTable::from_records(headers, self.records),
            skipped: self.skipped,
        }
    }
}

fn parse_error(line: usize, column: &str, value: &str, expected: &'static str) -> LoadError {
    LoadError::Parse {
        line,
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Try each format in turn; a trailing midnight timestamp
/// (`2023-01-05 00:00:00`) is accepted for every format.
fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(value, f).ok())
        .or_else(|| {
            formats.iter().find_map(|f| {
                NaiveDateTime::parse_from_str(value, &format!("{f} %H:%M:%S"))
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

const AMOUNT: &str = "decimal no larger than 1e15 in magnitude";

fn parse_amount(value: &str) -> Option<Decimal> {
    let value = value.trim();
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
        .filter(|amount| amount.abs() <= Decimal::from(MAX_AMOUNT))
}
