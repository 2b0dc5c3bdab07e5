use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, Month, NaiveDate};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Column schema
// ---------------------------------------------------------------------------

pub const ORDER_DATE: &str = "Order Date";
pub const REGION: &str = "Region";
pub const STATE: &str = "State";
pub const CITY: &str = "City";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const SALES: &str = "Sales";
pub const PROFIT: &str = "Profit";
pub const QUANTITY: &str = "Quantity";

/// Columns every input table must carry. Any other column is kept verbatim.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    ORDER_DATE,
    REGION,
    STATE,
    CITY,
    CATEGORY,
    SUB_CATEGORY,
    SALES,
    PROFIT,
    QUANTITY,
];

// ---------------------------------------------------------------------------
// Geography – the three multi-select filter dimensions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Geography {
    Region,
    State,
    City,
}

impl Geography {
    /// Evaluation order used by the filter engine.
    pub const ALL: [Geography; 3] = [Geography::Region, Geography::State, Geography::City];

    pub fn column_name(self) -> &'static str {
        match self {
            Geography::Region => REGION,
            Geography::State => STATE,
            Geography::City => CITY,
        }
    }

    pub fn value_of(self, record: &SalesRecord) -> &str {
        match self {
            Geography::Region => &record.region,
            Geography::State => &record.state,
            Geography::City => &record.city,
        }
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// YearMonth – grouping key of the monthly time series
// ---------------------------------------------------------------------------

/// A calendar month of a specific year. Orders chronologically and renders
/// as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based month number.
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

// JSON object keys must be strings, so serialise through `Display`.
impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// English name of a 1-based month number (`1` → `"January"`).
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

// ---------------------------------------------------------------------------
// SalesRecord – one order line
// ---------------------------------------------------------------------------

/// A single sales transaction line (one row of the source table).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesRecord {
    pub order_date: NaiveDate,
    pub region: String,
    pub state: String,
    pub city: String,
    pub category: String,
    pub sub_category: String,
    pub sales: Decimal,
    pub profit: Decimal,
    pub quantity: i64,
    /// Every cell of the row as read, in table column order. Export writes
    /// these back untouched.
    #[serde(skip)]
    pub raw: Vec<String>,
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed geography indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesTable {
    /// Column names in input order, required and extra columns alike.
    pub headers: Vec<String>,
    /// All records (rows).
    pub records: Vec<SalesRecord>,
    /// Distinct values present for each geography column.
    pub unique_values: BTreeMap<Geography, BTreeSet<String>>,
}

impl SalesTable {
    /// Build geography indices from the loaded records.
    pub fn from_records(headers: Vec<String>, records: Vec<SalesRecord>) -> Self {
        let mut unique_values: BTreeMap<Geography, BTreeSet<String>> = Geography::ALL
            .iter()
            .map(|geo| (*geo, BTreeSet::new()))
            .collect();

        for rec in &records {
            for geo in Geography::ALL {
                unique_values
                    .entry(geo)
                    .or_default()
                    .insert(geo.value_of(rec).to_string());
            }
        }

        SalesTable {
            headers,
            records,
            unique_values,
        }
    }

    /// Earliest and latest order date, `None` for an empty table.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.order_date).min()?;
        let max = self.records.iter().map(|r| r.order_date).max()?;
        Some((min, max))
    }

    /// Sorted, de-duplicated month numbers that occur anywhere in the table.
    pub fn months_present(&self) -> Vec<u32> {
        self.records
            .iter()
            .map(|r| r.order_date.month())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::str::FromStr;

    use super::*;

    /// Build a record whose raw cells follow [`REQUIRED_COLUMNS`].
    pub fn record(
        date: &str,
        region: &str,
        state: &str,
        city: &str,
        category: &str,
        sub_category: &str,
        sales: &str,
    ) -> SalesRecord {
        let raw: Vec<String> = [date, region, state, city, category, sub_category, sales, "0", "1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        SalesRecord {
            order_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            region: region.into(),
            state: state.into(),
            city: city.into(),
            category: category.into(),
            sub_category: sub_category.into(),
            sales: Decimal::from_str(sales).unwrap(),
            profit: Decimal::ZERO,
            quantity: 1,
            raw,
        }
    }

    pub fn table_of(records: Vec<SalesRecord>) -> SalesTable {
        let headers = REQUIRED_COLUMNS.iter().map(|s| s.to_string()).collect();
        SalesTable::from_records(headers, records)
    }

    /// Two-row table: a January Gujarat sale and a February Kerala sale.
    pub fn two_states() -> SalesTable {
        table_of(vec![
            record("2023-01-05", "West", "Gujarat", "Ahmedabad", "Furniture", "Chairs", "100"),
            record("2023-02-10", "South", "Kerala", "Kochi", "Furniture", "Tables", "50"),
        ])
    }
}
