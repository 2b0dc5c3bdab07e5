use std::collections::BTreeSet;

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use super::model::{Geography, SalesRecord, SalesTable};
use crate::error::FilterWarning;

// ---------------------------------------------------------------------------
// Filter criteria: date range + selected values per geography
// ---------------------------------------------------------------------------

/// The active set of user-selected filters.
///
/// An empty selection set means "no restriction" for that geography.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub regions: BTreeSet<String>,
    #[serde(default)]
    pub states: BTreeSet<String>,
    #[serde(default)]
    pub cities: BTreeSet<String>,
}

impl FilterCriteria {
    /// Inclusive date range, no geography restriction.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            regions: BTreeSet::new(),
            states: BTreeSet::new(),
            cities: BTreeSet::new(),
        }
    }

    /// Criteria covering every order date in the table.
    pub fn spanning(table: &SalesTable) -> Option<Self> {
        table
            .date_span()
            .map(|(start, end)| FilterCriteria::new(start, end))
    }

    /// Replace the selection of one geography.
    pub fn with<I, S>(mut self, geo: Geography, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.selection_mut(geo) = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn selection(&self, geo: Geography) -> &BTreeSet<String> {
        match geo {
            Geography::Region => &self.regions,
            Geography::State => &self.states,
            Geography::City => &self.cities,
        }
    }

    pub fn selection_mut(&mut self, geo: Geography) -> &mut BTreeSet<String> {
        match geo {
            Geography::Region => &mut self.regions,
            Geography::State => &mut self.states,
            Geography::City => &mut self.cities,
        }
    }

    pub fn has_valid_range(&self) -> bool {
        self.start_date <= self.end_date
    }
}

// ---------------------------------------------------------------------------
// FilteredDataset – an immutable view over a SalesTable
// ---------------------------------------------------------------------------

/// Rows of a [`SalesTable`] that passed a sequence of filter stages.
///
/// Each stage returns a new value; the table and earlier stages are never
/// touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredDataset<'a> {
    table: &'a SalesTable,
    indices: Vec<usize>,
    invalid_range: bool,
}

impl<'a> FilteredDataset<'a> {
    /// Every row of the table.
    pub fn all(table: &'a SalesTable) -> Self {
        Self {
            table,
            indices: (0..table.len()).collect(),
            invalid_range: false,
        }
    }

    /// Keep rows whose order date lies in `[start, end]`. An inverted range
    /// keeps nothing.
    pub fn within_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        if start > end {
            return Self {
                table: self.table,
                indices: Vec::new(),
                invalid_range: true,
            };
        }
        self.retain(|rec| rec.order_date >= start && rec.order_date <= end)
    }

    /// Keep rows whose geography value is in `selected`. An empty selection
    /// keeps everything.
    pub fn restrict(&self, geo: Geography, selected: &BTreeSet<String>) -> Self {
        if selected.is_empty() {
            return self.clone();
        }
        self.retain(|rec| selected.contains(geo.value_of(rec)))
    }

    fn retain(&self, keep: impl Fn(&SalesRecord) -> bool) -> Self {
        Self {
            table: self.table,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| keep(&self.table.records[i]))
                .collect(),
            invalid_range: self.invalid_range,
        }
    }

    /// The table this view was taken from.
    pub fn table(&self) -> &'a SalesTable {
        self.table
    }

    /// Positions of the surviving rows in the source table, ascending.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a SalesRecord> + '_ {
        let table = self.table;
        self.indices.iter().map(move |&i| &table.records[i])
    }

    /// Copy the surviving rows into a standalone table with the same columns.
    pub fn to_table(&self) -> SalesTable {
        SalesTable::from_records(self.table.headers.clone(), self.records().cloned().collect())
    }

    pub fn warning(&self) -> Option<FilterWarning> {
        if self.invalid_range {
            Some(FilterWarning::InvalidRange)
        } else if self.indices.is_empty() {
            Some(FilterWarning::EmptyResult)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Return the rows of `table` that satisfy all of `criteria`.
///
/// Stages run date → region → state → city; each is a conjunction with the
/// previous ones and a disjunction over its own selected values.
pub fn apply<'a>(table: &'a SalesTable, criteria: &FilterCriteria) -> FilteredDataset<'a> {
    let mut filtered =
        FilteredDataset::all(table).within_dates(criteria.start_date, criteria.end_date);
    for geo in Geography::ALL {
        if filtered.is_empty() {
            break;
        }
        filtered = filtered.restrict(geo, criteria.selection(geo));
    }
    debug!("filter kept {} of {} records", filtered.len(), table.len());
    filtered
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::data::model::fixtures::{record, table_of, two_states};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn three_cities() -> SalesTable {
        table_of(vec![
            record("2023-01-05", "West", "Gujarat", "Ahmedabad", "Furniture", "Chairs", "100"),
            record("2023-01-09", "West", "Gujarat", "Surat", "Technology", "Phones", "20"),
            record("2023-02-10", "South", "Kerala", "Kochi", "Furniture", "Tables", "50"),
        ])
    }

    #[test]
    fn date_range_is_inclusive() {
        let table = two_states();
        let criteria = FilterCriteria::new(date("2023-01-05"), date("2023-02-10"));
        assert_eq!(apply(&table, &criteria).len(), 2);

        let january = FilterCriteria::new(date("2023-01-01"), date("2023-01-31"));
        let filtered = apply(&table, &january);
        assert_eq!(filtered.indices(), &[0]);
        assert_eq!(filtered.warning(), None);
    }

    #[test]
    fn empty_selections_keep_the_date_bounded_rows() {
        let table = three_cities();
        let criteria = FilterCriteria::spanning(&table).unwrap();
        let filtered = apply(&table, &criteria);
        assert_eq!(filtered.to_table(), table);
    }

    #[test]
    fn values_within_a_filter_are_or_and_filters_are_and() {
        let table = three_cities();
        let criteria = FilterCriteria::spanning(&table)
            .unwrap()
            .with(Geography::State, ["Gujarat", "Kerala"])
            .with(Geography::City, ["Surat", "Kochi"]);
        assert_eq!(apply(&table, &criteria).indices(), &[1, 2]);

        let criteria = criteria.with(Geography::Region, ["West"]);
        assert_eq!(apply(&table, &criteria).indices(), &[1]);
    }

    #[test]
    fn unknown_value_yields_empty_result_not_error() {
        let table = two_states();
        let criteria = FilterCriteria::spanning(&table)
            .unwrap()
            .with(Geography::State, ["Punjab"]);
        let filtered = apply(&table, &criteria);
        assert!(filtered.is_empty());
        assert_eq!(filtered.warning(), Some(FilterWarning::EmptyResult));
    }

    #[test]
    fn inverted_range_is_empty_with_warning() {
        let table = two_states();
        let criteria = FilterCriteria::new(date("2023-03-01"), date("2023-01-01"));
        assert!(!criteria.has_valid_range());
        let filtered = apply(&table, &criteria);
        assert!(filtered.is_empty());
        assert_eq!(filtered.warning(), Some(FilterWarning::InvalidRange));
    }

    #[test]
    fn apply_is_idempotent() {
        let table = three_cities();
        let criteria = FilterCriteria::new(date("2023-01-01"), date("2023-01-31"))
            .with(Geography::Region, ["West"]);
        let once = apply(&table, &criteria).to_table();
        let twice = apply(&once, &criteria).to_table();
        assert_eq!(once, twice);
    }

    #[test]
    fn stages_leave_earlier_views_untouched() {
        let table = three_cities();
        let all = FilteredDataset::all(&table);
        let kerala = all.restrict(Geography::State, &BTreeSet::from(["Kerala".to_string()]));
        assert_eq!(all.len(), 3);
        assert_eq!(kerala.len(), 1);
        assert_eq!(kerala.records().next().unwrap().city, "Kochi");
    }

    #[test]
    fn criteria_deserialize_with_missing_selections() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"start_date":"2023-01-01","end_date":"2023-12-31","states":["Goa"]}"#)
                .unwrap();
        assert!(criteria.regions.is_empty());
        assert_eq!(criteria.states.len(), 1);
    }
}
