use chrono::NaiveDate;
use log::debug;

use crate::data::aggregate::DashboardViews;
use crate::data::filter::{apply, FilterCriteria, FilteredDataset};
use crate::data::model::{Geography, SalesTable};
use crate::error::FilterWarning;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One user's dashboard state, independent of rendering.
///
/// Every criteria change recomputes the filtered rows and all views before
/// returning. Sessions share nothing mutable; give each its own table clone.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded dataset.
    table: SalesTable,

    /// Active filter selections.
    criteria: FilterCriteria,

    /// Views of the rows passing `criteria` (recomputed on change).
    views: DashboardViews,

    warning: Option<FilterWarning>,
}

impl Session {
    /// Start with the full date span selected and no geography restriction.
    pub fn new(table: SalesTable) -> Self {
        let criteria = FilterCriteria::spanning(&table)
            .unwrap_or_else(|| FilterCriteria::new(NaiveDate::MIN, NaiveDate::MAX));
        Self::with_criteria(table, criteria)
    }

    pub fn with_criteria(table: SalesTable, criteria: FilterCriteria) -> Self {
        let mut session = Self {
            table,
            criteria,
            views: DashboardViews::default(),
            warning: None,
        };
        session.refilter();
        session
    }

    pub fn table(&self) -> &SalesTable {
        &self.table
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn views(&self) -> &DashboardViews {
        &self.views
    }

    /// Set when the current criteria select nothing.
    pub fn warning(&self) -> Option<FilterWarning> {
        self.warning
    }

    /// Rows passing the current criteria.
    pub fn filtered(&self) -> FilteredDataset<'_> {
        apply(&self.table, &self.criteria)
    }

    /// Recompute the views after a criteria change.
    fn refilter(&mut self) {
        let filtered = apply(&self.table, &self.criteria);
        let views = DashboardViews::compute(&filtered);
        let warning = filtered.warning();
        debug!(
            "session refiltered: {} of {} records visible",
            filtered.len(),
            self.table.len()
        );
        self.views = views;
        self.warning = warning;
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.criteria.start_date = start;
        self.criteria.end_date = end;
        self.refilter();
    }

    /// Toggle a single value in a geography's selection.
    pub fn toggle(&mut self, geo: Geography, value: &str) {
        let selected = self.criteria.selection_mut(geo);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select every value of a geography present in the table.
    pub fn select_all(&mut self, geo: Geography) {
        let all = self.table.unique_values.get(&geo).cloned().unwrap_or_default();
        *self.criteria.selection_mut(geo) = all;
        self.refilter();
    }

    /// Clear a geography's selection, which lifts its restriction.
    pub fn clear(&mut self, geo: Geography) {
        self.criteria.selection_mut(geo).clear();
        self.refilter();
    }
}
