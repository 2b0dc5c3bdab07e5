//! Derived views over a [`FilteredDataset`].
//!
//! Sums are exact [`Decimal`] arithmetic; rounding happens only when a view
//! is rendered.

use std::collections::BTreeMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;

use super::filter::FilteredDataset;
use super::model::{month_name, YearMonth};

pub type CategorySales = BTreeMap<String, Decimal>;
pub type StateSales = BTreeMap<String, Decimal>;
pub type MonthlySales = BTreeMap<YearMonth, Decimal>;

/// Total sales of every category present.
pub fn category_sales(data: &FilteredDataset) -> CategorySales {
    let mut out = CategorySales::new();
    for rec in data.records() {
        *out.entry(rec.category.clone()).or_default() += rec.sales;
    }
    out
}

/// Total sales of every state present (pie-slice weights).
pub fn state_sales(data: &FilteredDataset) -> StateSales {
    let mut out = StateSales::new();
    for rec in data.records() {
        *out.entry(rec.state.clone()).or_default() += rec.sales;
    }
    out
}

/// Total sales per calendar month, in chronological order.
pub fn monthly_sales(data: &FilteredDataset) -> MonthlySales {
    let mut out = MonthlySales::new();
    for rec in data.records() {
        *out.entry(YearMonth::of(rec.order_date)).or_default() += rec.sales;
    }
    out
}

pub fn total_sales(data: &FilteredDataset) -> Decimal {
    data.records().map(|rec| rec.sales).sum()
}

// ---------------------------------------------------------------------------
// State → Category → Sub-Category tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HierarchicalSales {
    pub total: Decimal,
    pub states: BTreeMap<String, StateNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateNode {
    pub total: Decimal,
    pub categories: BTreeMap<String, CategoryNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub total: Decimal,
    pub sub_categories: BTreeMap<String, Decimal>,
}

impl HierarchicalSales {
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

pub fn hierarchical_sales(data: &FilteredDataset) -> HierarchicalSales {
    let mut tree = HierarchicalSales::default();
    for rec in data.records() {
        tree.total += rec.sales;

        let state = tree.states.entry(rec.state.clone()).or_default();
        state.total += rec.sales;

        let category = state.categories.entry(rec.category.clone()).or_default();
        category.total += rec.sales;

        *category
            .sub_categories
            .entry(rec.sub_category.clone())
            .or_default() += rec.sales;
    }
    tree
}

// ---------------------------------------------------------------------------
// Sales vs. profit scatter
// ---------------------------------------------------------------------------

/// One scatter point per record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesProfitPoint {
    pub sales: Decimal,
    pub profit: Decimal,
    /// Marker size.
    pub quantity: i64,
    /// Colour group.
    pub category: String,
    /// Hover label.
    pub sub_category: String,
}

pub fn sales_profit_points(data: &FilteredDataset) -> Vec<SalesProfitPoint> {
    data.records()
        .map(|rec| SalesProfitPoint {
            sales: rec.sales,
            profit: rec.profit,
            quantity: rec.quantity,
            category: rec.category.clone(),
            sub_category: rec.sub_category.clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sub-Category × Month pivot
// ---------------------------------------------------------------------------

/// Sales summed per (sub-category, month name) across all years.
///
/// A cell is `None` when no record falls in that pair, so a blank cell stays
/// distinguishable from a true zero sum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubCategoryMonthlyPivot {
    /// Month names in calendar order.
    pub columns: Vec<String>,
    /// Sub-category → one cell per entry of `columns`.
    pub rows: BTreeMap<String, Vec<Option<Decimal>>>,
}

impl SubCategoryMonthlyPivot {
    pub fn cell(&self, sub_category: &str, month: &str) -> Option<Decimal> {
        let col = self.columns.iter().position(|c| c == month)?;
        self.rows.get(sub_category)?.get(col).copied().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Build the pivot with one column per entry of `months` (1-based month
/// numbers, usually [`SalesTable::months_present`] of the unfiltered table).
///
/// [`SalesTable::months_present`]: super::model::SalesTable::months_present
pub fn sub_category_monthly_pivot(data: &FilteredDataset, months: &[u32]) -> SubCategoryMonthlyPivot {
    let mut rows: BTreeMap<String, Vec<Option<Decimal>>> = BTreeMap::new();
    for rec in data.records() {
        let Some(col) = months.iter().position(|&m| m == rec.order_date.month()) else {
            continue;
        };
        let row = rows
            .entry(rec.sub_category.clone())
            .or_insert_with(|| vec![None; months.len()]);
        *row[col].get_or_insert(Decimal::ZERO) += rec.sales;
    }

    SubCategoryMonthlyPivot {
        columns: months.iter().map(|&m| month_name(m).to_string()).collect(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// All views together
// ---------------------------------------------------------------------------

/// The six views fed to the chart and table renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardViews {
    pub category_sales: CategorySales,
    pub state_sales: StateSales,
    pub monthly_sales: MonthlySales,
    pub hierarchy: HierarchicalSales,
    pub sales_vs_profit: Vec<SalesProfitPoint>,
    pub sub_category_by_month: SubCategoryMonthlyPivot,
}

impl DashboardViews {
    /// Compute every view; pivot columns come from the unfiltered table.
    pub fn compute(data: &FilteredDataset) -> Self {
        let months = data.table().months_present();
        Self {
            category_sales: category_sales(data),
            state_sales: state_sales(data),
            monthly_sales: monthly_sales(data),
            hierarchy: hierarchical_sales(data),
            sales_vs_profit: sales_profit_points(data),
            sub_category_by_month: sub_category_monthly_pivot(data, &months),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category_sales.is_empty()
            && self.state_sales.is_empty()
            && self.monthly_sales.is_empty()
            && self.hierarchy.is_empty()
            && self.sales_vs_profit.is_empty()
            && self.sub_category_by_month.is_empty()
    }
}
