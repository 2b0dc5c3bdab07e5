use std::fmt::{self, Write};

use rust_decimal::{Decimal, RoundingStrategy};

use crate::data::aggregate::{DashboardViews, HierarchicalSales};
use crate::error::FilterWarning;

/// Format an amount as `$1,234.56` (`-$12.00` for negatives).
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

/// Share of `part` in `total` as a one-decimal percentage. `None` when the
/// total is zero or the share does not fit a `Decimal`.
fn percent(part: Decimal, total: Decimal) -> Option<Decimal> {
    part.checked_div(total)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|share| share.round_dp(1))
}

/// Plain-text dashboard: one section per view.
pub fn write_report<W: Write>(
    out: &mut W,
    views: &DashboardViews,
    visible: usize,
    total: usize,
    warning: Option<FilterWarning>,
) -> fmt::Result {
    writeln!(out, "Showing {visible} of {total} records")?;
    if let Some(warning) = warning {
        writeln!(out, "Nothing to show: {warning}")?;
        return Ok(());
    }

    writeln!(out, "\n== Category-wise Sales ==")?;
    for (category, sales) in &views.category_sales {
        writeln!(out, "{category:<24} {:>16}", format_currency(*sales))?;
    }

    writeln!(out, "\n== State-wise Sales ==")?;
    let grand_total = views.hierarchy.total;
    for (state, sales) in &views.state_sales {
        let share = percent(*sales, grand_total)
            .map(|p| format!("{p}%"))
            .unwrap_or_default();
        writeln!(out, "{state:<24} {:>16} {share:>8}", format_currency(*sales))?;
    }

    writeln!(out, "\n== Time Series Analysis of Sales ==")?;
    for (month, sales) in &views.monthly_sales {
        writeln!(out, "{month}  {:>16}", format_currency(*sales))?;
    }

    writeln!(out, "\n== Hierarchical View of Sales ==")?;
    write_hierarchy(out, &views.hierarchy)?;

    writeln!(out, "\n== Relationship between Sales and Profits ==")?;
    let profit: Decimal = views.sales_vs_profit.iter().map(|p| p.profit).sum();
    let losses = views
        .sales_vs_profit
        .iter()
        .filter(|p| p.profit.is_sign_negative() && !p.profit.is_zero())
        .count();
    writeln!(
        out,
        "{} points, total profit {}, {losses} loss-making lines",
        views.sales_vs_profit.len(),
        format_currency(profit)
    )?;

    writeln!(out, "\n== Sub-Category Sales by Month ==")?;
    let pivot = &views.sub_category_by_month;
    write!(out, "{:<20}", "Sub-Category")?;
    for column in &pivot.columns {
        write!(out, " {:>12}", column)?;
    }
    writeln!(out)?;
    for (sub_category, cells) in &pivot.rows {
        write!(out, "{sub_category:<20}")?;
        for cell in cells {
            let text = cell.map(format_currency).unwrap_or_default();
            write!(out, " {text:>12}")?;
        }
        writeln!(out)?;
    }

    Ok(())
}

fn write_hierarchy<W: Write>(out: &mut W, tree: &HierarchicalSales) -> fmt::Result {
    for (state, node) in &tree.states {
        writeln!(out, "{state} {}", format_currency(node.total))?;
        for (category, cat) in &node.categories {
            writeln!(out, "  {category} {}", format_currency(cat.total))?;
            for (sub_category, sales) in &cat.sub_categories {
                writeln!(out, "    {sub_category} {}", format_currency(*sales))?;
            }
        }
    }
    Ok(())
}
