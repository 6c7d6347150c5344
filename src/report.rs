use crate::types::{CalculationResult, Category, EnhancedEstimate, LineItemRow, QuoteSummary};
use crate::util::{format_amount, round_whole};
use strum::IntoEnumIterator;

fn row(item: &str, amount: String, taxable: &str) -> LineItemRow {
    LineItemRow {
        item: item.to_string(),
        amount,
        taxable: taxable.to_string(),
    }
}

/// One row per category followed by the subtotal, tax, contingency and
/// grand-total rows.
pub fn line_items(result: &CalculationResult, currency: &str) -> Vec<LineItemRow> {
    let b = &result.breakdown;
    let mut rows: Vec<LineItemRow> = Category::iter()
        .map(|c| {
            let taxable = if result.taxable_flags.is_taxable(c) {
                "Yes"
            } else {
                "No"
            };
            row(&c.to_string(), format_amount(b.amount(c), 2, currency), taxable)
        })
        .collect();
    rows.push(row("Subtotal", format_amount(b.subtotal, 2, currency), ""));
    rows.push(row("GST", format_amount(b.tax_total, 2, currency), ""));
    rows.push(row(
        "Contingency",
        format_amount(b.contingency_total, 2, currency),
        "",
    ));
    rows.push(row(
        "Grand total",
        format_amount(result.totals.grand_total, 2, currency),
        "",
    ));
    rows
}

/// `line_items` plus the multiplier stage and the rounded quote total.
pub fn estimate_line_items(estimate: &EnhancedEstimate) -> Vec<LineItemRow> {
    let currency = &estimate.breakdown.currency;
    let mut rows = line_items(&estimate.result, currency);
    rows.push(row(
        "Seasonal multiplier",
        format!("x{:.2}", estimate.seasonal_multiplier),
        "",
    ));
    rows.push(row(
        "Team size multiplier",
        format!("x{:.2}", estimate.team_multiplier),
        "",
    ));
    rows.push(row(
        "Estimated total",
        format_amount(estimate.breakdown.total as f64, 0, currency),
        "",
    ));
    rows
}

pub fn quote_summary(estimate: &EnhancedEstimate) -> QuoteSummary {
    let r = &estimate.result;
    QuoteSummary {
        currency: estimate.breakdown.currency.clone(),
        area_sqm: r.area.sqm,
        area_sqft: r.area.sqft,
        subtotal: r.breakdown.subtotal,
        tax_total: r.breakdown.tax_total,
        contingency_total: r.breakdown.contingency_total,
        grand_total: r.totals.grand_total,
        seasonal_multiplier: estimate.seasonal_multiplier,
        team_multiplier: estimate.team_multiplier,
        adjusted_total: round_whole(estimate.adjusted_total),
        cost_per_sqm: r.totals.cost_per_sqm,
        cost_per_sqft: r.totals.cost_per_sqft,
        breakdown: estimate.breakdown.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{calculate, estimate};
    use crate::types::{CalculationInput, CalculatorInput};

    #[test]
    fn rows_mark_travel_untaxed() {
        let mut input = CalculationInput::with_area(18.0, "sqm");
        input.travel.team_count = Some(1.0);
        input.travel.airfare_per_person = Some(4500.0);
        let result = calculate(&input).unwrap();
        let rows = line_items(&result, "INR");
        assert_eq!(rows.len(), 11);
        let travel = rows.iter().find(|r| r.item == "Travel").unwrap();
        assert_eq!(travel.amount, "4,500.00");
        assert_eq!(travel.taxable, "No");
        assert_eq!(rows[0].item, "Booth space");
        assert_eq!(rows[0].taxable, "Yes");
        assert_eq!(rows.last().unwrap().item, "Grand total");
    }

    #[test]
    fn summary_matches_breakdown() {
        let e = estimate(&CalculatorInput::default(), None).unwrap();
        let s = quote_summary(&e);
        assert_eq!(s.adjusted_total, e.breakdown.total);
        assert_eq!(s.currency, "INR");
        assert_eq!(estimate_line_items(&e).len(), 14);
    }
}
