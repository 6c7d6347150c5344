// Tax, contingency and the grand-total multipliers.
use crate::types::{Breakdown, Category, ContingencyBase, ContingencyInput, TaxInput, TaxableFlags};
use crate::util::{non_negative, round2};
use chrono::{Datelike, NaiveDateTime};
use strum::IntoEnumIterator;
use tracing::debug;

pub const DEFAULT_GST_PCT: f64 = 18.0;
pub const DEFAULT_CONTINGENCY_PCT: f64 = 10.0;

const PEAK_SEASON: f64 = 1.12;
const SHOULDER_SEASON: f64 = 0.94;
const MONSOON_SEASON: f64 = 0.97;

fn percent(rate: Option<f64>, default: f64) -> f64 {
    rate.map(non_negative).unwrap_or(default) / 100.0
}

pub fn taxable_base(breakdown: &Breakdown, flags: &TaxableFlags) -> f64 {
    Category::iter()
        .filter(|c| flags.is_taxable(*c))
        .map(|c| breakdown.amount(c))
        .sum()
}

pub fn tax_total(breakdown: &Breakdown, tax: &TaxInput) -> f64 {
    round2(taxable_base(breakdown, &tax.taxable_flags) * percent(tax.rate_pct, DEFAULT_GST_PCT))
}

pub fn contingency_total(subtotal: f64, tax_total: f64, contingency: &ContingencyInput) -> f64 {
    let base = match contingency.base {
        ContingencyBase::PreTax => subtotal,
        ContingencyBase::PostTax => subtotal + tax_total,
    };
    round2(base * percent(contingency.rate_pct, DEFAULT_CONTINGENCY_PCT))
}

/// Fill in tax and contingency and return the grand total.
pub fn apply_tax_and_contingency(
    breakdown: &mut Breakdown,
    tax: &TaxInput,
    contingency: &ContingencyInput,
) -> f64 {
    breakdown.tax_total = tax_total(breakdown, tax);
    breakdown.contingency_total =
        contingency_total(breakdown.subtotal, breakdown.tax_total, contingency);
    let grand_total =
        round2(breakdown.subtotal + breakdown.tax_total + breakdown.contingency_total);
    debug!(
        subtotal = breakdown.subtotal,
        tax = breakdown.tax_total,
        contingency = breakdown.contingency_total,
        grand_total,
        "applied tax and contingency"
    );
    grand_total
}

/// Oct-Mar is peak exhibition season, Apr-Jun is shoulder, the monsoon
/// months are cheapest. No date means no adjustment.
pub fn seasonal_multiplier(event_start: Option<NaiveDateTime>) -> f64 {
    match event_start.map(|d| d.month()) {
        None => 1.0,
        Some(10..=12) | Some(1..=3) => PEAK_SEASON,
        Some(4..=6) => SHOULDER_SEASON,
        Some(_) => MONSOON_SEASON,
    }
}

pub fn team_multiplier(team_size: f64) -> f64 {
    if team_size >= 10.0 {
        0.92
    } else if team_size >= 6.0 {
        0.95
    } else if team_size >= 4.0 {
        0.98
    } else {
        1.0
    }
}

/// Applied to the tax- and contingency-inclusive grand total.
pub fn apply_multipliers(grand_total: f64, seasonal: f64, team: f64) -> f64 {
    round2(grand_total * seasonal * team)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::parse_datetime_safe;

    fn sample() -> Breakdown {
        Breakdown {
            space: 150_000.0,
            construction: 200_000.0,
            utilities: 40_000.0,
            logistics: 20_000.0,
            travel: 50_000.0,
            staff_ops: 25_000.0,
            marketing: 15_000.0,
            subtotal: 500_000.0,
            ..Default::default()
        }
    }

    #[test]
    fn travel_is_not_taxed_by_default() {
        let tax = TaxInput {
            rate_pct: Some(18.0),
            ..Default::default()
        };
        assert_eq!(taxable_base(&sample(), &tax.taxable_flags), 450_000.0);
        assert_eq!(tax_total(&sample(), &tax), 81_000.0);
        assert_eq!(tax_total(&sample(), &TaxInput::default()), 81_000.0);
    }

    #[test]
    fn no_flags_no_tax() {
        let tax = TaxInput {
            rate_pct: Some(28.0),
            taxable_flags: TaxableFlags::none(),
        };
        assert_eq!(tax_total(&sample(), &tax), 0.0);
    }

    #[test]
    fn contingency_bases() {
        let pre = ContingencyInput::default();
        let post = ContingencyInput {
            base: ContingencyBase::PostTax,
            ..Default::default()
        };
        assert_eq!(contingency_total(500_000.0, 81_000.0, &pre), 50_000.0);
        assert_eq!(contingency_total(500_000.0, 81_000.0, &post), 58_100.0);
        let zero = ContingencyInput {
            rate_pct: Some(-5.0),
            ..Default::default()
        };
        assert_eq!(contingency_total(500_000.0, 81_000.0, &zero), 0.0);
    }

    #[test]
    fn grand_total_includes_everything() {
        let mut b = sample();
        let total = apply_tax_and_contingency(&mut b, &TaxInput::default(), &ContingencyInput::default());
        assert_eq!(b.tax_total, 81_000.0);
        assert_eq!(b.contingency_total, 50_000.0);
        assert_eq!(total, 631_000.0);
    }

    #[test]
    fn seasons() {
        let at = |s: &str| seasonal_multiplier(parse_datetime_safe(Some(s)));
        assert_eq!(at("2025-11-12"), 1.12);
        assert_eq!(at("2026-02-01"), 1.12);
        assert_eq!(at("2026-05-20"), 0.94);
        assert_eq!(at("2026-08-03"), 0.97);
        // tier edges
        assert_eq!(at("2026-03-31"), 1.12);
        assert_eq!(at("2026-04-01"), 0.94);
        assert_eq!(at("2026-06-30"), 0.94);
        assert_eq!(at("2026-07-01"), 0.97);
        assert_eq!(at("2025-10-01"), 1.12);
        assert_eq!(at("2025-12-31"), 1.12);
        assert_eq!(at("2026-09-30"), 0.97);
        assert_eq!(seasonal_multiplier(None), 1.0);
    }

    #[test]
    fn team_tiers() {
        assert_eq!(team_multiplier(0.0), 1.0);
        assert_eq!(team_multiplier(3.0), 1.0);
        assert_eq!(team_multiplier(4.0), 0.98);
        assert_eq!(team_multiplier(5.0), 0.98);
        assert_eq!(team_multiplier(6.0), 0.95);
        assert_eq!(team_multiplier(9.0), 0.95);
        assert_eq!(team_multiplier(10.0), 0.92);
    }

    #[test]
    fn multipliers_compose() {
        assert_eq!(apply_multipliers(1_000_000.0, 1.12, 0.95), 1_064_000.0);
        assert_eq!(apply_multipliers(1_000_000.0, 1.0, 1.0), 1_000_000.0);
    }
}
