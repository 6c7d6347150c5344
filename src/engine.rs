//! Public entry points.
//!
//! [`calculate`] is the primitive: a fully expanded [`CalculationInput`] in,
//! an itemized [`CalculationResult`] out. [`compute_exhibition_cost`] wraps it
//! for raw wizard state: normalize, resolve rates, calculate, then apply the
//! seasonal and team multipliers to the grand total.
use crate::adjust::{
    apply_multipliers, apply_tax_and_contingency, seasonal_multiplier, team_multiplier,
};
use crate::categories::category_totals;
use crate::error::EstimateError;
use crate::normalize::{normalize_area, normalize_form};
use crate::rates::{RateResolver, RateTables, ResolvedRates, TaxPolicy, DEFAULT_RATES};
use crate::types::{
    AddOn, AddOnBasis, AreaInput, CalculationInput, CalculationResult, CalculatorInput,
    ConstructionInput, ContingencyInput, CostBreakdown, EnhancedEstimate, LogisticsInput,
    MarketingInput, NormalizedForm, SpaceInput, StaffOpsInput, TaxInput, Totals, TravelInput,
    UtilitiesInput,
};
use crate::util::{round2, round_whole};
use tracing::debug;

/// Run the category, tax and contingency stages over an expanded input.
///
/// Fails only when the area is not a positive number in a known unit.
pub fn calculate(input: &CalculationInput) -> Result<CalculationResult, EstimateError> {
    let area = normalize_area(&input.area)?;
    let mut breakdown = category_totals(input, &area);
    let grand_total = apply_tax_and_contingency(&mut breakdown, &input.tax, &input.contingency);
    Ok(CalculationResult {
        area,
        breakdown,
        totals: Totals {
            grand_total,
            cost_per_sqm: round2(grand_total / area.sqm),
            cost_per_sqft: round2(grand_total / area.sqft),
        },
        taxable_flags: input.tax.taxable_flags,
    })
}

/// Expand a normalized form and its resolved rates into calculator input.
pub fn build_calculation_input(
    form: &NormalizedForm,
    rates: &ResolvedRates,
    policy: &TaxPolicy,
) -> CalculationInput {
    let unit = &rates.unit;
    let area = form.area_sqm;
    let toggles = form.add_ons;

    let add_on = |label: &str, rate: f64, basis: AddOnBasis| AddOn {
        label: label.to_string(),
        rate,
        basis,
    };
    let add_ons = [
        (toggles.av_equipment, add_on("av_equipment", unit.av_per_day, AddOnBasis::PerDay)),
        (toggles.lighting, add_on("lighting", unit.lighting_per_sqm, AddOnBasis::PerUnitArea)),
        (toggles.storage, add_on("storage", unit.storage_per_day, AddOnBasis::PerDay)),
        (toggles.security, add_on("security", unit.security_per_day, AddOnBasis::PerDay)),
    ]
    .into_iter()
    .filter_map(|(on, a)| on.then_some(a))
    .collect();

    CalculationInput {
        area: AreaInput {
            value: area,
            unit: "sqm".to_string(),
        },
        space: SpaceInput {
            flat: None,
            rate_per_unit_area: Some(rates.space_per_sqm),
            location_premium_pct: Some(rates.venue_premium_pct),
        },
        construction: ConstructionInput {
            flat: None,
            rate_per_unit_area: Some(rates.construction_per_sqm),
            finish_factor: Some(rates.finish_factor),
        },
        utilities: UtilitiesInput {
            power_kw: Some(area * unit.power_kw_per_sqm),
            power_rate: Some(unit.power_rate_per_kw),
            internet: toggles
                .internet
                .then_some(unit.internet_per_day * form.stay_days),
            furniture: toggles.furniture.then_some(unit.furniture_per_sqm * area),
            add_ons,
            days: Some(form.stay_days),
        },
        logistics: LogisticsInput {
            flat: None,
            weight_kg: Some(area * unit.material_kg_per_sqm),
            rate_per_kg: Some(unit.freight_per_kg),
            volume_cbm: None,
            rate_per_cbm: Some(unit.freight_per_cbm),
            route_km: Some(rates.route_km),
            rate_per_km: Some(unit.freight_per_km),
        },
        travel: TravelInput {
            team_count: Some(form.team_size),
            nights: Some(form.stay_days),
            airfare_per_person: Some(rates.airfare_per_person),
            hotel_nightly_rate: Some(rates.hotel_nightly_rate),
            local_transport_per_day: Some(unit.local_transport_per_day),
            meals_per_person_per_day: Some(unit.meals_per_person_per_day),
        },
        staff_ops: StaffOpsInput {
            promoter_days: Some(form.event_days),
            promoter_rate: Some(unit.promoter_per_day),
            uniforms_per_person: Some(unit.uniform_per_person),
            team_count: Some(form.team_size),
            ops_misc_flat: Some(unit.ops_misc_flat),
        },
        marketing: MarketingInput {
            print: Some(unit.print),
            giveaways: Some(unit.giveaways),
            digital: Some(unit.digital),
            av_production: Some(unit.av_production),
            av_enabled: toggles.av_equipment,
            other_rate: Some(unit.marketing_other_per_sqm),
        },
        tax: TaxInput {
            rate_pct: Some(policy.gst_pct),
            taxable_flags: policy.taxable_flags,
        },
        contingency: ContingencyInput {
            rate_pct: Some(policy.contingency_pct),
            base: policy.contingency_base,
        },
    }
}

/// Whole-unit amounts under the keys the wizard and quote template expect.
pub fn assemble_breakdown(
    result: &CalculationResult,
    adjusted_total: f64,
    currency: &str,
) -> CostBreakdown {
    let b = &result.breakdown;
    CostBreakdown {
        booth_cost: round_whole(b.space),
        construction_cost: round_whole(b.construction),
        travel_cost: round_whole(b.travel),
        staff_cost: round_whole(b.staff_ops),
        marketing_cost: round_whole(b.marketing),
        logistics_cost: round_whole(b.logistics),
        services_cost: round_whole(b.utilities),
        total: round_whole(adjusted_total),
        currency: currency.to_string(),
    }
}

/// Full estimate against an explicit rate card.
pub fn estimate_with(
    tables: &RateTables,
    input: &CalculatorInput,
    market_override_state: Option<&str>,
) -> Result<EnhancedEstimate, EstimateError> {
    let form = normalize_form(input, market_override_state)?;
    let rates = RateResolver::new(tables).resolve(&form);
    let expanded = build_calculation_input(&form, &rates, &tables.policy);
    let result = calculate(&expanded)?;

    let seasonal = seasonal_multiplier(form.event_start);
    let team = team_multiplier(form.team_size);
    let adjusted_total = apply_multipliers(result.totals.grand_total, seasonal, team);
    debug!(
        grand_total = result.totals.grand_total,
        seasonal, team, adjusted_total, "applied multipliers"
    );

    let breakdown = assemble_breakdown(&result, adjusted_total, &form.currency);
    Ok(EnhancedEstimate {
        result,
        seasonal_multiplier: seasonal,
        team_multiplier: team,
        adjusted_total,
        breakdown,
    })
}

/// Full estimate against the built-in rate card.
pub fn estimate(
    input: &CalculatorInput,
    market_override_state: Option<&str>,
) -> Result<EnhancedEstimate, EstimateError> {
    estimate_with(&DEFAULT_RATES, input, market_override_state)
}

pub fn compute_exhibition_cost_with(
    tables: &RateTables,
    input: &CalculatorInput,
    market_override_state: Option<&str>,
) -> Result<CostBreakdown, EstimateError> {
    estimate_with(tables, input, market_override_state).map(|e| e.breakdown)
}

/// Cost breakdown for raw wizard state using the built-in rate card.
pub fn compute_exhibition_cost(
    input: &CalculatorInput,
    market_override_state: Option<&str>,
) -> Result<CostBreakdown, EstimateError> {
    compute_exhibition_cost_with(&DEFAULT_RATES, input, market_override_state)
}
