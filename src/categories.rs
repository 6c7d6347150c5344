//! The seven category calculators.
//!
//! Each is a pure function of already-normalized inputs. Missing leaves count
//! as zero, and every amount is rounded to two decimals on the way out.
use crate::types::{
    AddOnBasis, Breakdown, CalculationInput, ConstructionInput, LogisticsInput, MarketingInput,
    NormalizedArea, SpaceInput, StaffOpsInput, TravelInput, UtilitiesInput,
};
use crate::util::{leaf, non_negative, round2, saturating};

/// One promoter is staffed per this much floor space.
pub const SQM_PER_PROMOTER: f64 = 18.0;
/// Booths above this size get a digital campaign.
pub const DIGITAL_MARKETING_MIN_SQM: f64 = 50.0;

/// A positive flat override wins; otherwise the computed amount is used.
pub fn resolve_amount(flat: Option<f64>, computed: f64) -> f64 {
    let flat = leaf(flat);
    if flat > 0.0 {
        round2(flat)
    } else {
        round2(saturating(computed))
    }
}

pub fn space_cost(space: &SpaceInput, area_sqm: f64) -> f64 {
    let premium = 1.0 + leaf(space.location_premium_pct) / 100.0;
    resolve_amount(space.flat, leaf(space.rate_per_unit_area) * area_sqm * premium)
}

pub fn construction_cost(construction: &ConstructionInput, area_sqm: f64) -> f64 {
    let finish = construction
        .finish_factor
        .filter(|f| f.is_finite() && *f > 0.0)
        .unwrap_or(1.0);
    resolve_amount(
        construction.flat,
        leaf(construction.rate_per_unit_area) * area_sqm * finish,
    )
}

pub fn utilities_cost(utilities: &UtilitiesInput, area_sqm: f64) -> f64 {
    let days = leaf(utilities.days);
    let add_ons: f64 = utilities
        .add_ons
        .iter()
        .map(|a| {
            let rate = non_negative(a.rate);
            match a.basis {
                AddOnBasis::PerUnitArea => rate * area_sqm,
                AddOnBasis::PerDay => rate * days,
                AddOnBasis::Flat => rate,
            }
        })
        .sum();
    round2(
        leaf(utilities.power_kw) * leaf(utilities.power_rate)
            + leaf(utilities.internet)
            + leaf(utilities.furniture)
            + add_ons,
    )
}

pub fn logistics_cost(logistics: &LogisticsInput) -> f64 {
    let computed = leaf(logistics.weight_kg) * leaf(logistics.rate_per_kg)
        + leaf(logistics.volume_cbm) * leaf(logistics.rate_per_cbm)
        + leaf(logistics.route_km) * leaf(logistics.rate_per_km);
    resolve_amount(logistics.flat, computed)
}

pub fn travel_cost(travel: &TravelInput) -> f64 {
    let team = leaf(travel.team_count);
    let per_night = leaf(travel.hotel_nightly_rate)
        + leaf(travel.local_transport_per_day)
        + leaf(travel.meals_per_person_per_day);
    round2(team * leaf(travel.airfare_per_person) + team * leaf(travel.nights) * per_night)
}

pub fn promoter_count(area_sqm: f64) -> f64 {
    (area_sqm / SQM_PER_PROMOTER).floor().max(1.0)
}

pub fn staff_ops_cost(staff: &StaffOpsInput, area_sqm: f64) -> f64 {
    let promoters =
        promoter_count(area_sqm) * leaf(staff.promoter_days) * leaf(staff.promoter_rate);
    let uniforms = leaf(staff.uniforms_per_person) * leaf(staff.team_count);
    round2(promoters + uniforms + leaf(staff.ops_misc_flat))
}

pub fn marketing_cost(marketing: &MarketingInput, area_sqm: f64) -> f64 {
    let digital = if area_sqm > DIGITAL_MARKETING_MIN_SQM {
        leaf(marketing.digital)
    } else {
        0.0
    };
    let av = if marketing.av_enabled {
        leaf(marketing.av_production)
    } else {
        0.0
    };
    round2(
        leaf(marketing.print)
            + leaf(marketing.giveaways)
            + digital
            + av
            + leaf(marketing.other_rate) * area_sqm,
    )
}

/// All seven categories plus their subtotal. Tax and contingency are left
/// at zero for the adjustment stage.
pub fn category_totals(input: &CalculationInput, area: &NormalizedArea) -> Breakdown {
    let mut b = Breakdown {
        space: space_cost(&input.space, area.sqm),
        construction: construction_cost(&input.construction, area.sqm),
        utilities: utilities_cost(&input.utilities, area.sqm),
        logistics: logistics_cost(&input.logistics),
        travel: travel_cost(&input.travel),
        staff_ops: staff_ops_cost(&input.staff_ops, area.sqm),
        marketing: marketing_cost(&input.marketing, area.sqm),
        ..Default::default()
    };
    b.subtotal = round2(
        b.space + b.construction + b.utilities + b.logistics + b.travel + b.staff_ops + b.marketing,
    );
    b
}
