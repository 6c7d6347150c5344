// Input normalization: the one place raw wizard state is coerced into the
// well-typed, non-negative parameters the rest of the pipeline assumes.
use crate::error::EstimateError;
use crate::rates::{parse_key, DOMESTIC_CURRENCY};
use crate::types::{AddOnToggles, AreaInput, CalculatorInput, FormField, NormalizedArea, NormalizedForm};
use crate::util::{days_between, non_negative, parse_datetime_safe};
use strum::EnumString;
use tracing::debug;

/// A standard 3m x 6m booth.
pub const DEFAULT_AREA_SQM: f64 = 18.0;
pub const DEFAULT_DURATION_DAYS: f64 = 3.0;
pub const SQFT_PER_SQM: f64 = 10.7639;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum AreaUnit {
    #[strum(serialize = "sqm", serialize = "m2", serialize = "square_meters", serialize = "square_metres")]
    SquareMeters,
    #[strum(serialize = "sqft", serialize = "ft2", serialize = "square_feet")]
    SquareFeet,
}

/// Validate the area precondition and express it in both units.
pub fn normalize_area(area: &AreaInput) -> Result<NormalizedArea, EstimateError> {
    let unit: AreaUnit = parse_key(&area.unit)
        .ok_or_else(|| EstimateError::UnknownAreaUnit(area.unit.clone()))?;
    if !area.value.is_finite() || area.value <= 0.0 {
        return Err(EstimateError::InvalidArea { value: area.value });
    }
    Ok(match unit {
        AreaUnit::SquareMeters => NormalizedArea {
            sqm: area.value,
            sqft: area.value * SQFT_PER_SQM,
        },
        AreaUnit::SquareFeet => NormalizedArea {
            sqm: area.value / SQFT_PER_SQM,
            sqft: area.value,
        },
    })
}

fn number(field: &Option<FormField>) -> Option<f64> {
    field.as_ref().and_then(FormField::as_f64)
}

fn coerce(field: &Option<FormField>) -> f64 {
    non_negative(number(field).unwrap_or(0.0))
}

fn flag(field: &Option<FormField>) -> bool {
    field.as_ref().map(FormField::as_flag).unwrap_or(false)
}

fn text(field: &Option<String>) -> String {
    field.as_deref().unwrap_or("").trim().to_string()
}

/// `customSize` if present and nonzero, else `boothSize`, else the default.
/// A negative size is not silently fixed; it fails the area precondition.
pub fn effective_area(input: &CalculatorInput) -> Result<f64, EstimateError> {
    let nonzero = |f: &Option<FormField>| number(f).filter(|v| *v != 0.0);
    let value = nonzero(&input.custom_size)
        .or_else(|| nonzero(&input.booth_size))
        .unwrap_or(DEFAULT_AREA_SQM);
    if !value.is_finite() || value <= 0.0 {
        return Err(EstimateError::InvalidArea { value });
    }
    Ok(value)
}

fn fallback_duration(event_duration: &Option<FormField>) -> f64 {
    let d = coerce(event_duration);
    if d > 0.0 {
        d
    } else {
        DEFAULT_DURATION_DAYS
    }
}

/// Nights on site: whole days between arrival and departure, rounded up.
pub fn stay_duration(
    arrival: Option<&str>,
    departure: Option<&str>,
    event_duration: &Option<FormField>,
) -> f64 {
    match (parse_datetime_safe(arrival), parse_datetime_safe(departure)) {
        (Some(a), Some(d)) if d > a => days_between(a, d).ceil(),
        _ => fallback_duration(event_duration),
    }
}

/// Show days, counting both the first and the last day.
pub fn event_days(start: Option<&str>, end: Option<&str>, event_duration: &Option<FormField>) -> f64 {
    match (parse_datetime_safe(start), parse_datetime_safe(end)) {
        (Some(s), Some(e)) if e >= s => (e.date() - s.date()).num_days() as f64 + 1.0,
        _ => fallback_duration(event_duration),
    }
}

/// Coerce the raw form. `market_override_state`, when non-empty, stands in
/// for the destination state.
pub fn normalize_form(
    input: &CalculatorInput,
    market_override_state: Option<&str>,
) -> Result<NormalizedForm, EstimateError> {
    let area_sqm = effective_area(input)?;
    let destination_state = match market_override_state.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => text(&input.destination_state),
    };
    let currency = match text(&input.currency) {
        c if c.is_empty() => DOMESTIC_CURRENCY.to_string(),
        c => c.to_ascii_uppercase(),
    };

    let form = NormalizedForm {
        currency,
        market_level: text(&input.market_level),
        origin_city: text(&input.origin_city),
        origin_state: text(&input.origin_state),
        destination_city: text(&input.destination_city),
        destination_state,
        venue_type: text(&input.venue_type),
        booth_type: text(&input.booth_type),
        accommodation_level: text(&input.accommodation_level),
        area_sqm,
        stay_days: stay_duration(
            input.arrival_date.as_deref(),
            input.departure_date.as_deref(),
            &input.event_duration,
        ),
        event_days: event_days(
            input.event_start_date.as_deref(),
            input.event_end_date.as_deref(),
            &input.event_duration,
        ),
        team_size: coerce(&input.team_size).floor(),
        event_start: parse_datetime_safe(input.event_start_date.as_deref()),
        add_ons: AddOnToggles {
            furniture: flag(&input.furniture),
            av_equipment: flag(&input.av_equipment),
            lighting: flag(&input.lighting),
            internet: flag(&input.internet),
            storage: flag(&input.storage),
            security: flag(&input.security),
        },
    };
    debug!(
        area_sqm = form.area_sqm,
        stay_days = form.stay_days,
        event_days = form.event_days,
        team_size = form.team_size,
        "normalized form"
    );
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn area(value: f64, unit: &str) -> AreaInput {
        AreaInput {
            value,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn area_conversion() {
        let a = normalize_area(&area(18.0, "sqft")).unwrap();
        assert_relative_eq!(a.sqm, 1.6722, epsilon = 1e-3);
        let b = normalize_area(&area(18.0, "SQM")).unwrap();
        assert_relative_eq!(b.sqft, 193.7502, epsilon = 1e-4);
    }

    #[test]
    fn area_precondition() {
        assert!(matches!(
            normalize_area(&area(0.0, "sqm")),
            Err(EstimateError::InvalidArea { .. })
        ));
        assert!(matches!(
            normalize_area(&area(-5.0, "sqm")),
            Err(EstimateError::InvalidArea { .. })
        ));
        assert!(matches!(
            normalize_area(&area(f64::NAN, "sqm")),
            Err(EstimateError::InvalidArea { .. })
        ));
        assert!(matches!(
            normalize_area(&area(10.0, "acres")),
            Err(EstimateError::UnknownAreaUnit(_))
        ));
    }

    #[test]
    fn effective_area_precedence() {
        let mut input = CalculatorInput::default();
        assert_eq!(effective_area(&input).unwrap(), DEFAULT_AREA_SQM);
        input.booth_size = Some("36".into());
        assert_eq!(effective_area(&input).unwrap(), 36.0);
        input.custom_size = Some(0.0.into());
        assert_eq!(effective_area(&input).unwrap(), 36.0);
        input.custom_size = Some(54.0.into());
        assert_eq!(effective_area(&input).unwrap(), 54.0);
        input.custom_size = Some((-4.0).into());
        assert!(effective_area(&input).is_err());
    }

    #[test]
    fn stay_duration_rounds_up_partial_days() {
        let none = None;
        assert_eq!(stay_duration(Some("2025-11-10"), Some("2025-11-13"), &none), 3.0);
        assert_eq!(
            stay_duration(Some("2025-11-10T09:00:00"), Some("2025-11-12T10:00:00"), &none),
            3.0
        );
        // departure before arrival falls back
        let five = Some(FormField::Number(5.0));
        assert_eq!(stay_duration(Some("2025-11-13"), Some("2025-11-10"), &five), 5.0);
        assert_eq!(stay_duration(Some("garbage"), None, &none), DEFAULT_DURATION_DAYS);
        assert_eq!(stay_duration(None, None, &Some("-2".into())), DEFAULT_DURATION_DAYS);
    }

    #[test]
    fn event_days_are_inclusive() {
        let none = None;
        assert_eq!(event_days(Some("2025-11-10"), Some("2025-11-12"), &none), 3.0);
        assert_eq!(event_days(Some("2025-11-10"), Some("2025-11-10"), &none), 1.0);
        assert_eq!(event_days(None, Some("2025-11-10"), &Some(4.0.into())), 4.0);
    }

    #[test]
    fn normalize_form_coerces_everything() {
        let input = CalculatorInput {
            currency: Some(" inr ".to_string()),
            team_size: Some("4.7".into()),
            destination_state: Some("IN-KA".to_string()),
            furniture: Some(true.into()),
            lighting: Some("yes".into()),
            security: Some("nope".into()),
            ..Default::default()
        };
        let form = normalize_form(&input, Some("IN-MH")).unwrap();
        assert_eq!(form.currency, "INR");
        assert_eq!(form.team_size, 4.0);
        assert_eq!(form.destination_state, "IN-MH");
        assert_eq!(form.area_sqm, DEFAULT_AREA_SQM);
        assert!(form.add_ons.furniture && form.add_ons.lighting);
        assert!(!form.add_ons.security && !form.add_ons.internet);

        let negative_team = CalculatorInput {
            team_size: Some((-3.0).into()),
            ..Default::default()
        };
        assert_eq!(normalize_form(&negative_team, None).unwrap().team_size, 0.0);
    }
}
