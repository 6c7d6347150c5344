use expo_estimator::types::{ContingencyBase, TaxableFlags};
use expo_estimator::util::round2;
use expo_estimator::{calculate, compute_exhibition_cost, CalculationInput, CalculatorInput};
use proptest::prelude::*;

/// Any finite or non-finite f64, including negatives, as an optional leaf.
fn any_leaf() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        Just(None),
        (-1.0e6f64..1.0e6).prop_map(Some),
        Just(Some(f64::NAN)),
        Just(Some(f64::INFINITY)),
    ]
}

fn arb_input() -> impl Strategy<Value = CalculationInput> {
    (
        0.5f64..500.0,
        prop::collection::vec(any_leaf(), 24),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(area, l, av_enabled, post_tax)| {
            let mut input = CalculationInput::with_area(area, "sqm");
            input.space.flat = l[0];
            input.space.rate_per_unit_area = l[1];
            input.space.location_premium_pct = l[2];
            input.construction.flat = l[3];
            input.construction.rate_per_unit_area = l[4];
            input.construction.finish_factor = l[5];
            input.utilities.power_kw = l[6];
            input.utilities.power_rate = l[7];
            input.utilities.internet = l[8];
            input.logistics.weight_kg = l[9];
            input.logistics.rate_per_kg = l[10];
            input.logistics.route_km = l[11];
            input.logistics.rate_per_km = l[12];
            input.travel.team_count = l[13];
            input.travel.nights = l[14];
            input.travel.airfare_per_person = l[15];
            input.travel.hotel_nightly_rate = l[16];
            input.staff_ops.promoter_days = l[17];
            input.staff_ops.promoter_rate = l[18];
            input.marketing.print = l[19];
            input.marketing.digital = l[20];
            input.marketing.av_production = l[21];
            input.marketing.av_enabled = av_enabled;
            input.tax.rate_pct = l[22];
            input.contingency.rate_pct = l[23];
            if post_tax {
                input.contingency.base = ContingencyBase::PostTax;
            }
            input
        })
}

proptest! {
    #[test]
    fn same_input_same_result(input in arb_input()) {
        let a = calculate(&input).unwrap();
        let b = calculate(&input).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn nothing_is_negative(input in arb_input()) {
        let r = calculate(&input).unwrap();
        let b = r.breakdown;
        for v in [
            b.space, b.construction, b.utilities, b.logistics, b.travel, b.staff_ops,
            b.marketing, b.subtotal, b.tax_total, b.contingency_total,
            r.totals.grand_total, r.totals.cost_per_sqm, r.totals.cost_per_sqft,
        ] {
            prop_assert!(v.is_finite() && v >= 0.0, "bad amount {}", v);
        }
    }

    #[test]
    fn bigger_booth_never_costs_less(
        area in 1.0f64..400.0,
        extra in 0.0f64..400.0,
        space_rate in 0.0f64..20_000.0,
        build_rate in 0.0f64..20_000.0,
        premium in 0.0f64..50.0,
    ) {
        let build = |a: f64| {
            let mut input = CalculationInput::with_area(a, "sqm");
            input.space.rate_per_unit_area = Some(space_rate);
            input.space.location_premium_pct = Some(premium);
            input.construction.rate_per_unit_area = Some(build_rate);
            calculate(&input).unwrap().breakdown
        };
        let small = build(area);
        let large = build(area + extra);
        prop_assert!(large.space >= small.space);
        prop_assert!(large.construction >= small.construction);
    }

    #[test]
    fn huge_booths_saturate_instead_of_vanishing(
        area in 1.0e300f64..1.0e306,
        extra in 0.0f64..1.0e306,
    ) {
        let build = |a: f64| {
            let mut input = CalculationInput::with_area(a, "sqm");
            input.space.rate_per_unit_area = Some(4200.0);
            calculate(&input).unwrap()
        };
        let small = build(area);
        let large = build(area + extra);
        prop_assert!(large.breakdown.space >= small.breakdown.space);
        prop_assert!(large.totals.grand_total >= small.totals.grand_total);
        prop_assert!(large.totals.grand_total.is_finite() && large.totals.grand_total > 0.0);
    }

    #[test]
    fn flat_space_override_wins(
        flat in 1.0f64..1.0e7,
        rate in 1.0f64..50_000.0,
        area in 1.0f64..1000.0,
    ) {
        let mut input = CalculationInput::with_area(area, "sqm");
        input.space.flat = Some(flat);
        input.space.rate_per_unit_area = Some(rate);
        prop_assert_eq!(calculate(&input).unwrap().breakdown.space, round2(flat));
    }

    #[test]
    fn no_taxable_flags_no_tax(input in arb_input(), gst in 0.0f64..100.0) {
        let mut input = input;
        input.tax.rate_pct = Some(gst);
        input.tax.taxable_flags = TaxableFlags::none();
        prop_assert_eq!(calculate(&input).unwrap().breakdown.tax_total, 0.0);
    }

    #[test]
    fn contingency_base_switch(input in arb_input(), rate in 1.0f64..30.0) {
        let mut pre = input;
        pre.space.flat = Some(100_000.0);
        pre.tax.rate_pct = Some(18.0);
        pre.tax.taxable_flags = TaxableFlags::default();
        pre.contingency.rate_pct = Some(rate);
        pre.contingency.base = ContingencyBase::PreTax;
        let mut post = pre.clone();
        post.contingency.base = ContingencyBase::PostTax;

        let a = calculate(&pre).unwrap().breakdown;
        let b = calculate(&post).unwrap().breakdown;
        prop_assert_eq!(a.contingency_total, round2(a.subtotal * (rate / 100.0)));
        prop_assert_eq!(
            b.contingency_total,
            round2((b.subtotal + b.tax_total) * (rate / 100.0))
        );
        prop_assert!(b.contingency_total > a.contingency_total);
    }

    #[test]
    fn wizard_never_fails_on_partial_forms(
        team in prop::option::of(-5.0f64..30.0),
        city in prop::option::of("[A-Za-z ]{0,12}"),
        booth in prop::option::of("[a-z_]{0,10}"),
        start in prop::option::of("2025-(0[1-9]|1[0-2])-1[0-9]"),
    ) {
        let form = CalculatorInput {
            team_size: team.map(Into::into),
            destination_city: city,
            booth_type: booth,
            event_start_date: start,
            ..Default::default()
        };
        let breakdown = compute_exhibition_cost(&form, None).unwrap();
        prop_assert!(breakdown.total > 0);
    }
}
