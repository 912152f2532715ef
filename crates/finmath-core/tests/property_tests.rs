use finmath_core::savings::growth;
use finmath_core::time_value::{self, SolverConfig};
use finmath_core::types::{ContributionTiming, Frequency, LoanTerms};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn monthly_terms(principal: i64, rate_bps: i64, periods: u32) -> LoanTerms {
    LoanTerms {
        principal: Decimal::from(principal),
        annual_rate_pct: Decimal::new(rate_bps, 2),
        periods,
        frequency: Frequency::Monthly,
    }
}

proptest! {
    #[test]
    fn schedule_ends_at_zero_and_retires_principal(
        principal in 1_000i64..=2_000_000,
        rate_bps in 0i64..=2_500,
        periods in 1u32..=480,
    ) {
        let terms = monthly_terms(principal, rate_bps, periods);
        let payment = time_value::amortized_payment(
            terms.principal,
            terms.periodic_rate(),
            terms.periods,
        ).unwrap();
        let schedule = time_value::amortization_schedule(&terms, payment).unwrap();

        prop_assert_eq!(schedule.len(), periods as usize);
        let last = schedule.last().unwrap();
        prop_assert!(last.ending_balance.abs() < dec!(0.000001));

        let total_principal: Decimal = schedule.iter().map(|r| r.principal).sum();
        prop_assert!((total_principal - terms.principal).abs() < dec!(0.000001));

        for pair in schedule.windows(2) {
            prop_assert!(pair[1].ending_balance <= pair[0].ending_balance);
        }
    }

    #[test]
    fn payment_solver_is_bit_identical(
        principal in 1i64..=5_000_000,
        rate_bps in 0i64..=3_000,
        periods in 1u32..=600,
    ) {
        let rate = Frequency::Monthly.periodic_rate(Decimal::new(rate_bps, 2));
        let a = time_value::amortized_payment(Decimal::from(principal), rate, periods).unwrap();
        let b = time_value::amortized_payment(Decimal::from(principal), rate, periods).unwrap();
        prop_assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn growth_series_agrees_with_closed_form(
        deposit in 0i64..=100_000,
        contribution in 0i64..=5_000,
        rate_bps in 0i64..=1_500,
        periods in 1u32..=360,
        due in any::<bool>(),
    ) {
        let timing = if due { ContributionTiming::Start } else { ContributionTiming::End };
        let rate = Frequency::Monthly.periodic_rate(Decimal::new(rate_bps, 2));
        let series = growth::growth_series(
            Decimal::from(deposit),
            rate,
            periods,
            Decimal::from(contribution),
            timing,
        ).unwrap();
        let fv = time_value::future_value(
            Decimal::from(deposit),
            rate,
            periods,
            Decimal::from(contribution),
            timing,
        ).unwrap();
        prop_assert!((series.last().unwrap().balance - fv).abs() < dec!(0.0001));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn implied_rate_recovers_embedded_rate(
        principal in 1_000i64..=1_000_000,
        rate_bps in 1i64..=3_000,
        periods in 12u32..=360,
    ) {
        let rate = Frequency::Monthly.periodic_rate(Decimal::new(rate_bps, 2));
        let payment = time_value::amortized_payment(Decimal::from(principal), rate, periods)
            .unwrap();
        let solved = time_value::implied_rate(
            Decimal::from(principal),
            payment,
            Decimal::ZERO,
            periods,
            ContributionTiming::End,
            &SolverConfig::default(),
        ).unwrap();
        prop_assert!((solved.rate - rate).abs() < dec!(0.000001));
        prop_assert!(solved.iterations <= 80);
    }
}
