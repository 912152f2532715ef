use finmath_core::time_value::{self, ScheduleOptions, SolverConfig};
use finmath_core::types::{ContributionTiming, Frequency, LoanTerms};
use finmath_core::FinMathError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

fn monthly(principal: Decimal, annual_rate_pct: Decimal, periods: u32) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate_pct,
        periods,
        frequency: Frequency::Monthly,
    }
}

// ===========================================================================
// Values beyond the Decimal range
// ===========================================================================

#[test]
fn test_payment_on_unrepresentable_interest_is_non_amortizing() {
    let principal = dec!(70000000000000000000000000000);
    let result = time_value::amortized_payment(principal, dec!(2), 12);
    assert!(
        matches!(result, Err(FinMathError::NonAmortizing { .. })),
        "got {result:?}"
    );
}

#[test]
fn test_zero_rate_future_value_overflow_is_reported() {
    let result = time_value::future_value(
        Decimal::MAX,
        Decimal::ZERO,
        12,
        Decimal::MAX,
        ContributionTiming::End,
    );
    assert!(matches!(result, Err(FinMathError::InvalidInput { .. })));
}

#[test]
fn test_compounded_future_value_overflow_is_reported() {
    let result = time_value::future_value(
        dec!(1000000),
        dec!(0.5),
        400,
        dec!(1000),
        ContributionTiming::Start,
    );
    assert!(matches!(result, Err(FinMathError::InvalidInput { .. })));
}

#[test]
fn test_zero_rate_present_value_overflow_is_reported() {
    let result = time_value::present_value(
        Decimal::MAX,
        Decimal::ZERO,
        3,
        Decimal::MAX,
        ContributionTiming::End,
    );
    assert!(matches!(result, Err(FinMathError::InvalidInput { .. })));
}

#[test]
fn test_payoff_with_unrepresentable_interest_is_non_amortizing() {
    let result = time_value::periods_to_payoff(Decimal::MAX, dec!(2), dec!(100));
    assert!(matches!(result, Err(FinMathError::NonAmortizing { .. })));
}

// ===========================================================================
// Rates at the edge of Decimal resolution
// ===========================================================================

#[test]
fn test_payoff_at_vanishing_rate_behaves_like_zero_rate() {
    // ln(1 + 1e-28) may round to zero; either way 1200 / 100 is about 12 payments
    let rate = dec!(0.0000000000000000000000000001);
    let result = time_value::periods_to_payoff(dec!(1200), rate, dec!(100));
    match result {
        Ok(payoff) => assert!(payoff.exact >= Decimal::ZERO, "got {payoff:?}"),
        Err(e) => assert!(
            matches!(e, FinMathError::InvalidInput { .. }),
            "unexpected error {e}"
        ),
    }
}

#[test]
fn test_payoff_zero_rate_tiny_payment_too_long() {
    let result = time_value::periods_to_payoff(dec!(1000000000), Decimal::ZERO, dec!(0.0001));
    assert!(matches!(result, Err(FinMathError::InvalidInput { .. })));
}

// ===========================================================================
// Undersized schedule payments
// ===========================================================================

#[test]
fn test_schedule_rejects_payment_just_above_interest() {
    let terms = monthly(dec!(100000), dec!(12), 12);
    let result = time_value::amortization_schedule(&terms, dec!(1001));
    match result {
        Err(FinMathError::NonAmortizing { payment, interest }) => {
            assert_eq!(payment, dec!(1001));
            assert_eq!(interest, dec!(1000));
        }
        other => panic!("expected NonAmortizing, got {other:?}"),
    }
}

#[test]
fn test_schedule_rejects_short_zero_rate_payment() {
    let terms = monthly(dec!(1200), Decimal::ZERO, 12);
    let result = time_value::amortization_schedule(&terms, dec!(99));
    assert!(matches!(result, Err(FinMathError::NonAmortizing { .. })));
}

#[test]
fn test_schedule_accepts_payment_rounded_down_to_the_cent() {
    let terms = monthly(dec!(200000), dec!(6), 360);
    let exact =
        time_value::amortized_payment(terms.principal, terms.periodic_rate(), terms.periods)
            .unwrap();
    let truncated = exact.round_dp_with_strategy(2, RoundingStrategy::ToZero);

    let schedule = time_value::amortization_schedule(&terms, truncated).unwrap();
    assert_eq!(schedule.len(), 360);
    let last = schedule.last().unwrap();
    assert_eq!(last.ending_balance, Decimal::ZERO);
    // The final row absorbs less than a cent per period of shortfall
    assert!(last.payment - truncated < dec!(10), "final payment {}", last.payment);
}

#[test]
fn test_extra_principal_counts_towards_level_payment() {
    let terms = monthly(dec!(1200), Decimal::ZERO, 12);
    let options = ScheduleOptions {
        extra_payment: dec!(50),
        start_date: None,
    };
    let schedule = time_value::amortization_schedule_with(&terms, dec!(50), &options).unwrap();
    assert_eq!(schedule.len(), 12);
    assert!(schedule.iter().all(|row| row.payment == dec!(100)));
}

// ===========================================================================
// Principal and solver domain
// ===========================================================================

#[test]
fn test_payment_rejects_non_positive_principal() {
    for principal in [Decimal::ZERO, dec!(-1)] {
        let result = time_value::amortized_payment(principal, dec!(0.005), 360);
        assert!(matches!(result, Err(FinMathError::InvalidInput { .. })));
    }
}

#[test]
fn test_implied_rate_unrepresentable_cash_flows_have_no_solution() {
    // The payments are worth more than Decimal::MAX at a zero rate
    let result = time_value::implied_rate(
        dec!(1000),
        Decimal::MAX,
        Decimal::ZERO,
        12,
        ContributionTiming::End,
        &SolverConfig::default(),
    );
    match result {
        Err(FinMathError::NoSolution { function, .. }) => assert_eq!(function, "implied_rate"),
        other => panic!("expected NoSolution, got {other:?}"),
    }
}
