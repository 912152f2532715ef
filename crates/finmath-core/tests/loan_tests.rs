use chrono::NaiveDate;
use finmath_core::loans::loan::{calculate_loan, LoanInput};
use finmath_core::loans::mortgage::{calculate_mortgage, MortgageInput};
use finmath_core::loans::refinance::{analyze_refinance, RefinanceInput};
use finmath_core::time_value::SolverConfig;
use finmath_core::types::Frequency;
use finmath_core::FinMathError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Helpers
// ===========================================================================

fn auto_loan() -> LoanInput {
    LoanInput {
        principal: dec!(32000),
        annual_rate_pct: dec!(6.9),
        periods: 72,
        frequency: Frequency::Monthly,
        extra_payment: Decimal::ZERO,
        fees: Decimal::ZERO,
        start_date: None,
        solver: SolverConfig::default(),
    }
}

fn starter_home() -> MortgageInput {
    MortgageInput {
        home_price: dec!(250000),
        down_payment: dec!(12500),
        annual_rate_pct: dec!(7),
        term_years: 30,
        annual_property_tax: dec!(3000),
        annual_insurance: dec!(1500),
        monthly_hoa: Decimal::ZERO,
        pmi_rate_pct: dec!(0.5),
        extra_payment: Decimal::ZERO,
        start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
    }
}

// ===========================================================================
// Loan
// ===========================================================================

#[test]
fn test_loan_totals_reconcile() {
    let out = calculate_loan(&auto_loan()).unwrap().result;
    assert_eq!(out.number_of_payments, 72);
    assert_eq!(out.schedule.len(), 72);
    assert!((out.total_paid - out.total_interest - dec!(32000)).abs() < dec!(0.000001));
    assert_eq!(out.apr, dec!(0.069));
}

#[test]
fn test_loan_result_carries_metadata() {
    let out = calculate_loan(&auto_loan()).unwrap();
    assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    assert!(out.assumptions.get("principal").is_some());
    assert!(out.warnings.is_empty());
}

#[test]
fn test_loan_extra_payment_never_costs_more() {
    let base = calculate_loan(&auto_loan()).unwrap().result;
    let mut input = auto_loan();
    input.extra_payment = dec!(50);
    let faster = calculate_loan(&input).unwrap().result;
    assert!(faster.total_interest < base.total_interest);
    assert_eq!(faster.periods_saved, 72 - faster.number_of_payments);
    assert!(faster.schedule.last().unwrap().ending_balance.is_zero());
}

#[test]
fn test_weekly_loan_dates() {
    let mut input = auto_loan();
    input.frequency = Frequency::Weekly;
    input.periods = 4;
    input.start_date = NaiveDate::from_ymd_opt(2026, 3, 2);
    let out = calculate_loan(&input).unwrap().result;
    let dates: Vec<_> = out.schedule.iter().map(|r| r.payment_date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2026, 3, 9),
            NaiveDate::from_ymd_opt(2026, 3, 16),
            NaiveDate::from_ymd_opt(2026, 3, 23),
            NaiveDate::from_ymd_opt(2026, 3, 30),
        ]
    );
    assert_eq!(out.payoff_date, NaiveDate::from_ymd_opt(2026, 3, 30));
}

#[test]
fn test_loan_from_json_with_defaults() {
    let json = r#"{"principal": "1200", "annual_rate_pct": "0", "periods": 12}"#;
    let input: LoanInput = serde_json::from_str(json).unwrap();
    let out = calculate_loan(&input).unwrap().result;
    assert_eq!(out.periodic_payment, dec!(100));
    assert_eq!(out.total_interest, Decimal::ZERO);
}

#[test]
fn test_loan_negative_rate_rejected() {
    let mut input = auto_loan();
    input.annual_rate_pct = dec!(-1);
    assert!(matches!(
        calculate_loan(&input),
        Err(FinMathError::InvalidInput { .. })
    ));
}

// ===========================================================================
// Mortgage
// ===========================================================================

#[test]
fn test_mortgage_with_pmi_and_dates() {
    let out = calculate_mortgage(&starter_home()).unwrap().result;
    assert_eq!(out.loan_amount, dec!(237500));
    assert_eq!(out.loan_to_value, dec!(0.95));
    assert!(out.pmi_months > 0);
    assert_eq!(out.schedule[0].payment_date, NaiveDate::from_ymd_opt(2026, 2, 1));
    assert_eq!(out.payoff_date, NaiveDate::from_ymd_opt(2056, 1, 1));
    assert_eq!(out.monthly_property_tax, dec!(250));
    assert_eq!(out.monthly_insurance, dec!(125));
}

#[test]
fn test_mortgage_extra_principal_shortens_pmi() {
    let base = calculate_mortgage(&starter_home()).unwrap().result;
    let mut input = starter_home();
    input.extra_payment = dec!(300);
    let faster = calculate_mortgage(&input).unwrap().result;
    assert!(faster.pmi_months < base.pmi_months);
    assert!(faster.schedule.len() < base.schedule.len());
}

// ===========================================================================
// Refinance
// ===========================================================================

#[test]
fn test_refinance_rate_drop_breaks_even() {
    let input = RefinanceInput {
        current_balance: dec!(280000),
        current_annual_rate_pct: dec!(7.5),
        remaining_periods: 336,
        new_annual_rate_pct: dec!(6),
        new_periods: 336,
        closing_costs: dec!(5000),
        frequency: Frequency::Monthly,
        solver: SolverConfig::default(),
    };
    let out = analyze_refinance(&input).unwrap();
    let r = &out.result;
    assert!(r.periodic_savings > Decimal::ZERO);
    let months = r.break_even_periods.unwrap();
    assert!(Decimal::from(months) * r.periodic_savings >= dec!(5000));
    assert!(Decimal::from(months - 1) * r.periodic_savings < dec!(5000));
    assert!(r.new_loan_apr > dec!(0.06));
    assert!(r.lifetime_savings > Decimal::ZERO);
    assert!(out.warnings.is_empty());
}

#[test]
fn test_refinance_into_higher_rate_never_breaks_even() {
    let input = RefinanceInput {
        current_balance: dec!(100000),
        current_annual_rate_pct: dec!(4),
        remaining_periods: 240,
        new_annual_rate_pct: dec!(6),
        new_periods: 240,
        closing_costs: Decimal::ZERO,
        frequency: Frequency::Monthly,
        solver: SolverConfig::default(),
    };
    let out = analyze_refinance(&input).unwrap();
    assert_eq!(out.result.break_even_periods, None);
    assert!(!out.warnings.is_empty());
}
