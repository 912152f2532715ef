use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FinMathError;
use crate::types::{AmortizationRow, ContributionTiming, Frequency, LoanTerms, Money, Rate};
use crate::FinMathResult;

const DEFAULT_LOWER_BOUND: Decimal = Decimal::ZERO;
const DEFAULT_UPPER_BOUND: Decimal = Decimal::ONE;
const DEFAULT_MAX_ITERATIONS: u32 = 80;
const DEFAULT_TOLERANCE: Decimal = dec!(0.000000000001);

/// Payoff period counts are rounded to this many places before the ceiling,
/// so 359.9999999 and 360.0000001 both land on 360.
const PERIOD_ROUNDING_DP: u32 = 6;

/// A payment rounded down to the cent still amortizes; the final row
/// absorbs the accumulated shortfall.
const PAYMENT_ROUNDING_ALLOWANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bisection bounds and stopping rule for [`implied_rate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lowest per-period rate searched
    pub lower_bound: Rate,
    /// Highest per-period rate searched
    pub upper_bound: Rate,
    pub max_iterations: u32,
    /// Stop once the bracketing interval is narrower than this
    pub tolerance: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            lower_bound: DEFAULT_LOWER_BOUND,
            upper_bound: DEFAULT_UPPER_BOUND,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SolverConfig {
    fn validate(&self) -> FinMathResult<()> {
        if self.lower_bound <= dec!(-1) {
            return Err(FinMathError::invalid(
                "lower_bound",
                "Lower bound must be greater than -100%",
            ));
        }
        if self.upper_bound <= self.lower_bound {
            return Err(FinMathError::invalid(
                "upper_bound",
                "Upper bound must exceed lower bound",
            ));
        }
        if self.max_iterations == 0 {
            return Err(FinMathError::invalid(
                "max_iterations",
                "Iteration cap must be > 0",
            ));
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(FinMathError::invalid("tolerance", "Tolerance must be positive"));
        }
        Ok(())
    }
}

/// Per-period rate found by bisection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSolveResult {
    pub rate: Rate,
    pub iterations: u32,
    /// Width of the final bracketing interval
    pub interval_width: Decimal,
}

/// Number of payments needed to retire a balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPeriods {
    /// Fractional period count from the closed form
    pub exact: Decimal,
    /// Payments actually made (the last one partial)
    pub whole: u32,
}

/// Optional schedule adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Additional principal paid every period
    pub extra_payment: Money,
    /// Loan origination date; the first payment falls one period later
    pub start_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// (1 + r)^n, or None if it exceeds the Decimal range.
pub(crate) fn compound(rate: Rate, n: u32) -> Option<Decimal> {
    Decimal::ONE.checked_add(rate)?.checked_powi(i64::from(n))
}

/// (1 + r)^-n. Underflows towards zero instead of overflowing for large n.
fn discount_factor(rate: Rate, n: u32) -> Option<Decimal> {
    let v = Decimal::ONE.checked_div(Decimal::ONE.checked_add(rate)?)?;
    v.checked_powi(i64::from(n))
}

fn require_periods(field: &str, periods: u32) -> FinMathResult<()> {
    if periods == 0 {
        return Err(FinMathError::invalid(field, "Number of periods must be > 0"));
    }
    Ok(())
}

fn require_rate_above_minus_one(rate: Rate) -> FinMathResult<()> {
    if rate <= dec!(-1) {
        return Err(FinMathError::invalid(
            "rate",
            "Rate must be greater than -100%",
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Closed forms
// ---------------------------------------------------------------------------

/// Fixed periodic payment that retires `principal` over `periods` payments.
///
/// payment = P·r / (1 − (1+r)^−n), or P / n when r = 0.
pub fn amortized_payment(principal: Money, rate: Rate, periods: u32) -> FinMathResult<Money> {
    require_periods("periods", periods)?;
    if rate < Decimal::ZERO {
        return Err(FinMathError::invalid("rate", "Interest rate cannot be negative"));
    }
    if principal <= Decimal::ZERO {
        return Err(FinMathError::invalid("principal", "Principal must be positive"));
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    // Interest beyond the Decimal range can never be retired; report it saturated
    let interest = principal
        .checked_mul(rate)
        .ok_or(FinMathError::NonAmortizing {
            payment: Decimal::MAX,
            interest: Decimal::MAX,
        })?;
    let non_amortizing = || FinMathError::NonAmortizing {
        payment: interest,
        interest,
    };

    let vn = discount_factor(rate, periods).ok_or_else(non_amortizing)?;
    let denominator = Decimal::ONE - vn;
    if denominator <= Decimal::ZERO {
        return Err(non_amortizing());
    }
    interest.checked_div(denominator).ok_or_else(non_amortizing)
}

/// Future value of `present_value` plus a level contribution each period.
///
/// FV = PV·(1+r)^n + C·((1+r)^n − 1)/r, with the contribution term scaled by
/// (1+r) for [`ContributionTiming::Start`].
pub fn future_value(
    present_value: Money,
    rate: Rate,
    periods: u32,
    contribution: Money,
    timing: ContributionTiming,
) -> FinMathResult<Money> {
    require_periods("periods", periods)?;
    require_rate_above_minus_one(rate)?;

    let out_of_range = || {
        FinMathError::invalid(
            "periods",
            "Compounded value exceeds the representable range",
        )
    };

    if rate.is_zero() {
        return contribution
            .checked_mul(Decimal::from(periods))
            .and_then(|deposits| present_value.checked_add(deposits))
            .ok_or_else(out_of_range);
    }

    let factor = compound(rate, periods).ok_or_else(out_of_range)?;
    let annuity = annuity_factor(factor - Decimal::ONE, rate, timing).ok_or_else(out_of_range)?;

    let grown = present_value.checked_mul(factor).ok_or_else(out_of_range)?;
    let accumulated = contribution.checked_mul(annuity).ok_or_else(out_of_range)?;
    grown.checked_add(accumulated).ok_or_else(out_of_range)
}

/// Present value of a future lump sum plus a level payment each period.
///
/// PV = FV·(1+r)^−n + C·(1 − (1+r)^−n)/r, the payment term scaled by (1+r)
/// for [`ContributionTiming::Start`].
pub fn present_value(
    future_value: Money,
    rate: Rate,
    periods: u32,
    payment: Money,
    timing: ContributionTiming,
) -> FinMathResult<Money> {
    require_periods("periods", periods)?;
    require_rate_above_minus_one(rate)?;

    let out_of_range = || {
        FinMathError::invalid("periods", "Discounted value exceeds the representable range")
    };

    if rate.is_zero() {
        return payment
            .checked_mul(Decimal::from(periods))
            .and_then(|payments| future_value.checked_add(payments))
            .ok_or_else(out_of_range);
    }

    let vn = discount_factor(rate, periods).ok_or_else(out_of_range)?;
    let annuity = Decimal::ONE
        .checked_sub(vn)
        .and_then(|growth| annuity_factor(growth, rate, timing))
        .ok_or_else(out_of_range)?;

    let discounted = future_value.checked_mul(vn).ok_or_else(out_of_range)?;
    let payments = payment.checked_mul(annuity).ok_or_else(out_of_range)?;
    discounted.checked_add(payments).ok_or_else(out_of_range)
}

/// growth / r, scaled by (1 + r) for an annuity due.
fn annuity_factor(growth: Decimal, rate: Rate, timing: ContributionTiming) -> Option<Decimal> {
    let annuity = growth.checked_div(rate)?;
    match timing {
        ContributionTiming::End => Some(annuity),
        ContributionTiming::Start => annuity.checked_mul(Decimal::ONE.checked_add(rate)?),
    }
}

/// Effective annual rate of a nominal annual percentage compounded at `frequency`.
pub fn effective_annual_rate(
    annual_rate_pct: Decimal,
    frequency: Frequency,
) -> FinMathResult<Rate> {
    let periodic = frequency.periodic_rate(annual_rate_pct);
    require_rate_above_minus_one(periodic)?;
    let factor = compound(periodic, frequency.periods_per_year()).ok_or_else(|| {
        FinMathError::invalid("annual_rate_pct", "Effective rate exceeds the representable range")
    })?;
    Ok(factor - Decimal::ONE)
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Period-by-period amortization of `terms` at a fixed `payment`.
pub fn amortization_schedule(
    terms: &LoanTerms,
    payment: Money,
) -> FinMathResult<Vec<AmortizationRow>> {
    amortization_schedule_with(terms, payment, &ScheduleOptions::default())
}

/// Amortization with optional extra principal and payment dates.
///
/// Each period: interest = balance·r, principal = payment − interest (+ extra).
/// The final row pays off the remaining balance exactly; with extra principal
/// the schedule stops as soon as the balance is retired.
pub fn amortization_schedule_with(
    terms: &LoanTerms,
    payment: Money,
    options: &ScheduleOptions,
) -> FinMathResult<Vec<AmortizationRow>> {
    terms.validate()?;
    if payment <= Decimal::ZERO {
        return Err(FinMathError::invalid("payment", "Payment must be positive"));
    }
    if options.extra_payment < Decimal::ZERO {
        return Err(FinMathError::invalid(
            "extra_payment",
            "Extra payment cannot be negative",
        ));
    }

    let rate = terms.periodic_rate();
    let paid = payment
        .checked_add(options.extra_payment)
        .ok_or_else(|| FinMathError::invalid("extra_payment", "Payment is out of range"))?;

    // Anything short of the level payment would leave a balloon on the last row
    let required = amortized_payment(terms.principal, rate, terms.periods)?;
    if paid < required - PAYMENT_ROUNDING_ALLOWANCE {
        return Err(FinMathError::NonAmortizing {
            payment: paid,
            interest: terms.principal * rate,
        });
    }

    let mut schedule = Vec::with_capacity(terms.periods as usize);
    let mut balance = terms.principal;

    for period in 1..=terms.periods {
        let interest = balance * rate;
        let mut principal = paid - interest;

        let is_last = period == terms.periods || principal >= balance;
        if is_last {
            principal = balance;
        }

        balance -= principal;
        // Rounding drift never leaves a negative balance behind
        if is_last || balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        let payment_date = match options.start_date {
            Some(start) => Some(terms.frequency.advance(start, period).ok_or_else(|| {
                FinMathError::invalid("start_date", "Payment date is out of range")
            })?),
            None => None,
        };

        schedule.push(AmortizationRow {
            period,
            payment_date,
            payment: interest + principal,
            interest,
            principal,
            ending_balance: balance,
        });

        if is_last {
            break;
        }
    }

    Ok(schedule)
}

// ---------------------------------------------------------------------------
// Solvers
// ---------------------------------------------------------------------------

/// Per-period rate at which the present value of `payment` each period (plus
/// `future_value` at the end) equals `target_pv`, found by bisection.
///
/// The present value is strictly decreasing in the rate, so a midpoint value
/// above the target moves the lower bound up and anything else moves the
/// upper bound down.
pub fn implied_rate(
    target_pv: Money,
    payment: Money,
    future_value: Money,
    periods: u32,
    timing: ContributionTiming,
    config: &SolverConfig,
) -> FinMathResult<RateSolveResult> {
    const FUNCTION: &str = "implied_rate";

    require_periods("periods", periods)?;
    config.validate()?;

    if target_pv <= Decimal::ZERO {
        return Err(FinMathError::no_solution(
            FUNCTION,
            "present value (net proceeds) must be positive",
        ));
    }
    if payment < Decimal::ZERO || future_value < Decimal::ZERO {
        return Err(FinMathError::no_solution(
            FUNCTION,
            "payments and future value cannot be negative",
        ));
    }
    if payment.is_zero() && future_value.is_zero() {
        return Err(FinMathError::no_solution(
            FUNCTION,
            "at least one of payment or future value must be positive",
        ));
    }

    let pv_at = |rate: Rate| {
        present_value(future_value, rate, periods, payment, timing).map_err(|e| {
            FinMathError::no_solution(FUNCTION, format!("cash flows at rate {rate}: {e}"))
        })
    };

    let mut lo = config.lower_bound;
    let mut hi = config.upper_bound;

    let pv_lo = pv_at(lo)?;
    if target_pv > pv_lo {
        return Err(FinMathError::no_solution(
            FUNCTION,
            format!(
                "cash flows are worth {pv_lo} at the lower bound {lo}, below the target {target_pv}"
            ),
        ));
    }
    let pv_hi = pv_at(hi)?;
    if target_pv < pv_hi {
        return Err(FinMathError::no_solution(
            FUNCTION,
            format!(
                "cash flows are worth {pv_hi} at the upper bound {hi}, above the target {target_pv}"
            ),
        ));
    }

    for iteration in 1..=config.max_iterations {
        let mid = lo / dec!(2) + hi / dec!(2);
        if pv_at(mid)? > target_pv {
            lo = mid;
        } else {
            hi = mid;
        }

        let width = hi - lo;
        if width < config.tolerance {
            let rate = lo / dec!(2) + hi / dec!(2);
            debug!(iterations = iteration, rate = %rate, "implied rate converged");
            return Ok(RateSolveResult {
                rate,
                iterations: iteration,
                interval_width: width,
            });
        }
    }

    Err(FinMathError::no_solution(
        FUNCTION,
        format!(
            "did not converge within {} iterations (interval width {})",
            config.max_iterations,
            hi - lo
        ),
    ))
}

/// Number of level payments needed to retire `principal` at `rate`.
///
/// n = −ln(1 − P·r / payment) / ln(1 + r), or P / payment when r = 0.
pub fn periods_to_payoff(
    principal: Money,
    rate: Rate,
    payment: Money,
) -> FinMathResult<PayoffPeriods> {
    if principal <= Decimal::ZERO {
        return Err(FinMathError::invalid("principal", "Principal must be positive"));
    }
    if rate < Decimal::ZERO {
        return Err(FinMathError::invalid("rate", "Interest rate cannot be negative"));
    }
    if payment <= Decimal::ZERO {
        return Err(FinMathError::invalid("payment", "Payment must be positive"));
    }

    let too_long = || FinMathError::invalid("payment", "Payoff takes too many periods");
    let rate_out_of_range = || FinMathError::invalid("rate", "Rate is out of range");

    let denominator = Decimal::ONE
        .checked_add(rate)
        .and_then(|growth| growth.checked_ln())
        .ok_or_else(rate_out_of_range)?;

    // A rate too small for ln(1 + r) to register pays off like a zero rate
    let exact = if rate.is_zero() || denominator.is_zero() {
        principal.checked_div(payment).ok_or_else(too_long)?
    } else {
        let interest = principal.checked_mul(rate).ok_or(FinMathError::NonAmortizing {
            payment,
            interest: Decimal::MAX,
        })?;
        if payment <= interest {
            return Err(FinMathError::NonAmortizing { payment, interest });
        }
        let numerator = interest
            .checked_div(payment)
            .and_then(|share| Decimal::ONE.checked_sub(share))
            .and_then(|remaining| remaining.checked_ln())
            .ok_or(FinMathError::NonAmortizing { payment, interest })?;
        -numerator.checked_div(denominator).ok_or_else(too_long)?
    };

    let whole = exact
        .round_dp(PERIOD_ROUNDING_DP)
        .ceil()
        .to_u32()
        .ok_or_else(too_long)?;

    Ok(PayoffPeriods { exact, whole })
}
