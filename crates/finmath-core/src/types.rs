use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::FinMathError;
use crate::FinMathResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Percent inputs are named `*_pct`.
pub type Rate = Decimal;

/// Payment / compounding frequency, in periods per year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Annual,
    SemiAnnual,
    Quarterly,
    #[default]
    Monthly,
    BiWeekly,
    Weekly,
    Daily,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Annual => 1,
            Frequency::SemiAnnual => 2,
            Frequency::Quarterly => 4,
            Frequency::Monthly => 12,
            Frequency::BiWeekly => 26,
            Frequency::Weekly => 52,
            Frequency::Daily => 365,
        }
    }

    /// Convert a nominal annual percentage (6.5 = 6.5%) into a per-period fraction.
    pub fn periodic_rate(self, annual_rate_pct: Decimal) -> Rate {
        annual_rate_pct / dec!(100) / Decimal::from(self.periods_per_year())
    }

    /// Calendar date `periods` periods after `date`.
    ///
    /// Month-based frequencies use month arithmetic (end-of-month clamped);
    /// the rest step in whole days.
    pub fn advance(self, date: NaiveDate, periods: u32) -> Option<NaiveDate> {
        let months: Option<u32> = match self {
            Frequency::Annual => Some(12),
            Frequency::SemiAnnual => Some(6),
            Frequency::Quarterly => Some(3),
            Frequency::Monthly => Some(1),
            _ => None,
        };
        match months {
            Some(m) => date.checked_add_months(Months::new(m.checked_mul(periods)?)),
            None => {
                let days: u64 = match self {
                    Frequency::BiWeekly => 14,
                    Frequency::Weekly => 7,
                    _ => 1,
                };
                date.checked_add_days(Days::new(days * u64::from(periods)))
            }
        }
    }
}

/// Contribution timing within a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionTiming {
    /// Ordinary annuity: deposit at the end of each period.
    #[default]
    End,
    /// Annuity due: deposit at the start of each period.
    Start,
}

/// Terms of a fully amortizing loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate in percent (6 = 6%)
    pub annual_rate_pct: Decimal,
    /// Number of payment periods
    pub periods: u32,
    #[serde(default)]
    pub frequency: Frequency,
}

impl LoanTerms {
    pub fn periodic_rate(&self) -> Rate {
        self.frequency.periodic_rate(self.annual_rate_pct)
    }

    pub fn validate(&self) -> FinMathResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(FinMathError::invalid("principal", "Principal must be positive"));
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(FinMathError::invalid(
                "annual_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        if self.periods == 0 {
            return Err(FinMathError::invalid(
                "periods",
                "Number of periods must be > 0",
            ));
        }
        Ok(())
    }
}

/// One period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// 1-based period index
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub ending_balance: Money,
}

/// One point of a growth series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Period (or year, for yearly series) index, 1-based
    pub period: u32,
    pub contribution: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_periodic_rate() {
        assert_eq!(Frequency::Monthly.periodic_rate(dec!(6)), dec!(0.005));
    }

    #[test]
    fn test_advance_clamps_month_end() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let feb = Frequency::Monthly.advance(jan31, 1).unwrap();
        assert_eq!(feb, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_advance_biweekly() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let next = Frequency::BiWeekly.advance(d, 2).unwrap();
        assert_eq!(next, NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    }

    #[test]
    fn test_loan_terms_reject_zero_periods() {
        let terms = LoanTerms {
            principal: dec!(1000),
            annual_rate_pct: dec!(5),
            periods: 0,
            frequency: Frequency::Monthly,
        };
        assert!(matches!(
            terms.validate(),
            Err(FinMathError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_frequency_deserializes_snake_case() {
        let f: Frequency = serde_json::from_str("\"bi_weekly\"").unwrap();
        assert_eq!(f, Frequency::BiWeekly);
    }
}
