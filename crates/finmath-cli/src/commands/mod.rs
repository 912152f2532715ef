pub mod loans;
pub mod savings;
pub mod time_value;

use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;

use finmath_core::input::{self as parse, ParseError};
use finmath_core::types::{ContributionTiming, Frequency};
use finmath_core::FinMathError;

pub type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Payment / compounding frequency accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FrequencyArg {
    Annual,
    SemiAnnual,
    Quarterly,
    #[default]
    Monthly,
    BiWeekly,
    Weekly,
    Daily,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Annual => Frequency::Annual,
            FrequencyArg::SemiAnnual => Frequency::SemiAnnual,
            FrequencyArg::Quarterly => Frequency::Quarterly,
            FrequencyArg::Monthly => Frequency::Monthly,
            FrequencyArg::BiWeekly => Frequency::BiWeekly,
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Daily => Frequency::Daily,
        }
    }
}

/// When level contributions land within each period.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum TimingArg {
    #[default]
    End,
    Start,
}

impl From<TimingArg> for ContributionTiming {
    fn from(arg: TimingArg) -> Self {
        match arg {
            TimingArg::End => ContributionTiming::End,
            TimingArg::Start => ContributionTiming::Start,
        }
    }
}

// ---------------------------------------------------------------------------
// Flag parsing
// ---------------------------------------------------------------------------

fn missing(flag: &str) -> Box<dyn std::error::Error> {
    format!("--{flag} is required (or provide --input)").into()
}

fn convert(e: ParseError) -> Box<dyn std::error::Error> {
    Box::new(FinMathError::from(e))
}

/// Required money amount such as `$250,000`.
pub fn amount(raw: Option<&str>, flag: &str) -> CmdResult<Decimal> {
    let raw = raw.ok_or_else(|| missing(flag))?;
    parse::parse_amount(flag, raw).map_err(convert)
}

/// Optional money amount; absent or blank means zero.
pub fn amount_or_zero(raw: Option<&str>, flag: &str) -> CmdResult<Decimal> {
    match raw {
        Some(raw) => Ok(parse::parse_optional_amount(flag, raw)
            .map_err(convert)?
            .unwrap_or(Decimal::ZERO)),
        None => Ok(Decimal::ZERO),
    }
}

/// Required percentage such as `6.5%`.
pub fn percent(raw: Option<&str>, flag: &str) -> CmdResult<Decimal> {
    let raw = raw.ok_or_else(|| missing(flag))?;
    parse::parse_percent(flag, raw).map_err(convert)
}

/// Optional percentage; absent means zero.
pub fn percent_or_zero(raw: Option<&str>, flag: &str) -> CmdResult<Decimal> {
    match raw {
        Some(raw) => parse::parse_percent(flag, raw).map_err(convert),
        None => Ok(Decimal::ZERO),
    }
}

/// Required whole positive count.
pub fn count(raw: Option<&str>, flag: &str) -> CmdResult<u32> {
    let raw = raw.ok_or_else(|| missing(flag))?;
    parse::parse_periods(flag, raw).map_err(convert)
}

/// Optional ISO-8601 date.
pub fn date(raw: Option<&str>, flag: &str) -> CmdResult<Option<NaiveDate>> {
    raw.map(|raw| {
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
            Box::new(FinMathError::InvalidInput {
                field: flag.to_string(),
                reason: format!("'{raw}' is not a YYYY-MM-DD date: {e}"),
            }) as Box<dyn std::error::Error>
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_accepts_currency_text() {
        assert_eq!(amount(Some("$250,000"), "principal").unwrap(), dec!(250000));
    }

    #[test]
    fn test_missing_required_flag() {
        let err = percent(None, "rate").unwrap_err();
        assert!(err.to_string().contains("--rate is required"));
    }

    #[test]
    fn test_negative_count_is_invalid_input() {
        let err = count(Some("-12"), "periods").unwrap_err();
        assert!(err.to_string().starts_with("Invalid input: periods"));
    }

    #[test]
    fn test_optional_flags_default_to_zero() {
        assert_eq!(amount_or_zero(None, "fees").unwrap(), Decimal::ZERO);
        assert_eq!(amount_or_zero(Some("  "), "fees").unwrap(), Decimal::ZERO);
        assert_eq!(percent_or_zero(Some("0.5%"), "pmi").unwrap(), dec!(0.5));
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(
            date(Some("2026-01-31"), "start-date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31)
        );
        assert!(date(Some("31/01/2026"), "start-date").is_err());
        assert_eq!(date(None, "start-date").unwrap(), None);
    }
}
