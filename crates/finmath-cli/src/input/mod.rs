pub mod file;

use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Load a request from `--input` or piped stdin; `None` means build it from flags.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return Ok(Some(file::read_input(path)?));
    }
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut piped = String::new();
    io::stdin().read_to_string(&mut piped)?;
    parse_piped(&piped)
}

/// An empty pipe carries no request.
fn parse_piped<T: DeserializeOwned>(
    text: &str,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use finmath_core::types::{Frequency, LoanTerms};
    use rust_decimal_macros::dec;

    #[test]
    fn test_blank_pipe_falls_back_to_flags() {
        let parsed: Option<LoanTerms> = parse_piped(" \n\t").unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn test_piped_json_becomes_request() {
        let text = r#"{"principal": "200000", "annual_rate_pct": "6", "periods": 360}"#;
        let terms: LoanTerms = parse_piped(text).unwrap().unwrap();
        assert_eq!(terms.principal, dec!(200000));
        assert_eq!(terms.periods, 360);
        assert_eq!(terms.frequency, Frequency::Monthly);
    }

    #[test]
    fn test_malformed_pipe_is_an_error() {
        let parsed: Result<Option<LoanTerms>, _> = parse_piped("{\"principal\": ");
        assert!(parsed.is_err());
    }
}
