use serde_json::Value;

/// Key answer fields, most specific first.
const PRIORITY_KEYS: [&str; 8] = [
    "periodic_payment",
    "monthly_principal_and_interest",
    "future_value",
    "rate",
    "whole",
    "break_even_periods",
    "final_balance",
    "apr",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in priority order, then falls back
/// to the first non-null field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_null()) {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_wins_over_other_fields() {
        let value = json!({"result": {"apr": "0.08", "periodic_payment": "500.95"}});
        assert_eq!(minimal_line(&value), "500.95");
    }

    #[test]
    fn test_null_break_even_is_skipped() {
        let value = json!({"result": {
            "current_payment": "900",
            "break_even_periods": null,
        }});
        assert_eq!(minimal_line(&value), "current_payment: 900");
    }
}
