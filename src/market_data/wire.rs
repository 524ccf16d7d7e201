// Explicit numeric coercion for exchange payloads. Binance sends prices and
// quantities as JSON strings and ids/timestamps as JSON numbers; both forms are
// accepted here, anything else is an error.

use serde_json::Value;

use crate::error::FetchError;

/// Parse a string-or-number JSON value into a finite `f64`.
pub(crate) fn parse_f64(val: &Value, field: &'static str) -> Result<f64, FetchError> {
    let parsed = match val {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        Value::Null => return Err(missing(field)),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(FetchError::Parse {
            field,
            value: val.to_string(),
        }),
    }
}

/// Parse a string-or-number JSON value into an `i64`.
pub(crate) fn parse_i64(val: &Value, field: &'static str) -> Result<i64, FetchError> {
    let parsed = match val {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Null => return Err(missing(field)),
        _ => None,
    };

    parsed.ok_or_else(|| FetchError::Parse {
        field,
        value: val.to_string(),
    })
}

/// Look up `field` on a JSON object, failing if it is absent.
pub(crate) fn field<'a>(obj: &'a Value, field: &'static str) -> Result<&'a Value, FetchError> {
    obj.get(field).ok_or_else(|| missing(field))
}

fn missing(field: &'static str) -> FetchError {
    FetchError::Malformed(format!("missing field `{field}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn f64_from_string_and_number() {
        assert_eq!(parse_f64(&json!("42.50"), "p").unwrap(), 42.5);
        assert_eq!(parse_f64(&json!(7), "p").unwrap(), 7.0);
        assert_eq!(parse_f64(&json!("-0.00010000"), "p").unwrap(), -0.0001);
    }

    #[test]
    fn f64_rejects_text_and_non_finite() {
        assert!(matches!(
            parse_f64(&json!("abc"), "lastPrice"),
            Err(FetchError::Parse { field: "lastPrice", .. })
        ));
        assert!(matches!(
            parse_f64(&json!("NaN"), "lastPrice"),
            Err(FetchError::Parse { .. })
        ));
        assert!(matches!(
            parse_f64(&json!(true), "lastPrice"),
            Err(FetchError::Parse { .. })
        ));
    }

    #[test]
    fn null_is_treated_as_missing() {
        assert!(matches!(
            parse_f64(&Value::Null, "volume"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn i64_accepts_negative_ids() {
        assert_eq!(parse_i64(&json!(-1), "firstId").unwrap(), -1);
        assert_eq!(parse_i64(&json!("1700000000000"), "openTime").unwrap(), 1_700_000_000_000);
        assert!(parse_i64(&json!(1.5), "count").is_err());
    }

    #[test]
    fn field_lookup_reports_name() {
        let obj = json!({ "symbol": "BTCUSDT" });
        assert!(field(&obj, "symbol").is_ok());
        let err = field(&obj, "lastPrice").unwrap_err();
        assert!(err.to_string().contains("lastPrice"));
    }
}
