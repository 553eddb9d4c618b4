//! Typed value marshaling at the host/snippet boundary.
//!
//! Coercion always happens at the consuming port, never at the producing
//! port: a producer is free to emit a loosely-typed value, the contract is
//! enforced at first consumption. The output router relays values without
//! re-marshaling them.

use chrono::{DateTime, NaiveDate};
use snipcore::{PortSchema, TypeError, TypeTag, Value};

/// Coerce a raw value to a port's declared kind.
///
/// Strict-then-lenient: a value whose native kind already matches passes
/// through; otherwise a single well-defined conversion is attempted, and
/// anything ambiguous or lossy fails with a `TypeError`.
pub fn coerce(value: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    match schema.kind {
        TypeTag::Passthrough => Ok(value),
        TypeTag::Integer => coerce_integer(value, schema),
        TypeTag::Float => coerce_float(value, schema),
        TypeTag::Boolean => coerce_boolean(value, schema),
        TypeTag::ShortText | TypeTag::LongText => coerce_text(value, schema),
        TypeTag::Url => {
            let text = coerce_text(value, schema)?;
            validate_url(text, schema)
        }
        TypeTag::Date => {
            let text = coerce_text(value, schema)?;
            validate_date(text, schema)
        }
        TypeTag::SchemaRef => {
            let text = coerce_text(value, schema)?;
            let empty = matches!(text.as_str(), Some("") | None);
            if empty {
                Err(mismatch(&text, schema))
            } else {
                Ok(text)
            }
        }
    }
}

fn coerce_integer(value: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    match value {
        Value::Integer(_) => Ok(value),
        // Lossless only: a fractional float has no unambiguous integer form.
        Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(Value::Integer(f as i64))
        }
        Value::Text(ref s) => match s.trim().parse::<i64>() {
            Ok(n) => Ok(Value::Integer(n)),
            Err(_) => Err(mismatch(&value, schema)),
        },
        _ => Err(mismatch(&value, schema)),
    }
}

fn coerce_float(value: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    match value {
        Value::Float(_) => Ok(value),
        Value::Integer(n) => Ok(Value::Float(n as f64)),
        Value::Text(ref s) => match s.trim().parse::<f64>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => Err(mismatch(&value, schema)),
        },
        _ => Err(mismatch(&value, schema)),
    }
}

fn coerce_boolean(value: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    match value {
        Value::Bool(_) => Ok(value),
        Value::Text(ref s) => match s.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch(&value, schema)),
        },
        _ => Err(mismatch(&value, schema)),
    }
}

fn coerce_text(value: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    match value {
        Value::Text(_) => Ok(value),
        Value::Integer(n) => Ok(Value::Text(n.to_string())),
        Value::Float(f) => Ok(Value::Text(f.to_string())),
        Value::Bool(b) => Ok(Value::Text(b.to_string())),
        _ => Err(mismatch(&value, schema)),
    }
}

fn validate_url(text: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    let valid = text
        .as_str()
        .and_then(|s| url::Url::parse(s).ok())
        .is_some_and(|parsed| parsed.has_host());
    if valid {
        Ok(text)
    } else {
        Err(TypeError {
            expected: schema.kind,
            actual: format!(
                "text '{}' (not a scheme+host url)",
                text.as_str().unwrap_or_default()
            ),
            port: schema.name.clone(),
        })
    }
}

fn validate_date(text: Value, schema: &PortSchema) -> Result<Value, TypeError> {
    let valid = text.as_str().is_some_and(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            || DateTime::parse_from_rfc3339(s).is_ok()
    });
    if valid {
        Ok(text)
    } else {
        Err(TypeError {
            expected: schema.kind,
            actual: format!(
                "text '{}' (not an ISO-8601 date)",
                text.as_str().unwrap_or_default()
            ),
            port: schema.name.clone(),
        })
    }
}

fn mismatch(value: &Value, schema: &PortSchema) -> TypeError {
    TypeError {
        expected: schema.kind,
        actual: value.kind_name().to_string(),
        port: schema.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(kind: TypeTag) -> PortSchema {
        PortSchema::required("p", kind)
    }

    #[test]
    fn matching_kind_passes_through() {
        let v = coerce(Value::Integer(4), &port(TypeTag::Integer)).unwrap();
        assert_eq!(v, Value::Integer(4));
    }

    #[test]
    fn numeric_string_coerces_to_integer() {
        let v = coerce(Value::Text("4".to_string()), &port(TypeTag::Integer)).unwrap();
        assert_eq!(v, Value::Integer(4));
    }

    #[test]
    fn non_numeric_string_fails_integer() {
        let err = coerce(Value::Text("four".to_string()), &port(TypeTag::Integer)).unwrap_err();
        assert_eq!(err.expected, TypeTag::Integer);
        assert_eq!(err.port, "p");
    }

    #[test]
    fn fractional_float_is_lossy_for_integer() {
        assert!(coerce(Value::Float(4.5), &port(TypeTag::Integer)).is_err());
        assert_eq!(
            coerce(Value::Float(4.0), &port(TypeTag::Integer)).unwrap(),
            Value::Integer(4)
        );
    }

    #[test]
    fn integer_widens_to_float() {
        assert_eq!(
            coerce(Value::Integer(2), &port(TypeTag::Float)).unwrap(),
            Value::Float(2.0)
        );
    }

    #[test]
    fn text_kind_keeps_numeric_strings_as_text() {
        // declared kind text means "3" stays "3", never becomes 3
        let v = coerce(Value::Text("3".to_string()), &port(TypeTag::ShortText)).unwrap();
        assert_eq!(v, Value::Text("3".to_string()));
    }

    #[test]
    fn number_renders_to_text() {
        assert_eq!(
            coerce(Value::Integer(34), &port(TypeTag::LongText)).unwrap(),
            Value::Text("34".to_string())
        );
    }

    #[test]
    fn boolean_from_text_is_strict() {
        assert_eq!(
            coerce(Value::Text("true".to_string()), &port(TypeTag::Boolean)).unwrap(),
            Value::Bool(true)
        );
        assert!(coerce(Value::Text("yes".to_string()), &port(TypeTag::Boolean)).is_err());
    }

    #[test]
    fn url_requires_scheme_and_host() {
        assert!(coerce(
            Value::Text("https://example.com/x".to_string()),
            &port(TypeTag::Url)
        )
        .is_ok());
        assert!(coerce(Value::Text("not a url".to_string()), &port(TypeTag::Url)).is_err());
        // scheme without host
        assert!(coerce(Value::Text("mailto:x@y".to_string()), &port(TypeTag::Url)).is_err());
    }

    #[test]
    fn date_accepts_iso_profiles_only() {
        assert!(coerce(Value::Text("2024-02-29".to_string()), &port(TypeTag::Date)).is_ok());
        assert!(coerce(
            Value::Text("2024-02-29T12:00:00Z".to_string()),
            &port(TypeTag::Date)
        )
        .is_ok());
        assert!(coerce(Value::Text("02/29/2024".to_string()), &port(TypeTag::Date)).is_err());
    }

    #[test]
    fn passthrough_never_touches_the_value() {
        let v = Value::Array(vec![Value::Null, Value::Bool(true)]);
        assert_eq!(coerce(v.clone(), &port(TypeTag::Passthrough)).unwrap(), v);
    }
}
