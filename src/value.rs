//! Raw survey responses and the special codes used across the questionnaire.
use crate::ArcStr;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// "Unable to recall", used by the utilization questions.
pub const UNABLE_TO_RECALL: i64 = 666;
/// "Refused to answer".
pub const REFUSED: i64 = 777;
/// "Don't know".
pub const DONT_KNOW: i64 = 888;
/// "Not applicable".
pub const NOT_APPLICABLE: i64 = 999;

pub const SENTINELS: [i64; 4] = [UNABLE_TO_RECALL, REFUSED, DONT_KNOW, NOT_APPLICABLE];

pub fn is_sentinel(code: i64) -> bool {
    SENTINELS.contains(&code)
}

/// A single cell from the survey dataset.
///
/// Spreadsheets store whole numbers as floats, so integral floats are normalized to `Int` on the
/// way in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Missing,
    Int(i64),
    Float(f64),
    Text(ArcStr),
}

impl Value {
    /// Parse a cell from its text form. Never fails: anything unrecognised is kept as text.
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("nan") {
            Value::Missing
        } else if let Ok(v) = s.parse::<i64>() {
            Value::Int(v)
        } else if let Ok(v) = s.parse::<f64>() {
            Value::from(v)
        } else {
            Value::Text(s.into())
        }
    }

    /// Coerce to an integer code, treating anything unusable as missing.
    ///
    /// Fractional numbers are truncated toward zero.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Missing => None,
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Value::Float(_) => None,
            Value::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Like `as_int`, but only for values that are exactly an integer.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Missing => None,
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Missing
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        if !v.is_finite() {
            Value::Missing
        } else if v.fract() == 0. && v.abs() < 9.0e15 {
            Value::Int(v as i64)
        } else {
            Value::Float(v)
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::parse(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Missing => f.write_str("Missing"),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> de::Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a survey response")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::parse(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Text(if v { "true" } else { "false" }.into()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                i64::try_from(v)
                    .map(Value::Int)
                    .map_err(|_| E::custom("integer out of range"))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::from(v))
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Missing)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Missing)
            }
        }

        d.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod test {
    use super::{is_sentinel, Value};

    #[test]
    fn parse_cells() {
        assert_eq!(Value::parse(""), Value::Missing);
        assert_eq!(Value::parse(" null "), Value::Missing);
        assert_eq!(Value::parse("NaN"), Value::Missing);
        assert_eq!(Value::parse("12"), Value::Int(12));
        assert_eq!(Value::parse("3.0"), Value::Int(3));
        assert_eq!(Value::parse("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse("yes"), Value::Text("yes".into()));
    }

    #[test]
    fn coercion_never_fails() {
        assert_eq!(Value::Missing.as_int(), None);
        assert_eq!(Value::Float(2.9).as_int(), Some(2));
        assert_eq!(Value::Float(-2.9).as_int(), Some(-2));
        assert_eq!(Value::Float(f64::NAN).as_int(), None);
        assert_eq!(Value::Text("abc".into()).as_int(), None);
        assert_eq!(Value::Text(" 7 ".into()).as_int(), Some(7));
        assert_eq!(Value::Float(2.9).as_code(), None);
    }

    #[test]
    fn sentinels() {
        for code in [666, 777, 888, 999] {
            assert!(is_sentinel(code));
        }
        assert!(!is_sentinel(0));
        assert!(!is_sentinel(2));
    }
}
