//! Scalar field values, coercions and value snapshots

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Opaque side-channel data handed to every validator
pub type Externals = Map<String, Value>;

/// Transforms raw input into a typed value. Chains run right-to-left.
pub type Parser = Box<dyn Fn(ScalarValue) -> ScalarValue + Send + Sync>;

/// Transforms a stored value for display. Chains run left-to-right.
pub type Formatter = Box<dyn Fn(ScalarValue) -> ScalarValue + Send + Sync>;

/// The three scalar kinds a field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Num,
    Bool,
}

impl ValueKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Num => "number",
            Self::Bool => "boolean",
        }
    }

    /// Parser coercing any scalar into this kind
    pub fn default_parser(&self) -> Parser {
        match self {
            Self::Str => Box::new(|v: ScalarValue| ScalarValue::Str(v.coerce_string())),
            Self::Num => Box::new(|v: ScalarValue| ScalarValue::Num(v.coerce_number())),
            Self::Bool => Box::new(|v: ScalarValue| ScalarValue::Bool(v.coerce_bool())),
        }
    }
}

/// A field value: string, number or boolean
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Default for ScalarValue {
    fn default() -> Self {
        ScalarValue::Str(String::new())
    }
}

impl ScalarValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Str(_) => ValueKind::Str,
            Self::Num(_) => ValueKind::Num,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String coercion with JavaScript `String(x)` semantics
    pub fn coerce_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Num(n) => format_number(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    /// Number coercion with JavaScript `Number(x)` semantics
    pub fn coerce_number(&self) -> f64 {
        match self {
            Self::Str(s) => parse_number(s),
            Self::Num(n) => *n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }

    /// Boolean coercion with JavaScript `Boolean(x)` semantics
    pub fn coerce_bool(&self) -> bool {
        match self {
            Self::Str(s) => !s.is_empty(),
            Self::Num(n) => *n != 0.0 && !n.is_nan(),
            Self::Bool(b) => *b,
        }
    }
}

/// Whole numbers serialize as JSON integers, the way `JSON.stringify` writes them
impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Num(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            Self::Num(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coerce_string())
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Str(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::Str(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Num(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Num(f64::from(value))
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl TryFrom<&Value> for ScalarValue {
    type Error = &'static str;

    /// Fails with the JSON type name when the value is not a scalar
    fn try_from(value: &Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(ScalarValue::Str(s.clone())),
            Value::Bool(b) => Ok(ScalarValue::Bool(*b)),
            Value::Number(n) => n.as_f64().map(ScalarValue::Num).ok_or("number"),
            other => Err(json_type_name(other)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    } else if n == f64::INFINITY {
        return "Infinity".to_string();
    } else if n == f64::NEG_INFINITY {
        return "-Infinity".to_string();
    } else if n == 0.0 {
        // -0 prints as 0
        return "0".to_string();
    }

    // Shortest round-trip digits, then Number::toString placement rules
    let sci = format!("{:e}", n.abs());
    let Some((mantissa, exponent)) = sci.split_once('e') else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let len = digits.len() as i32;
    let point = exponent + 1;

    let body = if len <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", exponent.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exponent.abs())
        }
    };

    if n < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}

fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        // Accumulate in f64 so values past u64::MAX still come out finite
        let mut acc = 0.0;
        for c in digits.chars() {
            let Some(digit) = c.to_digit(radix) else {
                return f64::NAN;
            };
            acc = acc * f64::from(radix) + f64::from(digit);
        }
        return acc;
    }

    // Rust accepts "inf" and "nan" spellings that Number() rejects
    if trimmed
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Flat snapshot of field values keyed by dotted path, in declaration order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldValues(IndexMap<String, ScalarValue>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Re-nest dotted names into a JSON object tree.
    ///
    /// `{"postalOffice.address": "x"}` becomes `{"postalOffice": {"address": "x"}}`.
    pub fn to_nested_json(&self) -> Value {
        let mut root = Map::new();
        for (name, value) in &self.0 {
            let json = serde_json::to_value(value).unwrap_or(Value::Null);
            insert_nested(&mut root, name, json);
        }
        Value::Object(root)
    }
}

fn insert_nested(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            match child {
                Value::Object(map) => insert_nested(map, rest, value),
                // A leaf already owns this segment; keep the remaining path flat
                _ => {
                    target.insert(path.to_string(), value);
                }
            }
        }
    }
}

impl FromIterator<(String, ScalarValue)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (String, ScalarValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod coercion {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_number_from_numeric_string() {
            assert_eq!(ScalarValue::from("42").coerce_number(), 42.0);
            assert_eq!(ScalarValue::from("  3.5 ").coerce_number(), 3.5);
            assert_eq!(ScalarValue::from("-1e3").coerce_number(), -1000.0);
        }

        #[test]
        fn test_number_from_empty_string_is_zero() {
            assert_eq!(ScalarValue::from("").coerce_number(), 0.0);
            assert_eq!(ScalarValue::from("   ").coerce_number(), 0.0);
        }

        #[test]
        fn test_number_from_garbage_is_nan() {
            assert!(ScalarValue::from("abc").coerce_number().is_nan());
            assert!(ScalarValue::from("inf").coerce_number().is_nan());
            assert!(ScalarValue::from("nan").coerce_number().is_nan());
            assert!(ScalarValue::from("12px").coerce_number().is_nan());
            assert!(ScalarValue::from("0x").coerce_number().is_nan());
        }

        #[test]
        fn test_number_prefixes_and_infinity() {
            assert_eq!(ScalarValue::from("0x1A").coerce_number(), 26.0);
            assert_eq!(ScalarValue::from("0b101").coerce_number(), 5.0);
            assert_eq!(ScalarValue::from("0o17").coerce_number(), 15.0);
            assert_eq!(ScalarValue::from("Infinity").coerce_number(), f64::INFINITY);
            assert_eq!(
                ScalarValue::from("-Infinity").coerce_number(),
                f64::NEG_INFINITY
            );
        }

        #[test]
        fn test_number_prefix_past_u64_range() {
            assert_eq!(
                ScalarValue::from("0x10000000000000000").coerce_number(),
                18_446_744_073_709_551_616.0
            );
            assert!(ScalarValue::from("0x1G").coerce_number().is_nan());
            assert!(ScalarValue::from("0b102").coerce_number().is_nan());
        }

        #[test]
        fn test_number_trims_byte_order_mark() {
            assert_eq!(ScalarValue::from("\u{feff}5").coerce_number(), 5.0);
            assert_eq!(ScalarValue::from(" 7\u{feff}\n").coerce_number(), 7.0);
        }

        #[test]
        fn test_number_from_bool() {
            assert_eq!(ScalarValue::from(true).coerce_number(), 1.0);
            assert_eq!(ScalarValue::from(false).coerce_number(), 0.0);
        }

        #[test]
        fn test_string_from_number() {
            assert_eq!(ScalarValue::from(42.0).coerce_string(), "42");
            assert_eq!(ScalarValue::from(1.5).coerce_string(), "1.5");
            assert_eq!(ScalarValue::from(-0.0).coerce_string(), "0");
            assert_eq!(ScalarValue::from(f64::NAN).coerce_string(), "NaN");
            assert_eq!(ScalarValue::from(f64::INFINITY).coerce_string(), "Infinity");
            assert_eq!(ScalarValue::from(-130.0).coerce_string(), "-130");
            assert_eq!(ScalarValue::from(0.1 + 0.2).coerce_string(), "0.30000000000000004");
        }

        #[test]
        fn test_string_from_number_uses_exponent_outside_plain_range() {
            assert_eq!(ScalarValue::from(1e21).coerce_string(), "1e+21");
            assert_eq!(ScalarValue::from(1.5e300).coerce_string(), "1.5e+300");
            assert_eq!(ScalarValue::from(-2.5e-7).coerce_string(), "-2.5e-7");
            assert_eq!(ScalarValue::from(1e-7).coerce_string(), "1e-7");
            assert_eq!(ScalarValue::from(1e20).coerce_string(), "100000000000000000000");
            assert_eq!(ScalarValue::from(0.000001).coerce_string(), "0.000001");
            assert_eq!(ScalarValue::from(0.00012).coerce_string(), "0.00012");
        }

        #[test]
        fn test_string_from_bool() {
            assert_eq!(ScalarValue::from(true).coerce_string(), "true");
            assert_eq!(ScalarValue::from(false).to_string(), "false");
        }

        #[test]
        fn test_bool_coercion() {
            assert!(!ScalarValue::from("").coerce_bool());
            assert!(ScalarValue::from("false").coerce_bool());
            assert!(!ScalarValue::from(0.0).coerce_bool());
            assert!(!ScalarValue::from(f64::NAN).coerce_bool());
            assert!(ScalarValue::from(-2.0).coerce_bool());
        }

        #[test]
        fn test_default_parser_follows_kind() {
            let parse = ValueKind::Num.default_parser();
            assert_eq!(parse(ScalarValue::from("42")), ScalarValue::Num(42.0));

            let parse = ValueKind::Str.default_parser();
            assert_eq!(parse(ScalarValue::from(7)), ScalarValue::from("7"));

            let parse = ValueKind::Bool.default_parser();
            assert_eq!(parse(ScalarValue::from("yes")), ScalarValue::Bool(true));
        }
    }

    mod json {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_try_from_json_scalars() {
            assert_eq!(
                ScalarValue::try_from(&json!("x")),
                Ok(ScalarValue::from("x"))
            );
            assert_eq!(ScalarValue::try_from(&json!(3)), Ok(ScalarValue::Num(3.0)));
            assert_eq!(ScalarValue::try_from(&json!(true)), Ok(ScalarValue::Bool(true)));
        }

        #[test]
        fn test_try_from_json_rejects_structures() {
            assert_eq!(ScalarValue::try_from(&json!(null)), Err("null"));
            assert_eq!(ScalarValue::try_from(&json!([1, 2])), Err("array"));
            assert_eq!(ScalarValue::try_from(&json!({"a": 1})), Err("object"));
        }

        #[test]
        fn test_field_values_serialize_flat_in_order() {
            let values: FieldValues = vec![
                ("name".to_string(), ScalarValue::from("abc")),
                ("age".to_string(), ScalarValue::from(3)),
                ("postalOffice.address".to_string(), ScalarValue::from("Main St")),
            ]
            .into_iter()
            .collect();

            let serialized = serde_json::to_string(&values).unwrap();
            assert_eq!(
                serialized,
                r#"{"name":"abc","age":3,"postalOffice.address":"Main St"}"#
            );
        }

        #[test]
        fn test_fractional_and_huge_numbers_stay_floats() {
            let values: FieldValues = vec![
                ("ratio".to_string(), ScalarValue::from(0.5)),
                ("big".to_string(), ScalarValue::from(1e300)),
                ("neg".to_string(), ScalarValue::from(-130.0)),
            ]
            .into_iter()
            .collect();

            assert_eq!(
                serde_json::to_string(&values).unwrap(),
                r#"{"ratio":0.5,"big":1e300,"neg":-130}"#
            );
        }

        #[test]
        fn test_to_nested_json() {
            let values: FieldValues = vec![
                ("name".to_string(), ScalarValue::from("abc")),
                ("postalOffice.address".to_string(), ScalarValue::from("Main St")),
                ("postalOffice.zip".to_string(), ScalarValue::from("12345")),
            ]
            .into_iter()
            .collect();

            assert_eq!(
                values.to_nested_json(),
                json!({
                    "name": "abc",
                    "postalOffice": {"address": "Main St", "zip": "12345"}
                })
            );
        }

        #[test]
        fn test_to_nested_json_keeps_conflicting_path_flat() {
            let values: FieldValues = vec![
                ("a".to_string(), ScalarValue::from(1)),
                ("a.b".to_string(), ScalarValue::from(2)),
            ]
            .into_iter()
            .collect();

            assert_eq!(values.to_nested_json(), json!({"a": 1, "a.b": 2}));
        }
    }
}
