//! Raw text → typed value conversion.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::datetime;
use crate::value::{Value, ValueKind};

/// A coercion that did not produce a value. The target field keeps
/// whatever it held before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip;

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value skipped")
    }
}

/// Convert `raw` into a value of `kind`.
///
/// Text and booleans always succeed. Numbers and date-times yield [`Skip`]
/// when the text does not parse; a non-empty `format` switches date-times
/// to exact pattern matching and is ignored by every other kind.
pub fn coerce(raw: &str, kind: ValueKind, format: Option<&str>) -> Result<Value, Skip> {
    match kind {
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
        ValueKind::Bool => Ok(Value::Bool(parse_bool(raw))),
        ValueKind::I8 => parse_integer(raw).map(Value::I8),
        ValueKind::I16 => parse_integer(raw).map(Value::I16),
        ValueKind::I32 => parse_integer(raw).map(Value::I32),
        ValueKind::I64 => parse_integer(raw).map(Value::I64),
        ValueKind::U8 => parse_integer(raw).map(Value::U8),
        ValueKind::U16 => parse_integer(raw).map(Value::U16),
        ValueKind::U32 => parse_integer(raw).map(Value::U32),
        ValueKind::U64 => parse_integer(raw).map(Value::U64),
        ValueKind::F32 => parse_float(raw).map(Value::F32),
        ValueKind::F64 => parse_float(raw).map(Value::F64),
        ValueKind::Decimal => parse_decimal(raw).map(Value::Decimal),
        ValueKind::DateTime => {
            let parsed = match format.filter(|pattern| !pattern.is_empty()) {
                Some(pattern) => datetime::parse_exact(raw, pattern),
                None => datetime::parse_general(raw),
            };
            parsed.map(Value::DateTime).ok_or(Skip)
        }
    }
}

fn parse_bool(raw: &str) -> bool {
    raw == "1" || raw.eq_ignore_ascii_case("true")
}

fn parse_integer<T: FromStr>(raw: &str) -> Result<T, Skip> {
    trim_number(raw).parse().map_err(|_| Skip)
}

fn parse_float<T: FromStr>(raw: &str) -> Result<T, Skip> {
    let text = strip_group_separators(trim_number(raw)).ok_or(Skip)?;
    text.parse().map_err(|_| Skip)
}

fn parse_decimal(raw: &str) -> Result<Decimal, Skip> {
    let text = strip_group_separators(trim_number(raw)).ok_or(Skip)?;
    if text.is_empty() {
        return Err(Skip);
    }
    Decimal::from_str(&text).map_err(|_| Skip)
}

fn trim_number(raw: &str) -> &str {
    raw.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0b}' | '\u{0c}'))
}

/// Drop `,` group separators from the integral part. Separators after the
/// decimal point or in the exponent make the number invalid.
fn strip_group_separators(text: &str) -> Option<Cow<'_, str>> {
    if !text.contains(',') {
        return Some(Cow::Borrowed(text));
    }
    let integral_end = text
        .find(|c| matches!(c, '.' | 'e' | 'E'))
        .unwrap_or(text.len());
    let (integral, rest) = text.split_at(integral_end);
    if rest.contains(',') {
        return None;
    }
    let digits = integral.trim_start_matches(&['+', '-'][..]);
    if digits.starts_with(',') {
        return None;
    }
    Some(Cow::Owned(format!("{}{rest}", integral.replace(',', ""))))
}
