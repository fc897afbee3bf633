//! Closed set of value kinds a mapped field can hold.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

/// Semantic type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Raw text, stored verbatim.
    Text,
    /// `"1"` or case-insensitive `"true"`; everything else is `false`.
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Fixed-point decimal.
    Decimal,
    /// Calendar date and wall-clock time without a zone.
    DateTime,
}

/// Value kind of a field together with whether the field is optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldKind {
    pub value: ValueKind,
    /// `Option<T>` fields start out absent and become `Some` on a
    /// successful coercion.
    pub nullable: bool,
}

impl FieldKind {
    pub const fn required(value: ValueKind) -> Self {
        FieldKind {
            value,
            nullable: false,
        }
    }

    pub const fn nullable(value: ValueKind) -> Self {
        FieldKind {
            value,
            nullable: true,
        }
    }
}

/// Typed result of a successful coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    DateTime(NaiveDateTime),
}

/// Rust types that can back a mapped field.
///
/// Implemented for `String`, `bool`, the integer and float primitives,
/// [`Decimal`], [`NaiveDateTime`], and `Option<T>` of the numeric and
/// date-time types.
pub trait XmlValue {
    const KIND: FieldKind;

    /// Overwrite `self` with `value`. Returns `false` and leaves `self`
    /// untouched when the value is of a different kind.
    fn store(&mut self, value: Value) -> bool;
}

/// Object-safe view of a record field, handed out by
/// [`XmlRecord::field_mut`](crate::XmlRecord::field_mut).
pub trait FieldSlot {
    fn field_kind(&self) -> FieldKind;
    fn assign(&mut self, value: Value) -> bool;
}

impl<T: XmlValue> FieldSlot for T {
    fn field_kind(&self) -> FieldKind {
        T::KIND
    }

    fn assign(&mut self, value: Value) -> bool {
        self.store(value)
    }
}

macro_rules! xml_value {
    ($ty:ty, $kind:ident) => {
        impl XmlValue for $ty {
            const KIND: FieldKind = FieldKind::required(ValueKind::$kind);

            fn store(&mut self, value: Value) -> bool {
                match value {
                    Value::$kind(value) => {
                        *self = value;
                        true
                    }
                    _ => false,
                }
            }
        }
    };
    ($ty:ty, $kind:ident, nullable) => {
        xml_value!($ty, $kind);

        impl XmlValue for Option<$ty> {
            const KIND: FieldKind = FieldKind::nullable(ValueKind::$kind);

            fn store(&mut self, value: Value) -> bool {
                match value {
                    Value::$kind(value) => {
                        *self = Some(value);
                        true
                    }
                    _ => false,
                }
            }
        }
    };
}

xml_value!(String, Text);
xml_value!(bool, Bool);
xml_value!(i8, I8, nullable);
xml_value!(i16, I16, nullable);
xml_value!(i32, I32, nullable);
xml_value!(i64, I64, nullable);
xml_value!(u8, U8, nullable);
xml_value!(u16, U16, nullable);
xml_value!(u32, U32, nullable);
xml_value!(u64, U64, nullable);
xml_value!(f32, F32, nullable);
xml_value!(f64, F64, nullable);
xml_value!(Decimal, Decimal, nullable);
xml_value!(NaiveDateTime, DateTime, nullable);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_rust_type() {
        assert_eq!(<i32 as XmlValue>::KIND, FieldKind::required(ValueKind::I32));
        assert_eq!(
            <Option<NaiveDateTime> as XmlValue>::KIND,
            FieldKind::nullable(ValueKind::DateTime)
        );
        assert_eq!(<String as XmlValue>::KIND.value, ValueKind::Text);
    }

    #[test]
    fn slots_reject_mismatched_values() {
        let mut count = 7u16;
        let slot: &mut dyn FieldSlot = &mut count;
        assert!(!slot.assign(Value::I32(3)));
        assert!(slot.assign(Value::U16(3)));
        assert_eq!(count, 3);

        let mut price: Option<f64> = None;
        let slot: &mut dyn FieldSlot = &mut price;
        assert!(slot.field_kind().nullable);
        assert!(slot.assign(Value::F64(2.5)));
        assert_eq!(price, Some(2.5));
    }
}
