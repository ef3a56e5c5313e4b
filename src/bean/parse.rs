//! String-to-type parsing for option values.
//!
//! A stored option is always text. [`ValueDeserializer`] lets serde pull any
//! scalar type out of that text: the requested type decides how the string
//! is read, and untyped targets get the most specific scalar that fits.

use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer, Visitor};
use serde::{forward_to_deserialize_any, Deserializer};
use toml::Value;

use super::BeanError;

/// Parses a raw option value into `T`.
pub fn parse<T: DeserializeOwned>(raw: &str) -> Result<T, BeanError> {
    T::deserialize(ValueDeserializer::new(Some(raw)))
}

/// Parses an optional raw value; absence stays absent.
pub fn parse_optional<T: DeserializeOwned>(raw: Option<&str>) -> Result<Option<T>, BeanError> {
    raw.map(parse::<T>).transpose()
}

/// Deserializer over a single, possibly null, option value.
#[derive(Debug, Clone, Copy)]
pub struct ValueDeserializer<'a> {
    raw: Option<&'a str>,
}

impl<'a> ValueDeserializer<'a> {
    pub fn new(raw: Option<&'a str>) -> Self {
        Self { raw }
    }
}

macro_rules! parse_scalar {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
                let Some(raw) = self.raw else {
                    return visitor.visit_none();
                };
                let parsed = raw
                    .parse::<$ty>()
                    .map_err(|_| BeanError::parse(raw, stringify!($ty)))?;
                visitor.$visit(parsed)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ValueDeserializer<'_> {
    type Error = BeanError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        match self.raw {
            None => visitor.visit_none(),
            Some(raw) => coerce_value(raw)
                .deserialize_any(visitor)
                .map_err(|e| BeanError::Message(e.to_string())),
        }
    }

    parse_scalar! {
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        let Some(raw) = self.raw else {
            return visitor.visit_none();
        };
        if raw.eq_ignore_ascii_case("true") {
            visitor.visit_bool(true)
        } else if raw.eq_ignore_ascii_case("false") {
            visitor.visit_bool(false)
        } else {
            Err(BeanError::parse(raw, "bool"))
        }
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        let Some(raw) = self.raw else {
            return visitor.visit_none();
        };
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(BeanError::parse(raw, "char")),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        match self.raw {
            Some(raw) => visitor.visit_str(raw),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        match self.raw {
            Some(_) => visitor.visit_some(self),
            None => visitor.visit_none(),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        visitor.visit_unit()
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        let Some(raw) = self.raw else {
            return visitor.visit_none();
        };
        let variant: StrDeserializer<'_, BeanError> = raw.into_deserializer();
        visitor.visit_enum(variant)
    }

    forward_to_deserialize_any! {
        bytes byte_buf seq tuple tuple_struct map struct identifier ignored_any
    }
}

/// Reads an untyped value as the most specific scalar: boolean, integer,
/// float, or string as the fallback.
fn coerce_value(s: &str) -> Value {
    if s.eq_ignore_ascii_case("true") {
        return Value::Boolean(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Value::Boolean(false);
    }

    if looks_like_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::Integer(i);
        }
    }

    if s.contains('.') {
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }

    Value::String(s.to_string())
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Color {
        Red,
        Green,
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Port(u16);

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse::<i32>("63").unwrap(), 63);
        assert_eq!(parse::<f32>("49.5").unwrap(), 49.5);
        assert_eq!(parse::<u64>("-1").ok(), None);
    }

    #[test]
    fn test_parse_failure_names_target() {
        let err = parse::<u16>("eighty").unwrap_err();
        assert!(matches!(
            err,
            BeanError::Parse { ref value, target: "u16" } if value == "eighty"
        ));
    }

    #[test]
    fn test_parse_bool_case_insensitive() {
        assert!(parse::<bool>("TRUE").unwrap());
        assert!(!parse::<bool>("false").unwrap());
        assert!(parse::<bool>("yes").is_err());
    }

    #[test]
    fn test_parse_char_requires_single() {
        assert_eq!(parse::<char>("x").unwrap(), 'x');
        assert!(parse::<char>("xy").is_err());
    }

    #[test]
    fn test_parse_string_keeps_text() {
        assert_eq!(parse::<String>("0042").unwrap(), "0042");
    }

    #[test]
    fn test_parse_enum_and_newtype() {
        assert_eq!(parse::<Color>("green").unwrap(), Color::Green);
        assert!(parse::<Color>("blue").is_err());
        assert_eq!(parse::<Port>("8080").unwrap(), Port(8080));
    }

    #[test]
    fn test_parse_optional() {
        assert_eq!(parse_optional::<i32>(None).unwrap(), None);
        assert_eq!(parse_optional::<i32>(Some("7")).unwrap(), Some(7));
    }

    #[test]
    fn test_untyped_coercion() {
        assert_eq!(coerce_value("12"), Value::Integer(12));
        assert_eq!(coerce_value("1.5"), Value::Float(1.5));
        assert_eq!(coerce_value("True"), Value::Boolean(true));
        assert_eq!(coerce_value("1.2.3"), Value::String("1.2.3".into()));
    }
}
