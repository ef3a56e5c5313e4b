use serde::de::value::StrDeserializer;
use serde::de::{
    DeserializeOwned, DeserializeSeed, IntoDeserializer, MapAccess, SeqAccess, Visitor,
};
use serde::{forward_to_deserialize_any, Deserializer};

use super::parse::ValueDeserializer;
use super::{BeanError, BeanRead};

/// Builds a bean from the properties exposed by `access`.
///
/// Every field of `T` is looked up by name. Fields with no stored values are
/// reported missing to serde, so they must be `Option`s or carry a
/// `#[serde(default)]`. Sequence fields collect all values of their property.
pub fn from_access<T, A>(access: &A) -> Result<T, BeanError>
where
    T: DeserializeOwned,
    A: BeanRead + ?Sized,
{
    T::deserialize(BeanDeserializer { access })
}

struct BeanDeserializer<'a, A: ?Sized> {
    access: &'a A,
}

impl<'de, A: BeanRead + ?Sized> Deserializer<'de> for BeanDeserializer<'_, A> {
    type Error = BeanError;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BeanError> {
        Err(BeanError::Unsupported("beans must be structs with named fields"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        visitor.visit_map(Fields {
            access: self.access,
            fields: fields.iter(),
            current: None,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

/// Walks the declared fields of a struct, skipping the ones with no values.
struct Fields<'a, A: ?Sized> {
    access: &'a A,
    fields: std::slice::Iter<'static, &'static str>,
    current: Option<&'static str>,
}

impl<'de, A: BeanRead + ?Sized> MapAccess<'de> for Fields<'_, A> {
    type Error = BeanError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, BeanError> {
        for &field in self.fields.by_ref() {
            if self.access.prop_length(field) > 0 {
                self.current = Some(field);
                let key: StrDeserializer<'_, BeanError> = field.into_deserializer();
                return seed.deserialize(key).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, BeanError> {
        let name = self
            .current
            .take()
            .ok_or_else(|| BeanError::Message("value requested before key".to_string()))?;
        seed.deserialize(PropertyDeserializer {
            access: self.access,
            name,
        })
    }
}

/// Deserializes one property: sequences read every value, scalars read the last.
struct PropertyDeserializer<'a, A: ?Sized> {
    access: &'a A,
    name: &'static str,
}

impl<A: BeanRead + ?Sized> PropertyDeserializer<'_, A> {
    fn value(&self) -> Result<String, BeanError> {
        self.access
            .prop_get(self.name)
            .ok_or_else(|| BeanError::NullValue(self.name.to_string()))
    }
}

macro_rules! forward_to_value {
    ($($method:ident)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
                let value = self.value()?;
                ValueDeserializer::new(Some(value.as_str())).$method(visitor)
            }
        )*
    };
}

impl<'de, A: BeanRead + ?Sized> Deserializer<'de> for PropertyDeserializer<'_, A> {
    type Error = BeanError;

    forward_to_value! {
        deserialize_any deserialize_bool deserialize_char deserialize_str deserialize_string
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64 deserialize_identifier deserialize_ignored_any
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        if self.access.prop_get(self.name).is_none() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
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
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        let value = self.value()?;
        ValueDeserializer::new(Some(value.as_str())).deserialize_enum(name, variants, visitor)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, BeanError> {
        visitor.visit_seq(Values {
            access: self.access,
            name: self.name,
            index: 0,
            len: self.access.prop_length(self.name),
        })
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, BeanError> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BeanError> {
        Err(BeanError::Unsupported("byte fields"))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BeanError> {
        Err(BeanError::Unsupported("byte fields"))
    }

    fn deserialize_map<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, BeanError> {
        Err(BeanError::Unsupported("nested maps"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, BeanError> {
        Err(BeanError::Unsupported("nested structs"))
    }
}

/// Every value of a multi-valued property, in index order.
struct Values<'a, A: ?Sized> {
    access: &'a A,
    name: &'static str,
    index: usize,
    len: usize,
}

impl<'de, A: BeanRead + ?Sized> SeqAccess<'de> for Values<'_, A> {
    type Error = BeanError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, BeanError> {
        if self.index >= self.len {
            return Ok(None);
        }
        let value = self.access.prop_get_at(self.name, self.index);
        self.index += 1;
        seed.deserialize(ValueDeserializer::new(value.as_deref()))
            .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.len - self.index)
    }
}
