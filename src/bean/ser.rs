use serde::ser::{
    Impossible, Serialize, SerializeSeq, SerializeStruct, SerializeTuple, SerializeTupleStruct,
    Serializer,
};

use super::{BeanAccess, BeanError};

/// Writes every field of `bean` into `access`.
///
/// Scalar fields replace the last value of their property. Sequence fields
/// replace the property's whole value list. Fields that serialize as `None`
/// leave the store untouched.
pub fn into_access<T, A>(bean: &T, access: &mut A) -> Result<(), BeanError>
where
    T: Serialize + ?Sized,
    A: BeanAccess + ?Sized,
{
    bean.serialize(BeanSerializer { access })
}

/// What a single field turned into.
enum Property {
    Skip,
    Value(Option<String>),
    List(Vec<Option<String>>),
}

struct BeanSerializer<'a, A: ?Sized> {
    access: &'a mut A,
}

fn not_a_struct<T>() -> Result<T, BeanError> {
    Err(BeanError::Unsupported("beans must be structs with named fields"))
}

impl<'a, A: BeanAccess + ?Sized> Serializer for BeanSerializer<'a, A> {
    type Ok = ();
    type Error = BeanError;
    type SerializeSeq = Impossible<(), BeanError>;
    type SerializeTuple = Impossible<(), BeanError>;
    type SerializeTupleStruct = Impossible<(), BeanError>;
    type SerializeTupleVariant = Impossible<(), BeanError>;
    type SerializeMap = Impossible<(), BeanError>;
    type SerializeStruct = FieldWriter<'a, A>;
    type SerializeStructVariant = Impossible<(), BeanError>;

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, BeanError> {
        Ok(FieldWriter {
            access: self.access,
        })
    }

    fn serialize_bool(self, _v: bool) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_i8(self, _v: i8) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_i16(self, _v: i16) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_i32(self, _v: i32) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_i64(self, _v: i64) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_u8(self, _v: u8) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_u16(self, _v: u16) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_u32(self, _v: u32) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_u64(self, _v: u64) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_f32(self, _v: f32) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_f64(self, _v: f64) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_char(self, _v: char) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_str(self, _v: &str) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_none(self) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), BeanError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), BeanError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), BeanError> {
        not_a_struct()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, BeanError> {
        not_a_struct()
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, BeanError> {
        not_a_struct()
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, BeanError> {
        not_a_struct()
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, BeanError> {
        not_a_struct()
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BeanError> {
        not_a_struct()
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, BeanError> {
        not_a_struct()
    }
}

struct FieldWriter<'a, A: ?Sized> {
    access: &'a mut A,
}

impl<A: BeanAccess + ?Sized> SerializeStruct for FieldWriter<'_, A> {
    type Ok = ();
    type Error = BeanError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), BeanError> {
        match value.serialize(PropertySerializer { in_list: false })? {
            Property::Skip => {}
            Property::Value(value) => {
                self.access.prop_set(key, value);
            }
            Property::List(values) => {
                self.access.prop_del(key);
                for value in values {
                    self.access.prop_add(key, value);
                }
            }
        }
        Ok(())
    }

    fn end(self) -> Result<(), BeanError> {
        Ok(())
    }
}

/// Turns one field value into its textual property form.
#[derive(Clone, Copy)]
struct PropertySerializer {
    in_list: bool,
}

impl PropertySerializer {
    fn text(self, value: impl ToString) -> Result<Property, BeanError> {
        Ok(Property::Value(Some(value.to_string())))
    }
}

impl Serializer for PropertySerializer {
    type Ok = Property;
    type Error = BeanError;
    type SerializeSeq = ListCollector;
    type SerializeTuple = ListCollector;
    type SerializeTupleStruct = ListCollector;
    type SerializeTupleVariant = Impossible<Property, BeanError>;
    type SerializeMap = Impossible<Property, BeanError>;
    type SerializeStruct = Impossible<Property, BeanError>;
    type SerializeStructVariant = Impossible<Property, BeanError>;

    fn serialize_bool(self, v: bool) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_i8(self, v: i8) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_i16(self, v: i16) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_i32(self, v: i32) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_i64(self, v: i64) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_i128(self, v: i128) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_u8(self, v: u8) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_u16(self, v: u16) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_u32(self, v: u32) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_u64(self, v: u64) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_u128(self, v: u128) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_f32(self, v: f32) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_f64(self, v: f64) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_char(self, v: char) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_str(self, v: &str) -> Result<Property, BeanError> {
        self.text(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Property, BeanError> {
        Err(BeanError::Unsupported("byte fields"))
    }

    fn serialize_none(self) -> Result<Property, BeanError> {
        if self.in_list {
            Ok(Property::Value(None))
        } else {
            Ok(Property::Skip)
        }
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Property, BeanError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Property, BeanError> {
        self.serialize_none()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Property, BeanError> {
        self.serialize_none()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Property, BeanError> {
        self.text(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Property, BeanError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Property, BeanError> {
        Err(BeanError::Unsupported("enum variants with data"))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<ListCollector, BeanError> {
        if self.in_list {
            return Err(BeanError::Unsupported("nested sequences"));
        }
        Ok(ListCollector {
            values: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<ListCollector, BeanError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<ListCollector, BeanError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, BeanError> {
        Err(BeanError::Unsupported("enum variants with data"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, BeanError> {
        Err(BeanError::Unsupported("nested maps"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, BeanError> {
        Err(BeanError::Unsupported("nested structs"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, BeanError> {
        Err(BeanError::Unsupported("enum variants with data"))
    }
}

struct ListCollector {
    values: Vec<Option<String>>,
}

impl ListCollector {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BeanError> {
        match value.serialize(PropertySerializer { in_list: true })? {
            Property::Value(value) => self.values.push(value),
            Property::Skip | Property::List(_) => {
                return Err(BeanError::Unsupported("nested sequences"));
            }
        }
        Ok(())
    }
}

impl SerializeSeq for ListCollector {
    type Ok = Property;
    type Error = BeanError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BeanError> {
        self.push(value)
    }

    fn end(self) -> Result<Property, BeanError> {
        Ok(Property::List(self.values))
    }
}

impl SerializeTuple for ListCollector {
    type Ok = Property;
    type Error = BeanError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BeanError> {
        self.push(value)
    }

    fn end(self) -> Result<Property, BeanError> {
        Ok(Property::List(self.values))
    }
}

impl SerializeTupleStruct for ListCollector {
    type Ok = Property;
    type Error = BeanError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BeanError> {
        self.push(value)
    }

    fn end(self) -> Result<Property, BeanError> {
        Ok(Property::List(self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multimap::MultiMap;
    use crate::BeanRead;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Kind {
        Dwarf,
    }

    #[derive(Serialize)]
    struct Dwarf {
        age: u32,
        weight: f32,
        kind: Kind,
        fortune_number: Vec<i32>,
        home_page: Option<String>,
    }

    fn doc() -> Dwarf {
        Dwarf {
            age: 63,
            weight: 49.5,
            kind: Kind::Dwarf,
            fortune_number: vec![11, 33, 55],
            home_page: None,
        }
    }

    #[test]
    fn test_into_access_writes_fields() {
        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        into_access(&doc(), &mut map).unwrap();

        assert_eq!(map.prop_get("age").as_deref(), Some("63"));
        assert_eq!(map.prop_get("weight").as_deref(), Some("49.5"));
        assert_eq!(map.prop_get("kind").as_deref(), Some("dwarf"));
        assert_eq!(map.prop_length("fortune_number"), 3);
        assert_eq!(map.prop_get_at("fortune_number", 1).as_deref(), Some("33"));
        assert!(!map.contains_key("home_page"));
    }

    #[test]
    fn test_scalar_replaces_last_and_list_replaces_all() {
        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        map.prop_add("age", Some("1".into()));
        map.prop_add("age", Some("2".into()));
        map.prop_add("fortune_number", Some("7".into()));

        into_access(&doc(), &mut map).unwrap();
        into_access(&doc(), &mut map).unwrap();

        assert_eq!(map.get_all("age").map(<[_]>::len), Some(2));
        assert_eq!(map.prop_get_at("age", 0).as_deref(), Some("1"));
        assert_eq!(map.prop_get("age").as_deref(), Some("63"));
        assert_eq!(map.prop_length("fortune_number"), 3);
    }

    #[test]
    fn test_list_keeps_null_elements() {
        #[derive(Serialize)]
        struct Sparse {
            slots: Vec<Option<u8>>,
        }

        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        into_access(&Sparse { slots: vec![Some(1), None] }, &mut map).unwrap();
        assert_eq!(map.prop_length("slots"), 2);
        assert_eq!(map.prop_get_at("slots", 1), None);
    }

    #[test]
    fn test_non_struct_and_nested_rejected() {
        #[derive(Serialize)]
        struct Outer {
            inner: Inner,
        }
        #[derive(Serialize)]
        struct Inner {
            x: u8,
        }

        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        assert!(matches!(
            into_access(&5u8, &mut map),
            Err(BeanError::Unsupported(_))
        ));
        assert!(matches!(
            into_access(&Outer { inner: Inner { x: 1 } }, &mut map),
            Err(BeanError::Unsupported("nested structs"))
        ));
    }
}
