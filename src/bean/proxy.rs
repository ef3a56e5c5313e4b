use serde::de::DeserializeOwned;
use serde::Serialize;

use super::parse::{parse, parse_optional};
use super::{from_access, into_access, BeanAccess, BeanError};
use crate::options::OptionValue;

/// Typed read/write-through view of a property capability.
///
/// Every call goes straight to the underlying store, so values written
/// through the proxy are visible to the store immediately and vice versa.
#[derive(Debug)]
pub struct BeanProxy<A> {
    access: A,
}

impl<A: BeanAccess> BeanProxy<A> {
    pub fn new(access: A) -> Self {
        Self { access }
    }

    /// Reads and parses the last value of `property`.
    pub fn get<T: DeserializeOwned>(&self, property: &str) -> Result<Option<T>, BeanError> {
        parse_optional(self.access.prop_get(property).as_deref())
    }

    pub fn get_at<T: DeserializeOwned>(
        &self,
        property: &str,
        index: usize,
    ) -> Result<Option<T>, BeanError> {
        parse_optional(self.access.prop_get_at(property, index).as_deref())
    }

    /// Reads every value of `property`. Null entries are skipped.
    pub fn get_all<T: DeserializeOwned>(&self, property: &str) -> Result<Vec<T>, BeanError> {
        (0..self.access.prop_length(property))
            .filter_map(|index| self.access.prop_get_at(property, index))
            .map(|value| parse(&value))
            .collect()
    }

    pub fn set(&mut self, property: &str, value: impl OptionValue) -> Option<String> {
        self.access.prop_set(property, value.into_option_value())
    }

    pub fn set_at(&mut self, property: &str, index: usize, value: impl OptionValue) -> Option<String> {
        self.access
            .prop_set_at(property, index, value.into_option_value())
    }

    pub fn add(&mut self, property: &str, value: impl OptionValue) {
        self.access.prop_add(property, value.into_option_value());
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.access.prop_del(property)
    }

    pub fn length(&self, property: &str) -> usize {
        self.access.prop_length(property)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.length(property) > 0
    }

    /// Builds a whole bean from the proxied properties.
    pub fn load<T: DeserializeOwned>(&self) -> Result<T, BeanError> {
        from_access(&self.access)
    }

    /// Writes a whole bean through the proxy.
    pub fn store<T: Serialize + ?Sized>(&mut self, bean: &T) -> Result<(), BeanError> {
        into_access(bean, &mut self.access)
    }

    pub fn into_inner(self) -> A {
        self.access
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multimap::MultiMap;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Dwarf {
        age: u32,
        #[serde(default)]
        fortune_number: Vec<i32>,
    }

    #[test]
    fn test_typed_read_write_through() {
        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        let mut proxy = BeanProxy::new(&mut map);

        assert_eq!(proxy.get::<u32>("age").unwrap(), None);
        assert_eq!(proxy.set("age", 63), None);
        assert_eq!(proxy.get::<u32>("age").unwrap(), Some(63));
        proxy.add("fortune_number", 11);
        proxy.add("fortune_number", 33);
        assert_eq!(proxy.get_at::<i32>("fortune_number", 1).unwrap(), Some(33));
        assert_eq!(proxy.get_all::<i32>("fortune_number").unwrap(), vec![11, 33]);
        assert_eq!(proxy.set_at("fortune_number", 0, 7).as_deref(), Some("11"));
        assert!(proxy.contains("fortune_number"));

        assert_eq!(map.get("age"), Some(&Some("63".to_string())));
    }

    #[test]
    fn test_parse_failure_surfaces() {
        let mut map: MultiMap<String, Option<String>> = MultiMap::new();
        let mut proxy = BeanProxy::new(&mut map);
        proxy.set("age", "old");
        assert!(matches!(
            proxy.get::<u32>("age"),
            Err(BeanError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_and_store_whole_bean() {
        let mut proxy = BeanProxy::new(MultiMap::<String, Option<String>>::new());
        let bean = Dwarf {
            age: 99,
            fortune_number: vec![1, 2],
        };
        proxy.store(&bean).unwrap();
        assert_eq!(proxy.load::<Dwarf>().unwrap(), bean);
        assert_eq!(proxy.remove("age").as_deref(), Some("99"));
        assert_eq!(proxy.length("age"), 0);
    }
}
