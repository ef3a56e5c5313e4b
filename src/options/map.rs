use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::access::{Access, KeyNaming};
use super::resolve::{Resolver, Substitution};
use super::{OptionError, OptionValue};
use crate::bean::{self, parse::parse_optional, BeanProxy, Layered};
use crate::multimap::MultiMap;

/// An ordered, multi-valued option store with placeholder resolution.
///
/// Every key holds a sequence of values; a value is either a string or the
/// null marker `None`. Unindexed access means the last value.
///
/// `get*` returns raw values. `fetch*` resolves `${...}` placeholders on a
/// private copy first (see [`resolve`](super::resolve) for the syntax).
///
/// ```
/// use optmap::OptionMap;
///
/// let mut options = OptionMap::new();
/// options.add("host", "localhost");
/// options.add("port", 8080);
/// options.add("url", "http://${host}:${port}/");
///
/// assert_eq!(options.get("url"), Some("http://${host}:${port}/"));
/// assert_eq!(options.fetch("url").as_deref(), Some("http://localhost:8080/"));
/// assert_eq!(options.fetch_as::<u16>("port")?, Some(8080));
/// # Ok::<(), optmap::OptionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionMap {
    values: MultiMap<String, Option<String>>,
    property_first_upper: bool,
    substitution: Substitution,
    default_naming: OnceCell<Arc<KeyNaming>>,
}

impl OptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map whose bean bindings upper-case the first letter of
    /// every property name.
    pub fn with_first_upper(property_first_upper: bool) -> Self {
        Self {
            property_first_upper,
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        values: MultiMap<String, Option<String>>,
        property_first_upper: bool,
        substitution: Substitution,
    ) -> Self {
        Self {
            values,
            property_first_upper,
            substitution,
            default_naming: OnceCell::new(),
        }
    }

    pub fn is_property_first_upper(&self) -> bool {
        self.property_first_upper
    }

    pub fn substitution(&self) -> Substitution {
        self.substitution
    }

    pub fn set_substitution(&mut self, substitution: Substitution) {
        self.substitution = substitution;
    }

    // Store

    /// Appends a value to `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl OptionValue) {
        self.values.add(key.into(), value.into_option_value());
    }

    /// Inserts a value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > self.length(key)`.
    pub fn add_at(&mut self, key: impl Into<String>, index: usize, value: impl OptionValue) {
        self.values
            .add_at(key.into(), index, value.into_option_value());
    }

    /// Replaces the last value of `key`, returning the previous one.
    pub fn put(&mut self, key: impl Into<String>, value: impl OptionValue) -> Option<String> {
        self.values
            .put(key.into(), value.into_option_value())
            .flatten()
    }

    /// Replaces the value at `index`, returning the previous one.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.length(key)`.
    pub fn put_at(&mut self, key: &str, index: usize, value: impl OptionValue) -> Option<String> {
        self.values
            .put_at(key, index, value.into_option_value())
            .flatten()
    }

    /// Raw last value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Option::as_deref)
    }

    pub fn get_at(&self, key: &str, index: usize) -> Option<&str> {
        self.values.get_at(key, index).and_then(Option::as_deref)
    }

    pub fn get_all(&self, key: &str) -> Option<&[Option<String>]> {
        self.values.get_all(key)
    }

    /// Removes every value of `key`, returning the last one.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key).flatten()
    }

    pub fn remove_at(&mut self, key: &str, index: usize) -> Option<String> {
        self.values.remove_at(key, index).flatten()
    }

    pub fn length(&self, key: &str) -> usize {
        self.values.length(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn comment(&self, key: &str) -> Option<&str> {
        self.values.comment(key)
    }

    pub fn put_comment(&mut self, key: impl Into<String>, comment: impl Into<String>) -> Option<String> {
        self.values.put_comment(key.into(), comment)
    }

    pub fn remove_comment(&mut self, key: &str) -> Option<String> {
        self.values.remove_comment(key)
    }

    pub fn as_multimap(&self) -> &MultiMap<String, Option<String>> {
        &self.values
    }

    // Resolution

    /// Last value of `key` with placeholders resolved.
    ///
    /// Placeholders that cannot be resolved are left as literal text.
    pub fn fetch(&self, key: &str) -> Option<String> {
        self.lenient(key, None)
    }

    pub fn fetch_at(&self, key: &str, index: usize) -> Option<String> {
        self.lenient(key, Some(index))
    }

    /// Like [`fetch`](Self::fetch), but fails on any placeholder that cannot
    /// be resolved and on hitting the substitution limit.
    pub fn try_fetch(&self, key: &str) -> Result<Option<String>, OptionError> {
        Resolver::new(&self.values, self.substitution, true).fetch(key, None)
    }

    pub fn try_fetch_at(&self, key: &str, index: usize) -> Result<Option<String>, OptionError> {
        Resolver::new(&self.values, self.substitution, true).fetch(key, Some(index))
    }

    /// Resolves placeholders in `buffer` in place against this map.
    pub fn resolve(&self, buffer: &mut String) {
        // lenient resolution reports nothing
        let _ = Resolver::new(&self.values, self.substitution, false).resolve(buffer);
    }

    fn lenient(&self, key: &str, index: Option<usize>) -> Option<String> {
        Resolver::new(&self.values, self.substitution, false)
            .fetch(key, index)
            .ok()
            .flatten()
    }

    // Typed access

    /// Resolves the last value of `key` and parses it as `T`.
    pub fn fetch_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, OptionError> {
        Ok(parse_optional(self.fetch(key).as_deref())?)
    }

    pub fn fetch_at_as<T: DeserializeOwned>(
        &self,
        key: &str,
        index: usize,
    ) -> Result<Option<T>, OptionError> {
        Ok(parse_optional(self.fetch_at(key, index).as_deref())?)
    }

    /// Parses the raw last value of `key` as `T`, without substitution.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, OptionError> {
        Ok(parse_optional(self.get(key))?)
    }

    pub fn get_at_as<T: DeserializeOwned>(
        &self,
        key: &str,
        index: usize,
    ) -> Result<Option<T>, OptionError> {
        Ok(parse_optional(self.get_at(key, index))?)
    }

    // Bean binding

    /// Property naming shared by all unprefixed bindings of this map.
    ///
    /// Created on first use and cached for the lifetime of the map; racing
    /// first calls from several threads observe the same instance.
    pub fn default_naming(&self) -> Arc<KeyNaming> {
        self.default_naming
            .get_or_init(|| {
                debug!(
                    first_upper = self.property_first_upper,
                    "creating default property naming"
                );
                Arc::new(KeyNaming::new(None, self.property_first_upper))
            })
            .clone()
    }

    /// A fresh, uncached naming that prefixes every property name.
    pub fn naming_with_prefix(&self, prefix: impl Into<String>) -> Arc<KeyNaming> {
        Arc::new(KeyNaming::new(
            Some(prefix.into()),
            self.property_first_upper,
        ))
    }

    pub fn access(&self) -> Access<&Self> {
        Access::new(self, self.default_naming())
    }

    pub fn access_mut(&mut self) -> Access<&mut Self> {
        let naming = self.default_naming();
        Access::new(self, naming)
    }

    /// Copies stored options into the fields of `bean`.
    ///
    /// Fields whose property holds no values keep their current value.
    pub fn project_to<T>(&self, bean: &mut T) -> Result<(), OptionError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.project_with(bean, self.default_naming())
    }

    pub fn project_to_with_prefix<T>(&self, bean: &mut T, prefix: &str) -> Result<(), OptionError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.project_with(bean, self.naming_with_prefix(prefix))
    }

    fn project_with<T>(&self, bean: &mut T, naming: Arc<KeyNaming>) -> Result<(), OptionError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut current: MultiMap<String, Option<String>> = MultiMap::new();
        bean::into_access(&*bean, &mut current)?;
        *bean = bean::from_access(&Layered::new(Access::new(self, naming), &current))?;
        Ok(())
    }

    /// Builds a new bean from stored options.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, OptionError> {
        Ok(bean::from_access(&self.access())?)
    }

    pub fn bind_with_prefix<T: DeserializeOwned>(&self, prefix: &str) -> Result<T, OptionError> {
        let access = Access::new(self, self.naming_with_prefix(prefix));
        Ok(bean::from_access(&access)?)
    }

    /// Stores every field of `bean` as options.
    pub fn populate_from<T: Serialize + ?Sized>(&mut self, bean: &T) -> Result<(), OptionError> {
        bean::into_access(bean, &mut self.access_mut())?;
        Ok(())
    }

    pub fn populate_from_with_prefix<T: Serialize + ?Sized>(
        &mut self,
        bean: &T,
        prefix: &str,
    ) -> Result<(), OptionError> {
        let naming = self.naming_with_prefix(prefix);
        bean::into_access(bean, &mut Access::new(self, naming))?;
        Ok(())
    }

    /// Typed read/write-through view of this map by property name.
    pub fn as_bean(&mut self) -> BeanProxy<Access<&mut Self>> {
        BeanProxy::new(self.access_mut())
    }

    pub fn as_bean_with_prefix(&mut self, prefix: &str) -> BeanProxy<Access<&mut Self>> {
        let naming = self.naming_with_prefix(prefix);
        BeanProxy::new(Access::new(self, naming))
    }
}
