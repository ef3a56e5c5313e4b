use std::borrow::Cow;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::bean::{BeanAccess, BeanRead};

use super::OptionMap;

/// Maps bean property names to option keys.
///
/// With neither a prefix nor first-letter capitalization, names pass through
/// unchanged. Otherwise the key is `prefix + name`, with the first letter of
/// `name` upper-cased when `first_upper` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyNaming {
    prefix: Option<String>,
    first_upper: bool,
}

impl KeyNaming {
    pub fn new(prefix: Option<String>, first_upper: bool) -> Self {
        Self {
            prefix,
            first_upper,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn first_upper(&self) -> bool {
        self.first_upper
    }

    /// Turns a property name into the option key it is stored under.
    pub fn transform<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.prefix.is_none() && !self.first_upper {
            return Cow::Borrowed(name);
        }

        let mut key = String::with_capacity(self.prefix.as_ref().map_or(0, String::len) + name.len());
        if let Some(prefix) = &self.prefix {
            key.push_str(prefix);
        }
        if self.first_upper {
            let mut chars = name.chars();
            if let Some(first) = chars.next() {
                key.extend(first.to_uppercase());
                key.push_str(chars.as_str());
            }
        } else {
            key.push_str(name);
        }
        Cow::Owned(key)
    }
}

/// Property capability over an [`OptionMap`].
///
/// Reads go through [`OptionMap::fetch`], so placeholders are resolved;
/// writes store values as given. `M` is `&OptionMap` for read-only access
/// and `&mut OptionMap` for read/write access.
#[derive(Debug)]
pub struct Access<M> {
    map: M,
    naming: Arc<KeyNaming>,
}

impl<M: Deref<Target = OptionMap>> Access<M> {
    pub fn new(map: M, naming: Arc<KeyNaming>) -> Self {
        Self { map, naming }
    }

    pub fn naming(&self) -> &Arc<KeyNaming> {
        &self.naming
    }
}

impl<M: Deref<Target = OptionMap>> BeanRead for Access<M> {
    fn prop_get(&self, name: &str) -> Option<String> {
        self.map.fetch(&self.naming.transform(name))
    }

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String> {
        self.map.fetch_at(&self.naming.transform(name), index)
    }

    fn prop_length(&self, name: &str) -> usize {
        self.map.length(&self.naming.transform(name))
    }
}

impl<M: DerefMut<Target = OptionMap>> BeanAccess for Access<M> {
    fn prop_add(&mut self, name: &str, value: Option<String>) {
        let key = self.naming.transform(name).into_owned();
        self.map.add(key, value);
    }

    fn prop_del(&mut self, name: &str) -> Option<String> {
        self.map.remove(&self.naming.transform(name))
    }

    fn prop_set(&mut self, name: &str, value: Option<String>) -> Option<String> {
        let key = self.naming.transform(name).into_owned();
        self.map.put(key, value)
    }

    fn prop_set_at(&mut self, name: &str, index: usize, value: Option<String>) -> Option<String> {
        let key = self.naming.transform(name);
        self.map.put_at(&key, index, value)
    }
}
