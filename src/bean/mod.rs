//! Binding between option stores and structured values.
//!
//! Beans are ordinary serde types. The binding engine only ever talks to a
//! store through the [`BeanRead`] / [`BeanAccess`] capabilities: get, set, add,
//! delete and count values by property name, with indexed variants for
//! multi-valued properties.
//!
//! - [`from_access`] builds a bean from the properties a capability exposes.
//! - [`into_access`] writes a bean's fields into a capability.
//! - [`BeanProxy`] gives typed read/write-through access by property name.
//!
//! Only flat beans are supported: every field is either a scalar or a
//! sequence of scalars, and maps to one property.

mod de;
mod error;
pub mod parse;
mod proxy;
mod ser;

pub use de::from_access;
pub use error::BeanError;
pub use proxy::BeanProxy;
pub use ser::into_access;

use crate::multimap::MultiMap;

/// Read side of the property capability.
pub trait BeanRead {
    /// Last value of the property, `None` when absent or null.
    fn prop_get(&self, name: &str) -> Option<String>;

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String>;

    /// Number of values the property holds.
    fn prop_length(&self, name: &str) -> usize;
}

/// Full read/write property capability.
pub trait BeanAccess: BeanRead {
    fn prop_add(&mut self, name: &str, value: Option<String>);

    /// Removes all values of the property, returning the last one.
    fn prop_del(&mut self, name: &str) -> Option<String>;

    fn prop_set(&mut self, name: &str, value: Option<String>) -> Option<String>;

    fn prop_set_at(&mut self, name: &str, index: usize, value: Option<String>) -> Option<String>;
}

impl<A: BeanRead + ?Sized> BeanRead for &A {
    fn prop_get(&self, name: &str) -> Option<String> {
        (**self).prop_get(name)
    }

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String> {
        (**self).prop_get_at(name, index)
    }

    fn prop_length(&self, name: &str) -> usize {
        (**self).prop_length(name)
    }
}

impl<A: BeanRead + ?Sized> BeanRead for &mut A {
    fn prop_get(&self, name: &str) -> Option<String> {
        (**self).prop_get(name)
    }

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String> {
        (**self).prop_get_at(name, index)
    }

    fn prop_length(&self, name: &str) -> usize {
        (**self).prop_length(name)
    }
}

impl<A: BeanAccess + ?Sized> BeanAccess for &mut A {
    fn prop_add(&mut self, name: &str, value: Option<String>) {
        (**self).prop_add(name, value)
    }

    fn prop_del(&mut self, name: &str) -> Option<String> {
        (**self).prop_del(name)
    }

    fn prop_set(&mut self, name: &str, value: Option<String>) -> Option<String> {
        (**self).prop_set(name, value)
    }

    fn prop_set_at(&mut self, name: &str, index: usize, value: Option<String>) -> Option<String> {
        (**self).prop_set_at(name, index, value)
    }
}

/// Raw access to a plain multi-map: property names are keys, values are
/// returned exactly as stored.
impl BeanRead for MultiMap<String, Option<String>> {
    fn prop_get(&self, name: &str) -> Option<String> {
        self.get(name).cloned().flatten()
    }

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String> {
        self.get_at(name, index).cloned().flatten()
    }

    fn prop_length(&self, name: &str) -> usize {
        self.length(name)
    }
}

impl BeanAccess for MultiMap<String, Option<String>> {
    fn prop_add(&mut self, name: &str, value: Option<String>) {
        self.add(name.to_string(), value);
    }

    fn prop_del(&mut self, name: &str) -> Option<String> {
        self.remove(name).flatten()
    }

    fn prop_set(&mut self, name: &str, value: Option<String>) -> Option<String> {
        self.put(name.to_string(), value).flatten()
    }

    fn prop_set_at(&mut self, name: &str, index: usize, value: Option<String>) -> Option<String> {
        self.put_at(name, index, value).flatten()
    }
}

/// Reads each property from `primary` when it holds values there, and from
/// `fallback` otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Layered<P, F> {
    primary: P,
    fallback: F,
}

impl<P: BeanRead, F: BeanRead> Layered<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    fn source(&self, name: &str) -> &dyn BeanRead {
        if self.primary.prop_length(name) > 0 {
            &self.primary
        } else {
            &self.fallback
        }
    }
}

impl<P: BeanRead, F: BeanRead> BeanRead for Layered<P, F> {
    fn prop_get(&self, name: &str) -> Option<String> {
        self.source(name).prop_get(name)
    }

    fn prop_get_at(&self, name: &str, index: usize) -> Option<String> {
        self.source(name).prop_get_at(name, index)
    }

    fn prop_length(&self, name: &str) -> usize {
        self.source(name).prop_length(name)
    }
}
