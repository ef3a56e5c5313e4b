//! Typed, ordered, multi-valued option store.
//!
//! [`OptionMap`] keeps an ordered sequence of string values per key, resolves
//! `${...}` placeholders against other options, the environment and
//! [system properties](sysprop), and binds its contents to and from serde
//! structs through the capability traits in [`bean`].

pub mod bean;
pub mod multimap;
pub mod options;
pub mod sysprop;

pub use bean::{BeanAccess, BeanError, BeanProxy, BeanRead};
pub use multimap::MultiMap;
pub use options::{OptionError, OptionMap, Substitution};
