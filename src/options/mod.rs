//! The option store: multi-valued options, placeholder resolution, typed
//! access and bean binding.

mod access;
mod builder;
mod env;
mod error;
mod file;
mod map;
pub mod resolve;
mod source;
mod value;

pub use access::{Access, KeyNaming};
pub use builder::OptionMapBuilder;
pub use env::EnvSource;
pub use error::OptionError;
pub use file::FileSource;
pub use map::OptionMap;
pub use resolve::Substitution;
pub use source::{OptionEntry, OptionSource};
pub use value::OptionValue;
