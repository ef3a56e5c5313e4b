use std::path::PathBuf;
use thiserror::Error;

use crate::bean::BeanError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionError {
    #[error("required options file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read options file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse options file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot store '{0}' as an option: nested tables inside arrays are not supported")]
    UnsupportedValue(String),

    #[error("unresolved reference '${{{0}}}'")]
    UnresolvedReference(String),

    #[error("substitution limit reached while resolving '{0}'")]
    SubstitutionLimit(String),

    #[error(transparent)]
    Bean(#[from] BeanError),
}
