use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BeanError {
    #[error("cannot parse '{value}' as {target}")]
    Parse { value: String, target: &'static str },

    #[error("property '{0}' holds no value")]
    NullValue(String),

    #[error("unsupported bean shape: {0}")]
    Unsupported(&'static str),

    #[error("{0}")]
    Message(String),
}

impl BeanError {
    pub(crate) fn parse(value: &str, target: &'static str) -> Self {
        BeanError::Parse {
            value: value.to_string(),
            target,
        }
    }
}

impl serde::de::Error for BeanError {
    fn custom<T: Display>(msg: T) -> Self {
        BeanError::Message(msg.to_string())
    }
}

impl serde::ser::Error for BeanError {
    fn custom<T: Display>(msg: T) -> Self {
        BeanError::Message(msg.to_string())
    }
}
