use super::OptionError;

/// Values loaded for one key by an [`OptionSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub key: String,
    pub values: Vec<Option<String>>,
}

impl OptionEntry {
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: vec![Some(value.into())],
        }
    }

    pub fn multi(key: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

/// Something that can feed options into an [`OptionMap`](super::OptionMap) at build time.
pub trait OptionSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<OptionEntry>, OptionError>;
}
