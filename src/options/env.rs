use super::source::{OptionEntry, OptionSource};
use super::OptionError;

/// Loads environment variables named `<prefix><sep><a><sep><b>` as option `a.b`.
///
/// Path segments are lower-cased; values are kept verbatim.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self {
            prefix: prefix.into(),
            separator,
        }
    }

    fn key_for(&self, var: &str) -> Option<String> {
        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let path = var.strip_prefix(&prefix_with_sep)?;
        if path.is_empty() {
            return None;
        }
        let segments: Vec<String> = path
            .split(&self.separator)
            .map(|s| s.to_lowercase())
            .collect();
        Some(segments.join("."))
    }
}

impl OptionSource for EnvSource {
    fn entries(&self) -> Result<Vec<OptionEntry>, OptionError> {
        let mut entries: Vec<OptionEntry> = std::env::vars()
            .filter_map(|(var, value)| self.key_for(&var).map(|key| OptionEntry::single(key, value)))
            .collect();
        // environment iteration order is unspecified
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let source = EnvSource::new("MYAPP", "__");
        assert_eq!(
            source.key_for("MYAPP__DATABASE__HOST").as_deref(),
            Some("database.host")
        );
        assert_eq!(source.key_for("MYAPP__").as_deref(), None);
        assert_eq!(source.key_for("OTHER__HOST").as_deref(), None);
    }

    #[test]
    fn test_entries_from_environment() {
        std::env::set_var("OPTMAP_ENV_TEST__SERVER__PORT", "8080");
        std::env::set_var("OPTMAP_ENV_TEST__NAME", "Doc");

        let entries = EnvSource::new("OPTMAP_ENV_TEST", "__").entries().unwrap();
        assert_eq!(
            entries,
            vec![
                OptionEntry::single("name", "Doc"),
                OptionEntry::single("server.port", "8080"),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "separator must not be empty")]
    fn test_empty_separator_rejected() {
        EnvSource::new("X", "");
    }
}
