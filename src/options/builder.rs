use std::path::Path;

use tracing::debug;

use super::env::EnvSource;
use super::file::FileSource;
use super::resolve::Substitution;
use super::source::OptionSource;
use super::{OptionError, OptionMap};
use crate::multimap::MultiMap;

/// Builder for an [`OptionMap`] loaded from layered sources.
///
/// Sources are applied in registration order. When a later source provides
/// a key, it replaces the key's whole value sequence.
///
/// ## Example
///
/// ```no_run
/// use optmap::OptionMap;
///
/// // defaults -> env overrides -> local file overrides env
/// let options = OptionMap::builder()
///     .property_first_upper(false)
///     .with_file("options/default.toml", true)
///     .with_env("MYAPP", "__")
///     .with_file("options/local.toml", false)
///     .build()?;
///
/// let url = options.fetch("database.url");
/// # Ok::<(), optmap::OptionError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct OptionMapBuilder {
    sources: Vec<Box<dyn OptionSource>>,
    property_first_upper: bool,
    substitution: Substitution,
}

impl OptionMap {
    /// Creates a new option map builder.
    pub fn builder() -> OptionMapBuilder {
        OptionMapBuilder::default()
    }
}

impl OptionMapBuilder {
    /// Upper-cases the first letter of property names in bean bindings.
    pub fn property_first_upper(mut self, enabled: bool) -> Self {
        self.property_first_upper = enabled;
        self
    }

    /// Sets how far placeholder substitution may go.
    ///
    /// [`Substitution::Unbounded`] re-scans without any limit and never
    /// terminates on a reference cycle.
    pub fn substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = substitution;
        self
    }

    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Loads options from environment variables with the given prefix.
    ///
    /// `MYAPP__DATABASE__HOST` with prefix `MYAPP` and separator `__` becomes
    /// the option `database.host`.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    pub fn with_source(mut self, source: impl OptionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Loads every source and assembles the map.
    ///
    /// Values are stored raw; placeholders are resolved on each fetch.
    pub fn build(self) -> Result<OptionMap, OptionError> {
        let mut values = MultiMap::new();

        for source in &self.sources {
            let entries = source.entries()?;
            debug!(source = ?source, entries = entries.len(), "loaded option source");
            for entry in entries {
                values.put_all(entry.key, entry.values);
            }
        }

        Ok(OptionMap::from_parts(
            values,
            self.property_first_upper,
            self.substitution,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionEntry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug)]
    struct Fixed(Vec<OptionEntry>);

    impl OptionSource for Fixed {
        fn entries(&self) -> Result<Vec<OptionEntry>, OptionError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_later_sources_replace_sequences() {
        let options = OptionMap::builder()
            .with_source(Fixed(vec![
                OptionEntry::multi("tags", vec![Some("a".into()), Some("b".into())]),
                OptionEntry::single("name", "doc"),
            ]))
            .with_source(Fixed(vec![OptionEntry::single("tags", "c")]))
            .build()
            .unwrap();

        assert_eq!(options.length("tags"), 1);
        assert_eq!(options.get("tags"), Some("c"));
        assert_eq!(options.get("name"), Some("doc"));
        let keys: Vec<_> = options.keys().collect();
        assert_eq!(keys, vec!["tags", "name"]);
    }

    #[test]
    fn test_build_from_file_and_env() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            host = "localhost"
            port = 8080
            url = "http://${{server.host}}:${{server.port}}"
            "#
        )
        .unwrap();
        std::env::set_var("OPTMAP_BUILDER_TEST__SERVER__PORT", "9090");

        let options = OptionMap::builder()
            .with_file(file.path(), true)
            .with_env("OPTMAP_BUILDER_TEST", "__")
            .build()
            .unwrap();

        assert_eq!(options.get("server.url"), Some("http://${server.host}:${server.port}"));
        assert_eq!(
            options.fetch("server.url").as_deref(),
            Some("http://localhost:9090")
        );
    }

    #[test]
    fn test_builder_flags() {
        let options = OptionMap::builder()
            .property_first_upper(true)
            .substitution(Substitution::Unbounded)
            .build()
            .unwrap();

        assert!(options.is_property_first_upper());
        assert!(options.default_naming().first_upper());
        assert_eq!(options.substitution(), Substitution::Unbounded);
        assert!(options.is_empty());
    }

    #[test]
    fn test_required_file_missing() {
        let result = OptionMap::builder()
            .with_file("/nonexistent/options.toml", true)
            .build();
        assert!(matches!(result, Err(OptionError::FileNotFound(_))));
    }
}
