//! File-based option source.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::source::{OptionEntry, OptionSource};
use super::OptionError;

/// An option source that loads from a TOML file.
///
/// Nested tables flatten into dotted keys (`[server] host = ...` becomes
/// `server.host`), arrays of scalars become multi-valued options, and every
/// scalar is stored as its text. Files can be marked as required or optional.
/// Required files that don't exist cause an error; optional files that don't
/// exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, the build will fail if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }
}

impl OptionSource for FileSource {
    fn entries(&self) -> Result<Vec<OptionEntry>, OptionError> {
        let mut entries = Vec::new();
        if let Some(table) = load_options_file(&self.path, self.required)? {
            flatten(&table, None, &mut entries)?;
        }
        Ok(entries)
    }
}

/// Loads and parses a TOML options file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_options_file(path: &Path, required: bool) -> Result<Option<Table>, OptionError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| OptionError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(OptionError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(OptionError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn flatten(
    table: &Table,
    prefix: Option<&str>,
    entries: &mut Vec<OptionEntry>,
) -> Result<(), OptionError> {
    for (name, value) in table {
        let key = match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.clone(),
        };
        match value {
            Value::Table(nested) => flatten(nested, Some(&key), entries)?,
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| scalar_text(item).map(Some))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| OptionError::UnsupportedValue(key.clone()))?;
                entries.push(OptionEntry::multi(key, values));
            }
            scalar => {
                let text = scalar_text(scalar).ok_or_else(|| OptionError::UnsupportedValue(key.clone()))?;
                entries.push(OptionEntry::single(key, text));
            }
        }
    }
    Ok(())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_source_flattens_tables_and_arrays() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            name = "doc"
            age = 63

            [dwarfs.happy]
            weight = 56.4
            fortune_number = [99, 11]
            "#
        )
        .unwrap();

        let entries = FileSource::new(file.path(), true).entries().unwrap();
        assert_eq!(
            entries,
            vec![
                OptionEntry::single("name", "doc"),
                OptionEntry::single("age", "63"),
                OptionEntry::single("dwarfs.happy.weight", "56.4"),
                OptionEntry::multi(
                    "dwarfs.happy.fortune_number",
                    vec![Some("99".into()), Some("11".into())]
                ),
            ]
        );
    }

    #[test]
    fn test_file_source_rejects_tables_in_arrays() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "items = [{{ a = 1 }}]").unwrap();

        let result = FileSource::new(file.path(), true).entries();
        assert!(matches!(result, Err(OptionError::UnsupportedValue(key)) if key == "items"));
    }

    #[test]
    fn test_file_source_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not toml").unwrap();

        let result = FileSource::new(file.path(), true).entries();
        assert!(matches!(result, Err(OptionError::ParseError { .. })));
    }

    #[test]
    fn test_file_source_required_missing() {
        let source = FileSource::new("/nonexistent/path/options.toml", true);
        let result = source.entries();

        assert!(matches!(result, Err(OptionError::FileNotFound(_))));
    }

    #[test]
    fn test_file_source_optional_missing() {
        let source = FileSource::new("/nonexistent/path/options.toml", false);
        let entries = source.entries().unwrap();

        assert!(entries.is_empty());
    }
}
