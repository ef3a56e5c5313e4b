//! Placeholder substitution for option values.
//!
//! Supported forms:
//!
//! - `${name}` and `${name[index]}` reference other options (last value or
//!   the value at `index`).
//! - `${@env/NAME}` reads an environment variable.
//! - `${@prop/name}` reads a [system property](crate::sysprop).
//!
//! A placeholder directly preceded by `\` is never substituted; the
//! backslash is left in place. Unresolvable placeholders stay as literal
//! text. After each successful replacement the value is scanned again from
//! the start, so substituted text may itself contain placeholders.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{trace, warn};

use super::OptionError;
use crate::multimap::MultiMap;
use crate::sysprop;

pub(crate) const SUBST_CHAR: char = '$';
const ENVIRONMENT_PREFIX: &str = "@env/";
const SYSTEM_PROPERTY_PREFIX: &str = "@prop/";

/// `${name}` or `${name[index]}`; the escape check happens in code.
static EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^\[}]+)(?:\[([0-9]+)\])?\}").unwrap());

/// How far substitution may go before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// Stop after `max_depth` nested references or `max_replacements`
    /// replacements within one top-level lookup. Whatever is left stays
    /// literal; strict lookups report [`OptionError::SubstitutionLimit`].
    Bounded {
        max_depth: usize,
        max_replacements: usize,
    },
    /// Re-scan until nothing resolves. A reference cycle never terminates
    /// and will exhaust the stack.
    Unbounded,
}

impl Default for Substitution {
    fn default() -> Self {
        Substitution::Bounded {
            max_depth: 64,
            max_replacements: 4096,
        }
    }
}

/// State of one top-level lookup, shared by all nested lookups it triggers.
pub(crate) struct Resolver<'a> {
    values: &'a MultiMap<String, Option<String>>,
    substitution: Substitution,
    strict: bool,
    depth: usize,
    replacements: usize,
    exhausted: bool,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        values: &'a MultiMap<String, Option<String>>,
        substitution: Substitution,
        strict: bool,
    ) -> Self {
        Self {
            values,
            substitution,
            strict,
            depth: 0,
            replacements: 0,
            exhausted: false,
        }
    }

    /// Looks up the last value (or the value at `index`) and resolves it.
    pub(crate) fn fetch(
        &mut self,
        key: &str,
        index: Option<usize>,
    ) -> Result<Option<String>, OptionError> {
        let raw = match index {
            None => self.values.get(key),
            Some(index) => self.values.get_at(key, index),
        };
        match raw.cloned().flatten() {
            Some(mut value) if value.contains(SUBST_CHAR) => {
                self.resolve(&mut value)?;
                Ok(Some(value))
            }
            value => Ok(value),
        }
    }

    /// Rewrites every resolvable placeholder in `buffer`.
    pub(crate) fn resolve(&mut self, buffer: &mut String) -> Result<(), OptionError> {
        let mut pos = 0;

        while !self.exhausted {
            let Some(caps) = EXPRESSION.captures_at(buffer.as_str(), pos) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            let span = whole.range();

            if buffer[..span.start].ends_with('\\') {
                pos = span.start + 1;
                continue;
            }

            let name = caps[1].to_string();
            let index = caps.get(2).map(|m| m.as_str().parse::<usize>());

            let value = match index {
                Some(Err(_)) => None,
                Some(Ok(index)) => self.lookup(&name, Some(index))?,
                None => self.lookup(&name, None)?,
            };

            match value {
                Some(_) if self.at_replacement_limit() => {
                    self.give_up(&name)?;
                }
                Some(value) => {
                    trace!(placeholder = %name, "substituted placeholder");
                    buffer.replace_range(span, &value);
                    self.replacements += 1;
                    pos = 0;
                }
                None if self.strict => {
                    return Err(OptionError::UnresolvedReference(name));
                }
                None => pos = span.end,
            }
        }

        Ok(())
    }

    fn lookup(&mut self, name: &str, index: Option<usize>) -> Result<Option<String>, OptionError> {
        if let Some(var) = name.strip_prefix(ENVIRONMENT_PREFIX) {
            return Ok(std::env::var(var).ok());
        }
        if let Some(prop) = name.strip_prefix(SYSTEM_PROPERTY_PREFIX) {
            return Ok(sysprop::get(prop));
        }

        if let Substitution::Bounded { max_depth, .. } = self.substitution {
            if self.exhausted || self.depth >= max_depth {
                return self.give_up(name);
            }
        }

        self.depth += 1;
        let value = self.fetch(name, index);
        self.depth -= 1;
        value
    }

    fn at_replacement_limit(&self) -> bool {
        match self.substitution {
            Substitution::Bounded {
                max_replacements, ..
            } => self.replacements >= max_replacements,
            Substitution::Unbounded => false,
        }
    }

    fn give_up(&mut self, name: &str) -> Result<Option<String>, OptionError> {
        if !self.exhausted {
            warn!(
                placeholder = %name,
                depth = self.depth,
                replacements = self.replacements,
                "substitution limit reached, leaving placeholders unresolved"
            );
            self.exhausted = true;
        }
        if self.strict {
            Err(OptionError::SubstitutionLimit(name.to_string()))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_map(entries: &[(&str, &str)]) -> MultiMap<String, Option<String>> {
        let mut map = MultiMap::new();
        for (key, value) in entries {
            map.add(key.to_string(), Some(value.to_string()));
        }
        map
    }

    fn resolve(map: &MultiMap<String, Option<String>>, text: &str) -> String {
        let mut buffer = text.to_string();
        Resolver::new(map, Substitution::default(), false)
            .resolve(&mut buffer)
            .unwrap();
        buffer
    }

    #[test]
    fn test_simple_reference() {
        let map = make_map(&[("host", "localhost")]);
        assert_eq!(resolve(&map, "http://${host}/api"), "http://localhost/api");
    }

    #[test]
    fn test_no_placeholder_is_noop() {
        let map = make_map(&[("a", "1")]);
        assert_eq!(resolve(&map, "plain $text {a}"), "plain $text {a}");
    }

    #[test]
    fn test_multiple_references() {
        let map = make_map(&[("host", "example.com"), ("port", "8080")]);
        assert_eq!(
            resolve(&map, "https://${host}:${port}"),
            "https://example.com:8080"
        );
    }

    #[test]
    fn test_chained_references() {
        let map = make_map(&[("a", "hello"), ("b", "${a} world"), ("c", "${b}!")]);
        let mut resolver = Resolver::new(&map, Substitution::default(), false);
        assert_eq!(
            resolver.fetch("c", None).unwrap().as_deref(),
            Some("hello world!")
        );
    }

    #[test]
    fn test_indexed_reference() {
        let mut map = make_map(&[("list", "A"), ("list", "B")]);
        map.add("ref".to_string(), Some("${list[1]}${list[0]}${list}".to_string()));
        let mut resolver = Resolver::new(&map, Substitution::default(), false);
        assert_eq!(resolver.fetch("ref", None).unwrap().as_deref(), Some("BAB"));
    }

    #[test]
    fn test_escaped_placeholder_untouched() {
        let map = make_map(&[("a", "X")]);
        assert_eq!(resolve(&map, r"\${a} and ${a}"), r"\${a} and X");
    }

    #[test]
    fn test_escape_blocks_only_its_own_placeholder() {
        let map = make_map(&[("a", "b"), ("b", "X")]);
        assert_eq!(resolve(&map, r"\${${a}}"), r"\${b}");
    }

    #[test]
    fn test_unresolved_left_literal() {
        let map = make_map(&[("a", "X")]);
        assert_eq!(resolve(&map, "${missing}-${a}"), "${missing}-X");
        assert_eq!(resolve(&map, "${a[7]}"), "${a[7]}");
    }

    #[test]
    fn test_malformed_left_literal() {
        let map = make_map(&[("a", "X")]);
        assert_eq!(resolve(&map, "${a"), "${a");
        assert_eq!(resolve(&map, "${a[x]}"), "${a[x]}");
        assert_eq!(resolve(&map, "${}"), "${}");
        assert_eq!(resolve(&map, "${a[99999999999999999999999]}"), "${a[99999999999999999999999]}");
    }

    #[test]
    fn test_replacement_may_introduce_placeholders() {
        let map = make_map(&[("open", "${"), ("inner", "deep")]);
        assert_eq!(resolve(&map, "${open}inner}"), "deep");
    }

    #[test]
    fn test_environment_reference() {
        std::env::set_var("OPTMAP_RESOLVE_TEST_HOME", "/x");
        let map = make_map(&[]);
        assert_eq!(resolve(&map, "${@env/OPTMAP_RESOLVE_TEST_HOME}/bin"), "/x/bin");
        assert_eq!(
            resolve(&map, "${@env/OPTMAP_RESOLVE_TEST_UNSET}"),
            "${@env/OPTMAP_RESOLVE_TEST_UNSET}"
        );
    }

    #[test]
    fn test_system_property_reference() {
        sysprop::set("optmap.resolve.test", "prop-value");
        let map = make_map(&[]);
        assert_eq!(resolve(&map, "${@prop/optmap.resolve.test}"), "prop-value");
        assert_eq!(
            resolve(&map, "${@prop/optmap.resolve.unset}"),
            "${@prop/optmap.resolve.unset}"
        );
    }

    #[test]
    fn test_cycle_bounded_lenient() {
        let map = make_map(&[("a", "${b}"), ("b", "${a}")]);
        let mut resolver = Resolver::new(&map, Substitution::default(), false);
        let value = resolver.fetch("a", None).unwrap().unwrap();
        assert!(value == "${a}" || value == "${b}");
    }

    #[test]
    fn test_cycle_bounded_strict() {
        let map = make_map(&[("a", "x${a}")]);
        let mut resolver = Resolver::new(&map, Substitution::default(), true);
        assert!(matches!(
            resolver.fetch("a", None),
            Err(OptionError::SubstitutionLimit(name)) if name == "a"
        ));
    }

    #[test]
    fn test_replacement_limit() {
        let map = make_map(&[("x", "1")]);
        let substitution = Substitution::Bounded {
            max_depth: 8,
            max_replacements: 2,
        };
        let mut buffer = "${x}${x}${x}".to_string();
        Resolver::new(&map, substitution, false)
            .resolve(&mut buffer)
            .unwrap();
        assert_eq!(buffer, "11${x}");
    }

    #[test]
    fn test_strict_unresolved() {
        let map = make_map(&[]);
        let mut buffer = "${nope}".to_string();
        let result = Resolver::new(&map, Substitution::default(), true).resolve(&mut buffer);
        assert!(matches!(result, Err(OptionError::UnresolvedReference(name)) if name == "nope"));
    }

    #[test]
    fn test_strict_ignores_escaped() {
        let map = make_map(&[]);
        let mut buffer = r"\${nope}".to_string();
        Resolver::new(&map, Substitution::default(), true)
            .resolve(&mut buffer)
            .unwrap();
        assert_eq!(buffer, r"\${nope}");
    }

    #[test]
    fn test_unbounded_resolves_deep_chain() {
        let mut map = MultiMap::new();
        for i in 0..100 {
            map.add(format!("k{i}"), Some(format!("${{k{}}}", i + 1)));
        }
        map.add("k100".to_string(), Some("end".to_string()));
        let mut resolver = Resolver::new(&map, Substitution::Unbounded, true);
        assert_eq!(resolver.fetch("k0", None).unwrap().as_deref(), Some("end"));
    }
}
