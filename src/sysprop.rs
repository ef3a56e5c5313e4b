//! Process-wide system properties, the source behind `${@prop/name}`.
//!
//! The registry starts out with a handful of well-known entries describing
//! the host (`os.name`, `user.home`, ...) and can be extended at runtime.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

static PROPERTIES: Lazy<RwLock<HashMap<String, String>>> =
    Lazy::new(|| RwLock::new(host_properties()));

/// Returns the value of a system property.
pub fn get(name: &str) -> Option<String> {
    PROPERTIES.read().get(name).cloned()
}

/// Sets a system property, returning its previous value.
pub fn set(name: impl Into<String>, value: impl Into<String>) -> Option<String> {
    PROPERTIES.write().insert(name.into(), value.into())
}

pub fn remove(name: &str) -> Option<String> {
    PROPERTIES.write().remove(name)
}

fn host_properties() -> HashMap<String, String> {
    let mut props = HashMap::new();
    props.insert("os.name".to_string(), std::env::consts::OS.to_string());
    props.insert("os.arch".to_string(), std::env::consts::ARCH.to_string());
    props.insert(
        "file.separator".to_string(),
        std::path::MAIN_SEPARATOR.to_string(),
    );
    props.insert(
        "path.separator".to_string(),
        if cfg!(windows) { ";" } else { ":" }.to_string(),
    );
    props.insert(
        "line.separator".to_string(),
        if cfg!(windows) { "\r\n" } else { "\n" }.to_string(),
    );

    if let Ok(dir) = std::env::current_dir() {
        props.insert("user.dir".to_string(), dir.display().to_string());
    }
    let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    if let Ok(home) = std::env::var(home) {
        props.insert("user.home".to_string(), home);
    }
    if let Ok(user) = std::env::var("USER").or_else(|_| std::env::var("USERNAME")) {
        props.insert("user.name".to_string(), user);
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_properties_present() {
        assert_eq!(get("os.name").as_deref(), Some(std::env::consts::OS));
        assert!(get("file.separator").is_some());
    }

    #[test]
    fn test_set_get_remove() {
        assert_eq!(set("sysprop.test.key", "one"), None);
        assert_eq!(get("sysprop.test.key").as_deref(), Some("one"));
        assert_eq!(set("sysprop.test.key", "two").as_deref(), Some("one"));
        assert_eq!(remove("sysprop.test.key").as_deref(), Some("two"));
        assert_eq!(get("sysprop.test.key"), None);
    }
}
