//! Server parameter set handed to the embedded REST container.
//!
//! Keys and values are plain strings. Single-entry mutators refuse empty keys
//! or values and report it through [`ParamUpdate`] instead of an error.

use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Names of resource groups to mount, separated by commas, semicolons or whitespace.
pub const PARAM_RESOURCE_PACKAGES: &str = "simplerestserver.resource.packages";

/// Request timeout in milliseconds. Non-numeric values are ignored.
pub const PARAM_IDLE_THREAD_TIMEOUT: &str = "de.cismet.commons.simplerestserver.idleThreadTimeout";

/// Path the REST resources are mounted under. Defaults to `/`.
pub const PARAM_SERVLET_CONTEXT: &str = "de.cismet.commons.simplerestserver.servletContextPath";

/// Directory served as static files below the context path.
pub const PARAM_STATIC_RESOURCE_PATH: &str = "de.cismet.commons.simplerestserver.staticResourcePath";

/// Outcome of a single-entry parameter mutation.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamUpdate {
    /// Whether the parameter set was changed.
    pub applied: bool,
}

impl ParamUpdate {
    pub const fn applied() -> Self {
        Self { applied: true }
    }

    pub const fn skipped() -> Self {
        Self { applied: false }
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }
}

/// String-keyed parameter map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ServerParams {
    entries: HashMap<String, String>,
}

impl ServerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Empty keys or values are refused.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> ParamUpdate {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || value.is_empty() {
            return ParamUpdate::skipped();
        }
        self.entries.insert(key, value);
        ParamUpdate::applied()
    }

    /// Remove `key`; skipped when the key is empty or not present.
    pub fn remove(&mut self, key: &str) -> ParamUpdate {
        if key.is_empty() {
            return ParamUpdate::skipped();
        }
        match self.entries.remove(key) {
            Some(_) => ParamUpdate::applied(),
            None => ParamUpdate::skipped(),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Copy every entry of `other` into this set, overwriting existing keys.
    ///
    /// Entries are taken as-is; callers hand in sets that were built through
    /// [`ServerParams::put`] or come from a provider.
    pub fn extend_from(&mut self, other: &ServerParams) {
        self.entries
            .extend(other.entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl From<HashMap<String, String>> for ServerParams {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServerParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ServerParams {
    type Item = (&'a String, &'a String);
    type IntoIter = hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ServerParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Sorted so log lines are stable between runs.
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort();
        write!(f, "{{")?;
        for (i, (key, value)) in entries.into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "}}")
    }
}
