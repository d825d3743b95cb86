//! Transformer configuration snapshots.
//!
//! A [`Config`] is an immutable flat `key : value` mapping taken once per
//! run. Column keys are boolean-valued (`"true"` enables, anything else or
//! absence disables); the remaining keys are `exclude_empty_values`,
//! `exclude_timestamp_values` and `epoch_format`. Reloading configuration
//! means parsing a fresh snapshot and handing it to
//! [`FitTransformer::reload`](crate::transformer::FitTransformer::reload).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::ColumnId;

/// Key enabling the empty-value row filter.
pub const KEY_EXCLUDE_EMPTY_VALUES: &str = "exclude_empty_values";
/// Key enabling the timestamp-row filter.
pub const KEY_EXCLUDE_TIMESTAMP_VALUES: &str = "exclude_timestamp_values";
/// Key selecting the output epoch (`"UNIX"` or raw device seconds).
pub const KEY_EPOCH_FORMAT: &str = "epoch_format";

/// An immutable configuration snapshot.
#[derive(Debug, Clone)]
pub struct Config {
    params: HashMap<String, String>,
}

impl Config {
    /// Parse a snapshot from a `key : value` parameter file.
    ///
    /// Lines starting with `#` are comments; anything after a `#` on a value
    /// is also ignored. Unknown keys are kept (and simply never queried).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Config(format!(
                "cannot read {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Ok(Self::parse(&text))
    }

    fn parse(text: &str) -> Self {
        let mut params = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, rest)) = line.split_once(':') {
                let key = key.trim();
                let value = rest.split('#').next().unwrap_or("").trim();
                if !key.is_empty() && !value.is_empty() {
                    params.insert(key.to_string(), value.to_string());
                }
            }
        }
        Self { params }
    }

    /// Build a snapshot from in-memory pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether a boolean-valued key is exactly `"true"`. Missing keys read
    /// as `false`, so unconfigured columns stay disabled without erroring.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }
}

impl Default for Config {
    /// Every candidate column enabled, both excludes off, Unix epoch output.
    fn default() -> Self {
        let mut params: HashMap<String, String> = ColumnId::ALL
            .iter()
            .map(|id| (id.key().to_string(), "true".to_string()))
            .collect();
        params.insert(KEY_EXCLUDE_EMPTY_VALUES.to_string(), "false".to_string());
        params.insert(KEY_EXCLUDE_TIMESTAMP_VALUES.to_string(), "false".to_string());
        params.insert(KEY_EPOCH_FORMAT.to_string(), "UNIX".to_string());
        Self { params }
    }
}
