//! Environment lookups behind a swappable reader.
//!
//! [`Env::real()`] reads the process environment. Unit tests build an
//! [`Env::mock()`] from literal pairs so config layering can be exercised
//! without touching process-global state.

use std::collections::HashMap;

/// Source of environment variables for config resolution.
#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    /// Read from the real process environment.
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// Read only from the given pairs.
    #[cfg(test)]
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Look up a variable, treating empty and whitespace-only values as unset.
    pub fn var(&self, name: &str) -> Option<String> {
        let value = match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Look up a variable and parse it, logging and discarding values that don't parse.
    pub fn parsed<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        let raw = self.var(name)?;
        match raw.parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid {name} value: {raw}");
                None
            }
        }
    }
}
