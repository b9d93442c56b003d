//! Option stream canonicalization.
//!
//! The section builder concatenates options from every ancestor and from the
//! endpoint itself, oldest ancestor first. Canonicalization turns that raw
//! stream into the final section:
//!
//! 1. **Singleton** keys keep one entry. A later occurrence replaces the
//!    value but the entry stays where the key was first seen.
//! 2. **Repeatable** keys keep every distinct value in stream order; exact
//!    `(key, value)` duplicates are dropped.
//! 3. The section lists all singleton entries first, then the repeatable
//!    entries.
//!
//! # Examples
//!
//! ```rust
//! use endpoint_config::{Canonicalizer, ConfigOption};
//!
//! let canonical = Canonicalizer::new().canonicalize(vec![
//!     ConfigOption::new("set_var", "A=1"),
//!     ConfigOption::new("dtmf_mode", "rfc4733"),
//!     ConfigOption::new("set_var", "A=1"),
//!     ConfigOption::new("dtmf_mode", "info"),
//! ]);
//!
//! assert_eq!(
//!     canonical.into_vec(),
//!     vec![
//!         ConfigOption::new("dtmf_mode", "info"),
//!         ConfigOption::new("set_var", "A=1"),
//!     ]
//! );
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::options::{ConfigOption, SectionOptions};

#[cfg(test)]
#[path = "canonicalizer_tests.rs"]
mod tests;

/// Keys that may appear several times in one section.
pub const DEFAULT_REPEATABLE_KEYS: [&str; 2] = ["set_var", "match"];

/// Folds a raw option stream into a canonical section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalizer {
    repeatable_keys: BTreeSet<String>,
}

impl Canonicalizer {
    /// Creates a canonicalizer that treats `set_var` and `match` as repeatable.
    pub fn new() -> Self {
        Self {
            repeatable_keys: DEFAULT_REPEATABLE_KEYS
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }

    /// Adds keys to the repeatable set.
    ///
    /// The default keys always stay repeatable.
    pub fn with_extra_repeatable_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.repeatable_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn is_repeatable(&self, key: &str) -> bool {
        self.repeatable_keys.contains(key)
    }

    pub fn repeatable_keys(&self) -> impl Iterator<Item = &str> {
        self.repeatable_keys.iter().map(String::as_str)
    }

    pub fn canonicalize<I>(&self, options: I) -> SectionOptions
    where
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut singletons: Vec<ConfigOption> = Vec::new();
        let mut singleton_index: HashMap<String, usize> = HashMap::new();
        let mut repeatables: Vec<ConfigOption> = Vec::new();
        let mut seen_repeatables: HashSet<ConfigOption> = HashSet::new();

        for option in options {
            if self.is_repeatable(option.key()) {
                if seen_repeatables.insert(option.clone()) {
                    repeatables.push(option);
                }
                continue;
            }

            match singleton_index.get(option.key()) {
                Some(&index) => singletons[index].1 = option.1,
                None => {
                    singleton_index.insert(option.0.clone(), singletons.len());
                    singletons.push(option);
                }
            }
        }

        singletons.extend(repeatables);
        SectionOptions::from(singletons)
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}
