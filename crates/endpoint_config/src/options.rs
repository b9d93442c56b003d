//! Configuration options and the sections that group them.
//!
//! An option is a plain `(key, value)` pair of strings. A section is an
//! ordered list of options that has already been through the
//! [`Canonicalizer`](crate::canonicalizer::Canonicalizer); order inside a
//! section is part of its contract.

use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;

/// A single `(key, value)` configuration option.
///
/// Serializes as a two element array, which keeps input documents compact:
///
/// ```toml
/// endpoint = [["context", "default"], ["dtmf_mode", "rfc4733"]]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigOption(pub String, pub String);

impl ConfigOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self(key.into(), value.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }

    pub fn value(&self) -> &str {
        &self.1
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for ConfigOption {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// The logical sections of an endpoint configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Aor,
    Auth,
    Endpoint,
    Identify,
    OutboundAuth,
    Registration,
    RegistrationOutboundAuth,
}

impl SectionKind {
    /// All section kinds, in the order the resolver builds them.
    ///
    /// `Endpoint` and `Registration` come after the sections they reference.
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Aor,
        SectionKind::Auth,
        SectionKind::OutboundAuth,
        SectionKind::RegistrationOutboundAuth,
        SectionKind::Identify,
        SectionKind::Registration,
        SectionKind::Endpoint,
    ];

    /// Value of the `type` marker appended to a non-empty section.
    pub fn type_marker(self) -> &'static str {
        match self {
            SectionKind::Aor => "aor",
            SectionKind::Auth => "auth",
            SectionKind::Endpoint => "endpoint",
            SectionKind::Identify => "identify",
            SectionKind::OutboundAuth => "auth",
            SectionKind::Registration => "registration",
            SectionKind::RegistrationOutboundAuth => "auth",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Aor => "aor",
            SectionKind::Auth => "auth",
            SectionKind::Endpoint => "endpoint",
            SectionKind::Identify => "identify",
            SectionKind::OutboundAuth => "outbound_auth",
            SectionKind::Registration => "registration",
            SectionKind::RegistrationOutboundAuth => "registration_outbound_auth",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, canonicalized list of options for one section.
///
/// Empty sections are meaningful: they contribute no `type` marker and no
/// cross reference to any other section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionOptions(Vec<ConfigOption>);

impl SectionOptions {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConfigOption> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ConfigOption] {
        &self.0
    }

    /// Returns the last value recorded for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|option| option.key() == key)
            .map(ConfigOption::value)
    }

    /// Returns every value recorded for `key`, in section order.
    pub fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |option| option.key() == key)
            .map(ConfigOption::value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|option| option.key() == key)
    }

    /// Appends an option without any deduplication.
    ///
    /// Only used for the structural markers added after canonicalization.
    pub(crate) fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(ConfigOption::new(key, value));
    }

    pub fn into_vec(self) -> Vec<ConfigOption> {
        self.0
    }
}

impl From<Vec<ConfigOption>> for SectionOptions {
    fn from(options: Vec<ConfigOption>) -> Self {
        Self(options)
    }
}

impl<'a> IntoIterator for &'a SectionOptions {
    type Item = &'a ConfigOption;
    type IntoIter = std::slice::Iter<'a, ConfigOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for SectionOptions {
    type Item = ConfigOption;
    type IntoIter = std::vec::IntoIter<ConfigOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
