//! Endpoint descriptors and the catalog that holds them.
//!
//! A descriptor is the raw, not yet merged configuration of one endpoint as
//! it was read from storage: its own options per section and the ordered
//! list of templates it inherits from. Descriptors reference their parents by
//! [`EndpointId`], so the whole inheritance graph is an arena keyed by id and
//! nothing is mutated once resolution starts.
//!
//! # TOML Format
//!
//! ```toml
//! [[endpoints]]
//! id = "global"
//! name = "global"
//! tenant_id = "tenant-a"
//! template = true
//! aor = [["qualify_frequency", "60"]]
//!
//! [[endpoints]]
//! id = "ep-1"
//! name = "abcdef"
//! tenant_id = "tenant-a"
//! parents = ["global"]
//! endpoint = [["context", "default"]]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{ResolutionError, ResolutionResult};
use crate::options::{ConfigOption, SectionKind};

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;

/// Opaque identifier of an endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EndpointId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Options declared directly on one descriptor, per section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSections {
    pub aor: Vec<ConfigOption>,
    pub auth: Vec<ConfigOption>,
    pub endpoint: Vec<ConfigOption>,
    pub identify: Vec<ConfigOption>,
    pub outbound_auth: Vec<ConfigOption>,
    pub registration: Vec<ConfigOption>,
    pub registration_outbound_auth: Vec<ConfigOption>,
}

impl RawSections {
    pub fn get(&self, kind: SectionKind) -> &[ConfigOption] {
        match kind {
            SectionKind::Aor => &self.aor,
            SectionKind::Auth => &self.auth,
            SectionKind::Endpoint => &self.endpoint,
            SectionKind::Identify => &self.identify,
            SectionKind::OutboundAuth => &self.outbound_auth,
            SectionKind::Registration => &self.registration,
            SectionKind::RegistrationOutboundAuth => &self.registration_outbound_auth,
        }
    }

    pub fn get_mut(&mut self, kind: SectionKind) -> &mut Vec<ConfigOption> {
        match kind {
            SectionKind::Aor => &mut self.aor,
            SectionKind::Auth => &mut self.auth,
            SectionKind::Endpoint => &mut self.endpoint,
            SectionKind::Identify => &mut self.identify,
            SectionKind::OutboundAuth => &mut self.outbound_auth,
            SectionKind::Registration => &mut self.registration,
            SectionKind::RegistrationOutboundAuth => &mut self.registration_outbound_auth,
        }
    }
}

/// Raw configuration of one endpoint or template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub id: EndpointId,

    /// Section name used in cross references (`aors`, `auth`, `endpoint`, ...).
    pub name: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub asterisk_id: Option<String>,

    pub tenant_id: String,

    /// Templates only exist to be inherited from and are never emitted.
    #[serde(default)]
    pub template: bool,

    /// Parent templates, oldest contribution first.
    #[serde(default)]
    pub parents: Vec<EndpointId>,

    /// Transport name; `None` means the server default transport.
    #[serde(default)]
    pub transport: Option<String>,

    #[serde(flatten)]
    pub options: RawSections,
}

impl EndpointDescriptor {
    pub fn new(
        id: impl Into<EndpointId>,
        name: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            label: String::new(),
            asterisk_id: None,
            tenant_id: tenant_id.into(),
            template: false,
            parents: Vec::new(),
            transport: None,
            options: RawSections::default(),
        }
    }

    pub fn as_template(mut self) -> Self {
        self.template = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_asterisk_id(mut self, asterisk_id: impl Into<String>) -> Self {
        self.asterisk_id = Some(asterisk_id.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<EndpointId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    pub fn with_transport(mut self, transport: impl Into<String>) -> Self {
        self.transport = Some(transport.into());
        self
    }

    pub fn with_option(
        mut self,
        kind: SectionKind,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.options
            .get_mut(kind)
            .push(ConfigOption::new(key, value));
        self
    }
}

/// All descriptors of one resolution request, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    descriptors: HashMap<EndpointId, EndpointDescriptor>,
}

impl EndpointCatalog {
    /// Builds a catalog, rejecting duplicate ids.
    ///
    /// Parent references are not checked here; the resolver reports a
    /// dangling parent when it reaches it.
    pub fn new<I>(descriptors: I) -> ResolutionResult<Self>
    where
        I: IntoIterator<Item = EndpointDescriptor>,
    {
        let mut catalog = Self::default();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, descriptor: EndpointDescriptor) -> ResolutionResult<()> {
        if self.descriptors.contains_key(&descriptor.id) {
            return Err(ResolutionError::DuplicateEndpoint {
                endpoint: descriptor.id,
            });
        }
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    pub fn get(&self, id: &EndpointId) -> Option<&EndpointDescriptor> {
        self.descriptors.get(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.descriptors.values()
    }
}
