//! Resolved endpoint configuration.
//!
//! A [`ResolvedEndpointConfig`] is the flattened configuration of one
//! concrete endpoint after template inheritance, owner injection and
//! canonicalization. It is handed to the configuration file serializer,
//! which renders one Asterisk section per non-empty option list.

use serde::{Deserialize, Serialize};

use crate::descriptor::EndpointId;
use crate::options::{SectionKind, SectionOptions};
use crate::section_builder::SectionSet;

/// The final configuration record of one concrete endpoint.
///
/// Empty sections are left out when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEndpointConfig {
    pub id: EndpointId,
    pub name: String,
    pub label: String,
    pub asterisk_id: Option<String>,
    pub tenant_id: String,

    #[serde(flatten)]
    pub sections: SectionSet,
}

impl ResolvedEndpointConfig {
    pub fn section(&self, kind: SectionKind) -> &SectionOptions {
        self.sections.get(kind)
    }

    pub fn aor(&self) -> &SectionOptions {
        &self.sections.aor
    }

    pub fn auth(&self) -> &SectionOptions {
        &self.sections.auth
    }

    pub fn endpoint(&self) -> &SectionOptions {
        &self.sections.endpoint
    }

    pub fn identify(&self) -> &SectionOptions {
        &self.sections.identify
    }

    pub fn outbound_auth(&self) -> &SectionOptions {
        &self.sections.outbound_auth
    }

    pub fn registration(&self) -> &SectionOptions {
        &self.sections.registration
    }

    pub fn registration_outbound_auth(&self) -> &SectionOptions {
        &self.sections.registration_outbound_auth
    }
}
