//! Entity resolver for one endpoint descriptor.

use tracing::trace;

use crate::canonicalizer::Canonicalizer;
use crate::descriptor::{EndpointDescriptor, EndpointId};
use crate::owner::{InjectedOptions, Owner};
use crate::resolved::ResolvedEndpointConfig;
use crate::section_builder::{accumulate, SectionBuilder, SectionSet};
use crate::tenant::TenantSettings;

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;

/// Wraps one descriptor together with its accumulated sections.
///
/// The accumulated body is computed once, at construction, from the bodies
/// of the already built parents. Descendants read it through
/// [`EntityResolver::inherited`]; [`EntityResolver::resolve`] finalizes it
/// into the record emitted for a concrete endpoint.
#[derive(Debug, Clone)]
pub struct EntityResolver<'a> {
    descriptor: &'a EndpointDescriptor,
    owner: Option<&'a Owner>,
    body: SectionSet,
}

impl<'a> EntityResolver<'a> {
    pub fn new(
        canonicalizer: &Canonicalizer,
        descriptor: &'a EndpointDescriptor,
        owner: Option<&'a Owner>,
        parents: &[&SectionSet],
    ) -> Self {
        trace!(
            endpoint = %descriptor.id,
            parents = parents.len(),
            "Accumulating endpoint sections"
        );
        Self {
            descriptor,
            owner,
            body: accumulate(canonicalizer, descriptor, parents),
        }
    }

    pub fn id(&self) -> &EndpointId {
        &self.descriptor.id
    }

    pub fn descriptor(&self) -> &EndpointDescriptor {
        self.descriptor
    }

    pub fn owner(&self) -> Option<&Owner> {
        self.owner
    }

    pub fn is_template(&self) -> bool {
        self.descriptor.template
    }

    /// Sections as seen by descendants of this descriptor.
    pub fn inherited(&self) -> &SectionSet {
        &self.body
    }

    /// Materializes the final record.
    ///
    /// Templates have no owner and resolve with the tenant marker as their
    /// only injected option.
    pub fn resolve(
        &self,
        canonicalizer: &Canonicalizer,
        tenant: &TenantSettings,
    ) -> ResolvedEndpointConfig {
        let injected = self
            .owner
            .map(|owner| owner.injected_options(tenant))
            .unwrap_or_else(InjectedOptions::default);
        let sections =
            SectionBuilder::new(canonicalizer, self.descriptor, &self.body, injected).build();

        ResolvedEndpointConfig {
            id: self.descriptor.id.clone(),
            name: self.descriptor.name.clone(),
            label: self.descriptor.label.clone(),
            asterisk_id: self.descriptor.asterisk_id.clone(),
            tenant_id: self.descriptor.tenant_id.clone(),
            sections,
        }
    }
}
