//! Template graph orchestration.
//!
//! The orchestrator turns a list of configuration items (a line, trunk or
//! meeting guest together with the endpoint it owns) into one resolved record
//! per concrete endpoint:
//!
//! 1. Each item's endpoint is visited depth first. Every ancestor is built
//!    before its descendants, so a section builder only ever looks up parent
//!    sections that already exist.
//! 2. Built resolvers are memoized by endpoint id. A template shared by many
//!    endpoints, including diamond shapes, is built exactly once per
//!    resolution.
//! 3. Records are materialized for non-template descriptors only.
//!
//! Nothing is shared between two calls to [`TemplateGraphResolver::resolve`];
//! concurrent resolutions need no coordination.
//!
//! # Examples
//!
//! ```rust
//! use endpoint_config::{
//!     ConfigItem, EndpointCatalog, EndpointDescriptor, Owner, SectionKind,
//!     TemplateGraphResolver, TenantDirectory, TrunkOwner,
//! };
//!
//! let catalog = EndpointCatalog::new(vec![
//!     EndpointDescriptor::new("global", "global", "tenant-a")
//!         .as_template()
//!         .with_option(SectionKind::Aor, "qualify_frequency", "30"),
//!     EndpointDescriptor::new("ep-1", "provider", "tenant-a").with_parent("global"),
//! ])?;
//! let items = vec![ConfigItem::new("ep-1", Owner::Trunk(TrunkOwner::default()))];
//!
//! let resolution =
//!     TemplateGraphResolver::new().resolve(&catalog, &items, &TenantDirectory::new())?;
//!
//! assert_eq!(resolution.records.len(), 1);
//! assert_eq!(resolution.records[0].aor().get("qualify_frequency"), Some("30"));
//! # Ok::<(), endpoint_config::ResolutionError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

use crate::canonicalizer::Canonicalizer;
use crate::descriptor::{EndpointCatalog, EndpointDescriptor, EndpointId};
use crate::entity::EntityResolver;
use crate::errors::{ResolutionError, ResolutionResult};
use crate::owner::Owner;
use crate::resolved::ResolvedEndpointConfig;
use crate::section_builder::SectionSet;
use crate::tenant::TenantDirectory;

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// A line, trunk or meeting guest and the endpoint it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigItem {
    pub endpoint: EndpointId,
    pub owner: Owner,
}

impl ConfigItem {
    pub fn new(endpoint: impl Into<EndpointId>, owner: Owner) -> Self {
        Self {
            endpoint: endpoint.into(),
            owner,
        }
    }
}

/// Counters describing one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    /// Descriptors built, templates included. Each is built at most once.
    pub descriptors_built: usize,
    /// Templates built and consumed but not emitted.
    pub templates_skipped: usize,
    pub records_emitted: usize,
}

/// Output of [`TemplateGraphResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub records: Vec<ResolvedEndpointConfig>,
    pub stats: ResolutionStats,
}

/// Resolves configuration items against their template graph.
#[derive(Debug, Clone, Default)]
pub struct TemplateGraphResolver {
    canonicalizer: Canonicalizer,
}

impl TemplateGraphResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canonicalizer(canonicalizer: Canonicalizer) -> Self {
        Self { canonicalizer }
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Resolves every item and returns one record per concrete endpoint.
    ///
    /// Records are in visit order: ancestors before descendants, items in
    /// input order otherwise.
    ///
    /// # Errors
    ///
    /// Fails without emitting anything when an item or a parent reference
    /// points at a missing descriptor, when the inheritance graph has a
    /// cycle, when an endpoint has zero or several owners where exactly one
    /// is required, or when an item claims a template.
    #[instrument(skip_all, fields(items = items.len(), endpoints = catalog.len()))]
    pub fn resolve(
        &self,
        catalog: &EndpointCatalog,
        items: &[ConfigItem],
        tenants: &TenantDirectory,
    ) -> ResolutionResult<Resolution> {
        let owners = collect_owners(catalog, items)?;
        let mut graph = TemplateGraph::new(&self.canonicalizer, catalog, owners);

        for item in items {
            debug!(
                endpoint = %item.endpoint,
                owner = item.owner.kind(),
                "Visiting configuration item"
            );
            graph.visit(&item.endpoint, None)?;
        }

        let mut stats = ResolutionStats {
            descriptors_built: graph.resolvers.len(),
            ..ResolutionStats::default()
        };
        let mut records = Vec::new();
        for resolver in &graph.resolvers {
            if resolver.is_template() {
                stats.templates_skipped += 1;
                continue;
            }
            if resolver.owner().is_none() {
                return Err(ResolutionError::MissingOwner {
                    endpoint: resolver.id().clone(),
                });
            }
            let tenant = tenants.settings(&resolver.descriptor().tenant_id);
            records.push(resolver.resolve(&self.canonicalizer, &tenant));
        }
        stats.records_emitted = records.len();

        info!(
            descriptors = stats.descriptors_built,
            templates = stats.templates_skipped,
            records = stats.records_emitted,
            "Resolved endpoint configuration"
        );
        Ok(Resolution { records, stats })
    }
}

fn collect_owners<'a>(
    catalog: &EndpointCatalog,
    items: &'a [ConfigItem],
) -> ResolutionResult<HashMap<EndpointId, &'a Owner>> {
    let mut owners: HashMap<EndpointId, &'a Owner> = HashMap::new();
    for item in items {
        if let Some(descriptor) = catalog.get(&item.endpoint) {
            if descriptor.template {
                return Err(ResolutionError::TemplateOwned {
                    endpoint: item.endpoint.clone(),
                    owner: item.owner.kind(),
                });
            }
        }
        if let Some(existing) = owners.insert(item.endpoint.clone(), &item.owner) {
            return Err(ResolutionError::ConflictingOwner {
                endpoint: item.endpoint.clone(),
                first: existing.kind(),
                second: item.owner.kind(),
            });
        }
    }
    Ok(owners)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Built(usize),
}

/// Memoized resolvers of one resolution, in build order.
struct TemplateGraph<'a> {
    canonicalizer: &'a Canonicalizer,
    catalog: &'a EndpointCatalog,
    owners: HashMap<EndpointId, &'a Owner>,
    states: HashMap<EndpointId, VisitState>,
    path: Vec<EndpointId>,
    resolvers: Vec<EntityResolver<'a>>,
}

impl<'a> TemplateGraph<'a> {
    fn new(
        canonicalizer: &'a Canonicalizer,
        catalog: &'a EndpointCatalog,
        owners: HashMap<EndpointId, &'a Owner>,
    ) -> Self {
        Self {
            canonicalizer,
            catalog,
            owners,
            states: HashMap::new(),
            path: Vec::new(),
            resolvers: Vec::new(),
        }
    }

    fn lookup(
        &self,
        id: &EndpointId,
        child: Option<&EndpointId>,
    ) -> ResolutionResult<&'a EndpointDescriptor> {
        let catalog = self.catalog;
        catalog.get(id).ok_or_else(|| match child {
            Some(child) => ResolutionError::MissingParent {
                endpoint: child.clone(),
                parent: id.clone(),
            },
            None => ResolutionError::UnknownEndpoint {
                endpoint: id.clone(),
            },
        })
    }

    /// Builds `id` after all of its ancestors and returns its build index.
    fn visit(&mut self, id: &EndpointId, child: Option<&EndpointId>) -> ResolutionResult<usize> {
        match self.states.get(id) {
            Some(VisitState::Built(index)) => return Ok(*index),
            Some(VisitState::InProgress) => {
                let start = self.path.iter().position(|p| p == id).unwrap_or(0);
                let mut chain = self.path[start..].to_vec();
                chain.push(id.clone());
                return Err(ResolutionError::InheritanceCycle { chain });
            }
            None => {}
        }

        let descriptor = self.lookup(id, child)?;
        self.states.insert(id.clone(), VisitState::InProgress);
        self.path.push(id.clone());

        let mut parent_indices = Vec::with_capacity(descriptor.parents.len());
        for parent in &descriptor.parents {
            parent_indices.push(self.visit(parent, Some(id))?);
        }

        let parents: Vec<&SectionSet> = parent_indices
            .iter()
            .map(|index| self.resolvers[*index].inherited())
            .collect();
        let owner = self.owners.get(id).copied();
        let resolver = EntityResolver::new(self.canonicalizer, descriptor, owner, &parents);

        let index = self.resolvers.len();
        self.resolvers.push(resolver);
        self.path.pop();
        self.states.insert(id.clone(), VisitState::Built(index));
        debug!(endpoint = %id, template = descriptor.template, "Built endpoint resolver");
        Ok(index)
    }
}
