//! Endpoint configuration resolution for the PBX configuration export.
//!
//! Endpoints (lines, trunks, meeting guests) inherit their SIP configuration
//! from chains of templates. This crate flattens such a template graph into
//! one resolved record per concrete endpoint, section by section (aor, auth,
//! endpoint, identify, outbound auth, registration, registration outbound
//! auth), and merges the function key templates of users.
//!
//! Resolution is pure and synchronous: rows are read by the caller, and the
//! resolved records are rendered by the caller.

// Data model
pub mod descriptor;
pub mod errors;
pub mod options;
pub mod owner;
pub mod resolved;
pub mod tenant;

// Resolution
pub mod canonicalizer;
pub mod entity;
pub mod orchestrator;
pub mod section_builder;

// Function keys
pub mod func_key_template;

// Input documents
pub mod dump;

#[cfg(test)]
mod integration_tests;

// Re-export for convenient access
pub use canonicalizer::{Canonicalizer, DEFAULT_REPEATABLE_KEYS};
pub use descriptor::{EndpointCatalog, EndpointDescriptor, EndpointId, RawSections};
pub use dump::{ConfigurationDump, DumpFormat, FuncKeyUser};
pub use entity::EntityResolver;
pub use errors::{ResolutionError, ResolutionResult};
pub use func_key_template::{user_func_keys, FuncKeyDestination, FuncKeyMapping, FuncKeyTemplate};
pub use options::{ConfigOption, SectionKind, SectionOptions};
pub use orchestrator::{ConfigItem, Resolution, ResolutionStats, TemplateGraphResolver};
pub use owner::{
    Extension, InjectedOptions, LineOwner, LineUser, MeetingGuestOwner, Owner, PickupMembership,
    PickupRole, TrunkOwner, Voicemail,
};
pub use resolved::ResolvedEndpointConfig;
pub use section_builder::{SectionBuilder, SectionSet};
pub use tenant::{TenantDirectory, TenantSettings};
