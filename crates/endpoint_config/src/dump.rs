//! Configuration dump documents.
//!
//! A dump is everything the resolver needs for one request, as exported by
//! the storage layer: endpoint descriptors, the items that own them, tenant
//! settings and function key templates. Dumps are read from TOML or JSON.
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
//!
//! [[items]]
//! endpoint = "ep-1"
//! owner = { type = "trunk", context = "from-extern" }
//!
//! [tenants.tenant-a]
//! start_announcement = "recording-started"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::descriptor::{EndpointCatalog, EndpointDescriptor};
use crate::errors::{ResolutionError, ResolutionResult};
use crate::func_key_template::{user_func_keys, FuncKeyTemplate};
use crate::orchestrator::{ConfigItem, Resolution, TemplateGraphResolver};
use crate::tenant::TenantDirectory;

#[cfg(test)]
#[path = "dump_tests.rs"]
mod tests;

/// Encoding of a dump document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpFormat {
    Toml,
    Json,
}

impl DumpFormat {
    /// Picks the format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DumpFormat::Json,
            _ => DumpFormat::Toml,
        }
    }
}

/// Function key templates attached to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncKeyUser {
    pub user_id: u64,

    #[serde(default)]
    pub public_template: Option<u64>,

    #[serde(default)]
    pub private_template: Option<u64>,
}

/// Input of one resolution request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationDump {
    pub endpoints: Vec<EndpointDescriptor>,
    pub items: Vec<ConfigItem>,
    pub tenants: TenantDirectory,
    pub func_key_templates: Vec<FuncKeyTemplate>,
    pub func_key_users: Vec<FuncKeyUser>,
}

impl ConfigurationDump {
    pub fn parse(content: &str, format: DumpFormat) -> ResolutionResult<Self> {
        let dump: ConfigurationDump = match format {
            DumpFormat::Toml => toml::from_str(content).map_err(|e| ResolutionError::ParseError {
                reason: e.to_string(),
            })?,
            DumpFormat::Json => {
                serde_json::from_str(content).map_err(|e| ResolutionError::ParseError {
                    reason: e.to_string(),
                })?
            }
        };
        debug!(
            endpoints = dump.endpoints.len(),
            items = dump.items.len(),
            ?format,
            "Parsed configuration dump"
        );
        Ok(dump)
    }

    pub fn catalog(&self) -> ResolutionResult<EndpointCatalog> {
        EndpointCatalog::new(self.endpoints.iter().cloned())
    }

    /// Resolves every item of the dump.
    pub fn resolve(&self, resolver: &TemplateGraphResolver) -> ResolutionResult<Resolution> {
        let catalog = self.catalog()?;
        resolver.resolve(&catalog, &self.items, &self.tenants)
    }

    pub fn func_key_template(&self, template_id: u64) -> ResolutionResult<&FuncKeyTemplate> {
        self.func_key_templates
            .iter()
            .find(|template| template.id == Some(template_id))
            .ok_or(ResolutionError::UnknownFuncKeyTemplate { template_id })
    }

    /// Effective function keys of `user_id`, or `None` for an unknown user.
    pub fn user_func_keys(&self, user_id: u64) -> ResolutionResult<Option<FuncKeyTemplate>> {
        let Some(user) = self.func_key_users.iter().find(|u| u.user_id == user_id) else {
            return Ok(None);
        };
        let public = user
            .public_template
            .map(|id| self.func_key_template(id))
            .transpose()?;
        let private = user
            .private_template
            .map(|id| self.func_key_template(id))
            .transpose()?;
        Ok(Some(user_func_keys(public, private)))
    }
}
