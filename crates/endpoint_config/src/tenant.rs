//! Tenant-wide settings that leak into every endpoint of the tenant.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::options::ConfigOption;

#[cfg(test)]
#[path = "tenant_tests.rs"]
mod tests;

/// Call recording announcement files configured for a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSettings {
    #[serde(default)]
    pub start_announcement: Option<String>,

    #[serde(default)]
    pub stop_announcement: Option<String>,
}

impl TenantSettings {
    /// MixMonitor option string: `p(<start>)P(<stop>)`, omitting unset clauses.
    pub fn mixmonitor_options(&self) -> String {
        let mut options = String::new();
        if let Some(start) = &self.start_announcement {
            options.push_str(&format!("p({start})"));
        }
        if let Some(stop) = &self.stop_announcement {
            options.push_str(&format!("P({stop})"));
        }
        options
    }

    /// The `set_var` every owner variant injects into its endpoint section.
    pub fn recording_announcement_option(&self) -> ConfigOption {
        ConfigOption::new(
            "set_var",
            format!("WAZO_MIXMONITOR_OPTIONS={}", self.mixmonitor_options()),
        )
    }
}

/// Marker identifying the owning tenant on an endpoint section.
pub fn tenant_marker(tenant_id: &str) -> ConfigOption {
    ConfigOption::new("set_var", format!("__WAZO_TENANT_UUID={tenant_id}"))
}

/// `tenant_id -> settings` lookup.
///
/// Tenants without an entry have no announcements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantDirectory {
    tenants: HashMap<String, TenantSettings>,
}

impl TenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tenant_id: impl Into<String>, settings: TenantSettings) {
        self.tenants.insert(tenant_id.into(), settings);
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>, settings: TenantSettings) -> Self {
        self.insert(tenant_id, settings);
        self
    }

    pub fn settings(&self, tenant_id: &str) -> TenantSettings {
        self.tenants.get(tenant_id).cloned().unwrap_or_default()
    }
}
