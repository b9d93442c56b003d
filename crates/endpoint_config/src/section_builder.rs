//! Per-section option building.
//!
//! Building one endpoint happens in two stages:
//!
//! 1. **Accumulation** ([`accumulate`]): for every section, the parents'
//!    accumulated sections (in parent order) followed by the endpoint's own
//!    options are canonicalized into the endpoint's *body*. Bodies are what
//!    descendants inherit.
//! 2. **Finalization** ([`SectionBuilder`]): the body is combined with the
//!    options injected by the owner, derived options and cross references,
//!    canonicalized again, and closed with the structural markers (`type`,
//!    `endpoint`, `outbound_auth`). Nothing added at this stage is inherited.
//!
//! A section whose result is empty gets no marker, and no other section
//! references it.

use serde::{Deserialize, Serialize};

use crate::canonicalizer::Canonicalizer;
use crate::descriptor::EndpointDescriptor;
use crate::options::{ConfigOption, SectionKind, SectionOptions};
use crate::owner::InjectedOptions;
use crate::tenant::tenant_marker;

#[cfg(test)]
#[path = "section_builder_tests.rs"]
mod tests;

/// One option list per section kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSet {
    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub aor: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub auth: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub endpoint: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub identify: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub outbound_auth: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub registration: SectionOptions,

    #[serde(skip_serializing_if = "SectionOptions::is_empty")]
    pub registration_outbound_auth: SectionOptions,
}

impl SectionSet {
    pub fn get(&self, kind: SectionKind) -> &SectionOptions {
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

    fn slot(&mut self, kind: SectionKind) -> &mut SectionOptions {
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

    pub fn set(&mut self, kind: SectionKind, options: SectionOptions) {
        *self.slot(kind) = options;
    }

    /// Kinds whose section holds at least one option.
    pub fn populated_kinds(&self) -> impl Iterator<Item = SectionKind> + '_ {
        SectionKind::ALL
            .into_iter()
            .filter(move |kind| !self.get(*kind).is_empty())
    }
}

/// Accumulates the body of every section of `descriptor`.
///
/// `parents` are the bodies of the descriptor's parents, in the order the
/// descriptor lists them.
pub fn accumulate(
    canonicalizer: &Canonicalizer,
    descriptor: &EndpointDescriptor,
    parents: &[&SectionSet],
) -> SectionSet {
    let mut body = SectionSet::default();
    for kind in SectionKind::ALL {
        let stream = parents
            .iter()
            .flat_map(|parent| parent.get(kind).iter().cloned())
            .chain(descriptor.options.get(kind).iter().cloned());
        body.set(kind, canonicalizer.canonicalize(stream));
    }
    body
}

/// Finalizes the sections of one endpoint from its accumulated body.
pub struct SectionBuilder<'a> {
    canonicalizer: &'a Canonicalizer,
    descriptor: &'a EndpointDescriptor,
    body: &'a SectionSet,
    injected: InjectedOptions,
}

impl<'a> SectionBuilder<'a> {
    pub fn new(
        canonicalizer: &'a Canonicalizer,
        descriptor: &'a EndpointDescriptor,
        body: &'a SectionSet,
        injected: InjectedOptions,
    ) -> Self {
        Self {
            canonicalizer,
            descriptor,
            body,
            injected,
        }
    }

    /// Builds every section, referenced sections first.
    pub fn build(&self) -> SectionSet {
        let mut sections = SectionSet::default();
        for kind in SectionKind::ALL {
            let options = match kind {
                SectionKind::Aor => self.build_aor(),
                SectionKind::Identify => self.build_identify(),
                SectionKind::Registration => {
                    self.build_registration(&sections.registration_outbound_auth)
                }
                SectionKind::Endpoint => self.build_endpoint(&sections),
                _ => self.build_simple(kind),
            };
            sections.set(kind, options);
        }
        sections
    }

    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn close(&self, kind: SectionKind, mut options: SectionOptions) -> SectionOptions {
        if !options.is_empty() {
            options.push("type", kind.type_marker());
        }
        options
    }

    pub fn build_simple(&self, kind: SectionKind) -> SectionOptions {
        self.close(kind, self.body.get(kind).clone())
    }

    pub fn build_aor(&self) -> SectionOptions {
        let stream = self
            .body
            .aor
            .iter()
            .cloned()
            .chain(self.injected.aor.iter().cloned());
        self.close(SectionKind::Aor, self.canonicalizer.canonicalize(stream))
    }

    pub fn build_identify(&self) -> SectionOptions {
        let mut options = self.build_simple(SectionKind::Identify);
        if !options.is_empty() {
            options.push("endpoint", self.name());
        }
        options
    }

    pub fn build_registration(&self, outbound_auth: &SectionOptions) -> SectionOptions {
        let mut options = self.build_simple(SectionKind::Registration);
        if !options.is_empty() {
            options.push("endpoint", self.name());
            if !outbound_auth.is_empty() {
                options.push("outbound_auth", format!("auth_reg_{}", self.name()));
            }
        }
        options
    }

    /// Builds the endpoint section.
    ///
    /// `built` must already hold the aor, auth and outbound auth sections.
    pub fn build_endpoint(&self, built: &SectionSet) -> SectionOptions {
        let mut stream: Vec<ConfigOption> = vec![tenant_marker(&self.descriptor.tenant_id)];
        stream.extend(self.injected.endpoint.iter().cloned());
        stream.extend(self.body.endpoint.iter().cloned());

        if let Some(transport) = &self.descriptor.transport {
            stream.push(ConfigOption::new("transport", transport.as_str()));
        }

        let caller_id = stream
            .iter()
            .rev()
            .find(|option| option.key() == "callerid")
            .map(|option| option.value().to_string());
        if let Some(caller_id) = caller_id {
            stream.push(ConfigOption::new(
                "set_var",
                format!("XIVO_ORIGINAL_CALLER_ID={caller_id}"),
            ));
        }

        if !built.aor.is_empty() {
            stream.push(ConfigOption::new("aors", self.name()));
        }
        if !built.auth.is_empty() {
            stream.push(ConfigOption::new("auth", self.name()));
        }

        let mut options = self.close(
            SectionKind::Endpoint,
            self.canonicalizer.canonicalize(stream),
        );
        if !options.is_empty() && !built.outbound_auth.is_empty() {
            options.push("outbound_auth", format!("outbound_auth_{}", self.name()));
        }
        options
    }
}
