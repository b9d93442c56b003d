//! Endpoint configuration error types.
//!
//! Domain-specific errors for template graph resolution and for
//! loading the configuration documents that feed it.

use thiserror::Error;

use crate::descriptor::EndpointId;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Endpoint configuration errors.
///
/// Every variant except [`ResolutionError::ParseError`] describes a broken
/// invariant of the input graph. None of them is recoverable: a partially
/// resolved telephony configuration is worse than none, so the whole
/// resolution stops at the first one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Endpoint '{endpoint}' inherits from unknown template '{parent}'")]
    MissingParent {
        endpoint: EndpointId,
        parent: EndpointId,
    },

    #[error("Endpoint '{endpoint}' is declared more than once")]
    DuplicateEndpoint { endpoint: EndpointId },

    #[error("Configuration item references unknown endpoint '{endpoint}'")]
    UnknownEndpoint { endpoint: EndpointId },

    #[error("Template inheritance cycle detected: {}", format_chain(.chain))]
    InheritanceCycle { chain: Vec<EndpointId> },

    #[error("Endpoint '{endpoint}' is not a template but no line, trunk or meeting owns it")]
    MissingOwner { endpoint: EndpointId },

    #[error("Endpoint '{endpoint}' is owned by both a {first} and a {second}")]
    ConflictingOwner {
        endpoint: EndpointId,
        first: &'static str,
        second: &'static str,
    },

    #[error("Endpoint '{endpoint}' is a template and cannot be owned by a {owner}")]
    TemplateOwned {
        endpoint: EndpointId,
        owner: &'static str,
    },

    #[error("Function key template {template_id} is not defined")]
    UnknownFuncKeyTemplate { template_id: u64 },

    #[error("Failed to parse configuration document: {reason}")]
    ParseError { reason: String },
}

fn format_chain(chain: &[EndpointId]) -> String {
    chain
        .iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type alias for endpoint configuration operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;
