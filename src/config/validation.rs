//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject discovery methods other than serf
//! - Validate value ranges (cycle delay > 0, non-empty paths)
//! - Detect duplicate service names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DiscoveryConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{DiscoveryConfig, ServiceConfig, SERF_METHOD};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("service #{index} has an empty name")]
    EmptyServiceName { index: usize },

    #[error("service {0:?} is defined more than once")]
    DuplicateService(String),

    #[error("service {service:?}: invalid discovery method {method:?}")]
    InvalidMethod { service: String, method: String },

    #[error("service {0:?}: discovery path is empty")]
    EmptyPath(String),

    #[error("service {0:?}: cycle_delay_ms must be greater than 0")]
    ZeroCycleDelay(String),

    #[error("service {service:?}: default server {server:?} needs a host and a port")]
    IncompleteDefaultServer { service: String, server: String },
}

/// Validate the whole configuration.
pub fn validate_config(config: &DiscoveryConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (index, service) in config.services.iter().enumerate() {
        if service.name.is_empty() {
            errors.push(ValidationError::EmptyServiceName { index });
        } else if !seen.insert(service.name.as_str()) {
            errors.push(ValidationError::DuplicateService(service.name.clone()));
        }
        validate_service(service, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_service(service: &ServiceConfig, errors: &mut Vec<ValidationError>) {
    let name = &service.name;
    let discovery = &service.discovery;

    if discovery.method != SERF_METHOD {
        errors.push(ValidationError::InvalidMethod {
            service: name.clone(),
            method: discovery.method.clone(),
        });
    }
    if discovery.path.is_empty() {
        errors.push(ValidationError::EmptyPath(name.clone()));
    }
    if discovery.cycle_delay_ms == 0 {
        errors.push(ValidationError::ZeroCycleDelay(name.clone()));
    }
    for server in &service.default_servers {
        if server.host.is_empty() || server.port.is_empty() {
            errors.push(ValidationError::IncompleteDefaultServer {
                service: name.clone(),
                server: server.name.clone(),
            });
        }
    }
}
