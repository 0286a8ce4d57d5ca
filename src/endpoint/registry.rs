//! Two-phase endpoint registry.
//!
//! Declarations are collected on a [`RegistryBuilder`] once at startup and
//! frozen into an [`EndpointRegistry`]. Nothing registers endpoints after
//! `build`, so lookups never depend on module initialization order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::transport::ApiError;

use super::{EndpointDefinition, EndpointKind, MutationDefinition, QueryDefinition};

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    endpoints: HashMap<&'static str, EndpointDefinition>,
    skipped: Vec<&'static str>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. A name that is already declared keeps its
    /// existing definition; returns whether `definition` was inserted.
    pub fn declare(&mut self, definition: EndpointDefinition) -> bool {
        let name = definition.name();
        if self.endpoints.contains_key(name) {
            debug!(
                endpoint = name,
                kind = %definition.kind(),
                "endpoint already declared, keeping existing definition"
            );
            self.skipped.push(name);
            return false;
        }
        self.endpoints.insert(name, definition);
        true
    }

    /// Register a declaration, replacing any existing one with the same name.
    pub fn declare_override(&mut self, definition: EndpointDefinition) {
        let name = definition.name();
        if let Some(previous) = self.endpoints.insert(name, definition) {
            info!(
                endpoint = name,
                previous_kind = %previous.kind(),
                "endpoint declaration overridden"
            );
        }
    }

    /// Names whose declaration was ignored because they already existed.
    pub fn skipped(&self) -> &[&'static str] {
        &self.skipped
    }

    pub fn build(self) -> EndpointRegistry {
        EndpointRegistry {
            endpoints: self.endpoints,
        }
    }
}

/// Immutable catalog of every endpoint the client may invoke.
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<&'static str, EndpointDefinition>,
}

impl EndpointRegistry {
    pub fn get(&self, name: &str) -> Option<&EndpointDefinition> {
        self.endpoints.get(name)
    }

    pub fn query(&self, name: &str) -> Result<Arc<QueryDefinition>, ApiError> {
        match self.endpoints.get(name) {
            Some(EndpointDefinition::Query(def)) => Ok(Arc::clone(def)),
            Some(other) => Err(wrong_kind(name, EndpointKind::Query, other.kind())),
            None => Err(undeclared(name)),
        }
    }

    pub fn mutation(&self, name: &str) -> Result<Arc<MutationDefinition>, ApiError> {
        match self.endpoints.get(name) {
            Some(EndpointDefinition::Mutation(def)) => Ok(Arc::clone(def)),
            Some(other) => Err(wrong_kind(name, EndpointKind::Mutation, other.kind())),
            None => Err(undeclared(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    /// Declared names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.endpoints.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn undeclared(name: &str) -> ApiError {
    ApiError::request(format!("endpoint `{name}` is not declared"))
}

fn wrong_kind(name: &str, wanted: EndpointKind, found: EndpointKind) -> ApiError {
    ApiError::request(format!(
        "endpoint `{name}` is declared as a {found}, not a {wanted}"
    ))
}

#[cfg(test)]
mod tests {
    use deptportal_api_types::NoArgs;

    use super::*;
    use crate::cache::TagType;
    use crate::endpoint::{MutationEndpoint, QueryEndpoint, TagSpec};
    use crate::transport::ApiRequest;

    fn logs_v1(_: &NoArgs) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get("email-logs"))
    }

    fn logs_v2(_: &NoArgs) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::get("admin/email-logs"))
    }

    fn touch(_: &NoArgs) -> Result<ApiRequest, ApiError> {
        Ok(ApiRequest::post("email-logs/touch"))
    }

    const LOGS_V1: QueryEndpoint<NoArgs, serde_json::Value> =
        QueryEndpoint::new("getEmailLogs", logs_v1, TagSpec::Types(&[TagType::EmailLog]));
    const LOGS_V2: QueryEndpoint<NoArgs, serde_json::Value> =
        QueryEndpoint::new("getEmailLogs", logs_v2, TagSpec::Types(&[TagType::EmailLog]));
    const TOUCH: MutationEndpoint<NoArgs, serde_json::Value> =
        MutationEndpoint::new("touchEmailLogs", touch, TagSpec::None);

    fn path_of(registry: &EndpointRegistry) -> String {
        let def = registry.query("getEmailLogs").expect("declared");
        def.build_request(&NoArgs::default()).expect("request").path
    }

    #[test]
    fn duplicate_declaration_keeps_the_first() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.declare(LOGS_V1.definition()));
        assert!(!builder.declare(LOGS_V2.definition()));
        assert_eq!(builder.skipped(), ["getEmailLogs"]);
        let registry = builder.build();
        assert_eq!(path_of(&registry), "email-logs");
    }

    #[test]
    fn override_replaces_existing_declaration() {
        let mut builder = RegistryBuilder::new();
        builder.declare(LOGS_V1.definition());
        builder.declare_override(LOGS_V2.definition());
        let registry = builder.build();
        assert_eq!(registry.len(), 1);
        assert_eq!(path_of(&registry), "admin/email-logs");
    }

    #[test]
    fn lookups_check_kind_and_presence() {
        let mut builder = RegistryBuilder::new();
        builder.declare(TOUCH.definition());
        let registry = builder.build();

        assert!(registry.mutation("touchEmailLogs").is_ok());
        let err = registry.query("touchEmailLogs").err().expect("wrong kind");
        assert_eq!(
            err,
            ApiError::request("endpoint `touchEmailLogs` is declared as a mutation, not a query")
        );
        let err = registry.query("missing").err().expect("undeclared");
        assert_eq!(err.message(), "endpoint `missing` is not declared");
        assert_eq!(registry.names(), vec!["touchEmailLogs"]);
    }
}
