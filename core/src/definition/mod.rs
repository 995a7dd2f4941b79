//! # API Definition
//!
//! The read-only input graph consumed by a synthesis run. Definitions refer
//! to each other by qualified id (e.g. `CoreAPI/Objects/Time`); every map is
//! an `IndexMap` so declaration order survives into the generated document.

pub mod routes;
pub mod types;

pub use routes::{
    AuthenticatorDef, AuthenticatorKind, ControllerDef, EndpointDef, GroupDef, HttpMethod,
    RouteDef,
};
pub use types::{
    ArgumentDef, ArgumentSetDef, EnumDef, EnumValueDef, ErrorDef, FieldDef, FieldInclude, Member,
    ObjectDef, PolymorphDef, TypeDef, TypeRef,
};

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A complete API definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    /// Qualified id of the API itself.
    pub id: String,
    /// Display name, used as the document title.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Qualified id of the API-level authenticator.
    #[serde(default)]
    pub authenticator: Option<String>,
    /// Every authenticator known to the API.
    #[serde(default)]
    pub authenticators: IndexMap<String, AuthenticatorDef>,
    /// Controllers by qualified id.
    #[serde(default)]
    pub controllers: IndexMap<String, ControllerDef>,
    /// Endpoints by qualified id.
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointDef>,
    /// Objects, enums, argument sets and polymorphs by qualified id.
    #[serde(default)]
    pub types: IndexMap<String, TypeDef>,
    /// Errors by qualified id.
    #[serde(default)]
    pub errors: IndexMap<String, ErrorDef>,
    /// Route groups by qualified id.
    #[serde(default)]
    pub groups: IndexMap<String, GroupDef>,
    /// Routes in declaration order.
    #[serde(default)]
    pub routes: Vec<RouteDef>,
}

impl ApiDefinition {
    /// Parses a definition from YAML.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a definition from JSON.
    pub fn from_json(json: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Looks up an endpoint referenced by `owner`.
    pub fn endpoint(&self, id: &str, owner: &str) -> AppResult<&EndpointDef> {
        self.endpoints
            .get(id)
            .ok_or_else(|| AppError::malformed(owner, format!("unknown endpoint '{}'", id)))
    }

    /// Looks up an error referenced by `owner`.
    pub fn error(&self, id: &str, owner: &str) -> AppResult<&ErrorDef> {
        self.errors
            .get(id)
            .ok_or_else(|| AppError::malformed(owner, format!("unknown error '{}'", id)))
    }

    /// Looks up an authenticator referenced by `owner`.
    pub fn authenticator(&self, id: &str, owner: &str) -> AppResult<&AuthenticatorDef> {
        self.authenticators
            .get(id)
            .ok_or_else(|| AppError::malformed(owner, format!("unknown authenticator '{}'", id)))
    }

    /// Looks up a controller referenced by `owner`.
    pub fn controller(&self, id: &str, owner: &str) -> AppResult<&ControllerDef> {
        self.controllers
            .get(id)
            .ok_or_else(|| AppError::malformed(owner, format!("unknown controller '{}'", id)))
    }

    /// Looks up a group referenced by `owner`.
    pub fn group(&self, id: &str, owner: &str) -> AppResult<&GroupDef> {
        self.groups
            .get(id)
            .ok_or_else(|| AppError::malformed(owner, format!("unknown group '{}'", id)))
    }

    /// The group chain of a route, outermost group first.
    ///
    /// Fails if a parent link is dangling or the chain loops.
    pub fn group_chain(&self, route: &RouteDef) -> AppResult<Vec<(&str, &GroupDef)>> {
        let mut chain = Vec::new();
        let mut next = route.group.as_deref();
        let mut owner = route.path.as_str();
        while let Some(id) = next {
            if chain.iter().any(|(seen, _)| *seen == id) {
                return Err(AppError::malformed(id, "group parent chain loops"));
            }
            let (key, group) = self
                .groups
                .get_key_value(id)
                .ok_or_else(|| AppError::malformed(owner, format!("unknown group '{}'", id)))?;
            chain.push((key.as_str(), group));
            owner = key.as_str();
            next = group.parent.as_deref();
        }
        chain.reverse();
        Ok(chain)
    }
}
