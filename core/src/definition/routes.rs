//! # Routes and Endpoints
//!
//! The routing half of the API definition: routes, the groups they live in,
//! the endpoints they dispatch to, and the controllers/authenticators that
//! contribute potential errors.

use crate::definition::types::{ArgumentDef, FieldDef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// HTTP methods a route may be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Lower-case method name, as used for OpenAPI path item keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

fn default_http_status() -> u16 {
    200
}

/// A single routable path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDef {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template, e.g. `test/:object`.
    pub path: String,
    /// Qualified id of the endpoint served.
    pub endpoint: String,
    /// Qualified id of the owning controller.
    #[serde(default)]
    pub controller: Option<String>,
    /// Qualified id of the innermost group.
    #[serde(default)]
    pub group: Option<String>,
}

/// A route group; groups nest through `parent`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDef {
    /// Display name, used as the tag name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description, used as the tag description.
    #[serde(default)]
    pub description: Option<String>,
    /// Qualified id of the enclosing group.
    #[serde(default)]
    pub parent: Option<String>,
    /// Whether routes in this group are documented.
    #[serde(default = "default_true")]
    pub schema: bool,
}

/// An endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointDef {
    /// Display name, used as the operation summary.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Status of a successful response.
    #[serde(default = "default_http_status")]
    pub http_status: u16,
    /// Whether this endpoint is documented.
    #[serde(default = "default_true")]
    pub schema: bool,
    /// Qualified id of the endpoint's own authenticator.
    #[serde(default)]
    pub authenticator: Option<String>,
    /// Scopes required to call the endpoint.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Accepted input, in declaration order.
    #[serde(default)]
    pub arguments: IndexMap<String, ArgumentDef>,
    /// Response fields, in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
    /// Qualified ids of errors declared on the endpoint.
    #[serde(default)]
    pub potential_errors: Vec<String>,
}

/// A controller; only its authenticator matters here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Qualified id of the controller's authenticator.
    #[serde(default)]
    pub authenticator: Option<String>,
}

/// Authentication mechanism of an authenticator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticatorKind {
    /// Bearer token in the `Authorization` header.
    Bearer,
    /// No credentials.
    #[default]
    Anonymous,
}

/// An authenticator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatorDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Authentication mechanism.
    #[serde(default, rename = "type")]
    pub kind: AuthenticatorKind,
    /// Qualified ids of errors the authenticator may raise.
    #[serde(default)]
    pub potential_errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint: EndpointDef = serde_yaml::from_str("name: Time Now").unwrap();
        assert_eq!(endpoint.http_status, 200);
        assert!(endpoint.schema);
        assert!(endpoint.arguments.is_empty());
    }

    #[test]
    fn test_method_round_trips_lowercase() {
        let route: RouteDef =
            serde_yaml::from_str("{ method: patch, path: time/now, endpoint: E }").unwrap();
        assert_eq!(route.method, HttpMethod::Patch);
        assert_eq!(route.method.to_string(), "patch");
    }
}
