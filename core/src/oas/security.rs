//! # Security Schemes
//!
//! Bearer authenticators become HTTP bearer security schemes, each of which
//! is also listed as a root security requirement.

use crate::definition::{ApiDefinition, AuthenticatorKind};
use crate::oas::naming::component_id;
use crate::oas::registry::JsonMap;
use serde_json::{json, Value};

/// `components.securitySchemes` and the root `security` list.
#[derive(Debug, Default)]
pub struct SecurityDefinitions {
    /// Schemes keyed by component id.
    pub schemes: JsonMap,
    /// One `{<scheme>: []}` requirement per scheme.
    pub requirements: Vec<Value>,
}

impl SecurityDefinitions {
    /// Collects the bearer authenticators of `api` in declaration order.
    pub fn from_api(api: &ApiDefinition) -> Self {
        let mut security = SecurityDefinitions::default();
        for (id, auth) in &api.authenticators {
            if auth.kind != AuthenticatorKind::Bearer {
                continue;
            }
            security.add(
                component_id(id),
                json!({ "scheme": "bearer", "type": "http" }),
            );
        }
        security
    }

    /// Merges user-supplied schemes, replacing any with the same name.
    pub fn merge_overrides(&mut self, overrides: &JsonMap) {
        for (name, scheme) in overrides {
            self.add(name.clone(), scheme.clone());
        }
    }

    fn add(&mut self, name: String, scheme: Value) {
        if !self.schemes.contains_key(&name) {
            self.requirements.push(json!({ name.as_str(): [] }));
        }
        self.schemes.insert(name, scheme);
    }
}
