#![deny(missing_docs)]

//! # Component Registry
//!
//! The `components.schemas` / `components.responses` buckets of one synthesis
//! run. Every id is written at most once; later requests for the same id are
//! answered with a reference without running the builder again.

use crate::error::AppResult;
use crate::oas::naming::{component_id, qualified_component_id};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::debug;

/// A JSON object under construction.
pub type JsonMap = Map<String, Value>;

/// What a schema registration resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaRef {
    /// A registered component.
    Ref(String),
    /// The build produced an empty object; use a bare placeholder instead.
    Inline,
}

impl SchemaRef {
    /// Renders the reference, or `{type: object}` for the placeholder.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaRef::Ref(id) => schema_ref(id),
            SchemaRef::Inline => json!({ "type": "object" }),
        }
    }
}

/// `{"$ref": "#/components/schemas/<id>"}`
pub fn schema_ref(id: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", id) })
}

/// `{"$ref": "#/components/responses/<id>"}`
pub fn response_ref(id: &str) -> Value {
    json!({ "$ref": format!("#/components/responses/{}", id) })
}

/// What a component id stands for.
///
/// Two different keys never share an id; see [`ComponentRegistry::claim`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentKey {
    /// The shared component of a named type.
    Type(String),
    /// The detail schema of an error, under an id prefix.
    Error {
        /// Fixed prefix, e.g. for API-level authenticator errors.
        prefix: &'static str,
        /// Qualified id of the error.
        error: String,
    },
    /// The `oneOf` over errors sharing a status, by sorted member ids.
    ErrorGroup(Vec<String>),
    /// A projection of `type_id` restricted to `include`, requested as `id`.
    Partial {
        /// The id the projection asked for.
        id: String,
        /// Qualified id of the projected type.
        type_id: String,
        /// The selection, in canonical form.
        include: String,
    },
}

/// Reusable schemas and responses of one document.
///
/// A schema id maps to `None` while its builder is running, so a type that
/// reaches itself again gets a reference instead of recursing forever.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    schemas: IndexMap<String, Option<JsonMap>>,
    responses: IndexMap<String, JsonMap>,
    names: HashMap<ComponentKey, String>,
    owners: HashMap<String, ComponentKey>,
}

impl AsMut<ComponentRegistry> for ComponentRegistry {
    fn as_mut(&mut self) -> &mut ComponentRegistry {
        self
    }
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The component id for `key`, handed out on first use.
    ///
    /// `preferred` is taken while no other key holds it, then `fallback`, then
    /// `preferred` with a `_2`, `_3`, ... suffix. Response ids are derived by
    /// appending `Response`, so they are unique as well.
    pub fn claim(&mut self, key: ComponentKey, preferred: &str, fallback: Option<&str>) -> String {
        if let Some(id) = self.names.get(&key) {
            return id.clone();
        }

        let id = if !self.owners.contains_key(preferred) {
            preferred.to_string()
        } else if let Some(fallback) = fallback.filter(|f| !self.owners.contains_key(*f)) {
            fallback.to_string()
        } else {
            let mut n = 2;
            loop {
                let candidate = format!("{}_{}", preferred, n);
                if !self.owners.contains_key(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        };
        if id != preferred {
            debug!(preferred, component = %id, "component id collision");
        }

        self.owners.insert(id.clone(), key.clone());
        self.names.insert(key, id.clone());
        id
    }

    /// Component id of a named type: its last segment, or the whole
    /// qualified id once the last segment belongs to something else.
    pub fn type_id(&mut self, qualified: &str) -> String {
        self.claim(
            ComponentKey::Type(qualified.to_string()),
            &component_id(qualified),
            Some(&qualified_component_id(qualified)),
        )
    }

    /// Component id of an error's detail schema, allocated like [`Self::type_id`].
    pub fn error_id(&mut self, prefix: &'static str, qualified: &str) -> String {
        self.claim(
            ComponentKey::Error {
                prefix,
                error: qualified.to_string(),
            },
            &format!("{}{}", prefix, component_id(qualified)),
            Some(&format!("{}{}", prefix, qualified_component_id(qualified))),
        )
    }

    /// Whether a schema id is taken (built or being built).
    pub fn has_schema(&self, id: &str) -> bool {
        self.schemas.contains_key(id)
    }

    /// A finished schema body.
    pub fn schema(&self, id: &str) -> Option<&JsonMap> {
        self.schemas.get(id).and_then(Option::as_ref)
    }

    /// Whether a response id is taken.
    pub fn has_response(&self, id: &str) -> bool {
        self.responses.contains_key(id)
    }

    /// A registered response body.
    pub fn response(&self, id: &str) -> Option<&JsonMap> {
        self.responses.get(id)
    }

    /// Number of finished schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.values().filter(|s| s.is_some()).count()
    }

    /// Number of registered responses.
    pub fn response_count(&self) -> usize {
        self.responses.len()
    }

    /// Registers a response body unless the id is already taken.
    ///
    /// Returns `true` when this call wrote the body.
    pub fn register_response(&mut self, id: &str, body: JsonMap) -> bool {
        if self.responses.contains_key(id) {
            return false;
        }
        debug!(component = id, "registered response");
        self.responses.insert(id.to_string(), body);
        true
    }

    /// `components.schemas`, in registration order.
    pub fn schemas_value(&self) -> JsonMap {
        self.schemas
            .iter()
            .filter_map(|(id, body)| body.as_ref().map(|b| (id.clone(), Value::Object(b.clone()))))
            .collect()
    }

    /// `components.responses`, in registration order.
    pub fn responses_value(&self) -> JsonMap {
        self.responses
            .iter()
            .map(|(id, body)| (id.clone(), Value::Object(body.clone())))
            .collect()
    }
}

/// Registers the schema `id`, building it with `build` on first use.
///
/// The id is reserved before `build` runs and released again when the build
/// fails or yields an object without content; the latter resolves to
/// [`SchemaRef::Inline`].
pub fn register<C, F>(ctx: &mut C, id: &str, build: F) -> AppResult<SchemaRef>
where
    C: AsMut<ComponentRegistry>,
    F: FnOnce(&mut C) -> AppResult<JsonMap>,
{
    if ctx.as_mut().has_schema(id) {
        return Ok(SchemaRef::Ref(id.to_string()));
    }
    ctx.as_mut().schemas.insert(id.to_string(), None);

    let body = match build(ctx) {
        Ok(body) => body,
        Err(e) => {
            ctx.as_mut().schemas.shift_remove(id);
            return Err(e);
        }
    };

    let registry = ctx.as_mut();
    if is_empty_object(&body) {
        debug!(component = id, "empty schema rolled back");
        registry.schemas.shift_remove(id);
        return Ok(SchemaRef::Inline);
    }
    debug!(component = id, "registered schema");
    registry.schemas.insert(id.to_string(), Some(body));
    Ok(SchemaRef::Ref(id.to_string()))
}

/// An object schema with no properties and nothing else giving it shape.
fn is_empty_object(body: &JsonMap) -> bool {
    if body.is_empty() {
        return true;
    }
    let shaped = ["enum", "oneOf", "allOf", "anyOf", "items", "$ref"]
        .iter()
        .any(|key| body.contains_key(*key));
    let has_properties = body
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty());
    !shaped && !has_properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use pretty_assertions::assert_eq;

    fn object(properties: Value) -> JsonMap {
        let mut body = JsonMap::new();
        body.insert("type".to_string(), json!("object"));
        body.insert("properties".to_string(), properties);
        body
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut registry = ComponentRegistry::new();
        let mut calls = 0;
        let first = register(&mut registry, "Year", |_| {
            calls += 1;
            Ok(object(json!({ "as_integer": { "type": "integer" } })))
        })
        .unwrap();
        let second = register(&mut registry, "Year", |_| {
            calls += 1;
            Ok(object(json!({ "other": { "type": "string" } })))
        })
        .unwrap();

        assert_eq!(first, SchemaRef::Ref("Year".into()));
        assert_eq!(second, first);
        assert_eq!(calls, 1);
        assert_eq!(registry.schema_count(), 1);
        assert_eq!(
            Value::Object(registry.schemas_value()),
            json!({ "Year": { "type": "object", "properties": { "as_integer": { "type": "integer" } } } })
        );
    }

    #[test]
    fn test_empty_build_is_rolled_back() {
        let mut registry = ComponentRegistry::new();
        let result = register(&mut registry, "GetTimeNow200ResponseTime", |_| {
            Ok(object(json!({})))
        })
        .unwrap();
        assert_eq!(result, SchemaRef::Inline);
        assert_eq!(result.to_value(), json!({ "type": "object" }));
        assert!(!registry.has_schema("GetTimeNow200ResponseTime"));
        assert!(registry.schemas_value().is_empty());
    }

    #[test]
    fn test_enum_bodies_are_not_empty() {
        let mut registry = ComponentRegistry::new();
        let mut body = JsonMap::new();
        body.insert("type".to_string(), json!("string"));
        body.insert("enum".to_string(), json!(["UTC"]));
        let result = register(&mut registry, "TimeZone", |_| Ok(body)).unwrap();
        assert_eq!(result, SchemaRef::Ref("TimeZone".into()));
    }

    #[test]
    fn test_failed_build_releases_the_id() {
        let mut registry = ComponentRegistry::new();
        let err = register(&mut registry, "Broken", |_| {
            Err(AppError::malformed("Broken", "bad"))
        });
        assert!(err.is_err());
        assert!(!registry.has_schema("Broken"));
    }

    #[test]
    fn test_self_reference_during_build_gets_a_ref() {
        let mut registry = ComponentRegistry::new();
        let result = register(&mut registry, "Node", |reg| {
            let inner = register(reg, "Node", |_| panic!("builder must not re-enter"))?;
            Ok(object(json!({ "next": inner.to_value() })))
        })
        .unwrap();
        assert_eq!(result, SchemaRef::Ref("Node".into()));
        assert_eq!(
            registry.schema("Node").unwrap()["properties"]["next"],
            json!({ "$ref": "#/components/schemas/Node" })
        );
    }

    #[test]
    fn test_same_last_segment_falls_back_to_qualified_id() {
        let mut registry = ComponentRegistry::new();
        assert_eq!(registry.type_id("CoreAPI/Objects/Time"), "Time");
        assert_eq!(
            registry.type_id("CoreAPI/ArgumentSets/Time"),
            "CoreAPI_ArgumentSets_Time"
        );
        assert_eq!(registry.type_id("CoreAPI/Objects/Time"), "Time");
        assert_eq!(
            registry.error_id("", "CoreAPI/Errors/Time"),
            "CoreAPI_Errors_Time"
        );
        assert_eq!(
            registry.error_id("APIAuthenticator", "CoreAPI/Errors/Time"),
            "APIAuthenticatorTime"
        );
    }

    #[test]
    fn test_claim_suffixes_when_fallback_is_taken() {
        let mut registry = ComponentRegistry::new();
        let group = |ids: &[&str]| ComponentKey::ErrorGroup(ids.iter().map(|s| s.to_string()).collect());
        assert_eq!(registry.claim(group(&["A", "B"]), "AB", None), "AB");
        assert_eq!(registry.claim(group(&["A", "C"]), "AB", None), "AB_2");
        assert_eq!(registry.claim(group(&["A", "D"]), "AB", Some("AB_2")), "AB_3");
        assert_eq!(registry.claim(group(&["A", "C"]), "AB", None), "AB_2");
    }

    #[test]
    fn test_response_first_writer_wins() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.register_response("InvalidTokenResponse", JsonMap::new()));
        let mut other = JsonMap::new();
        other.insert("description".to_string(), json!("second"));
        assert!(!registry.register_response("InvalidTokenResponse", other));
        assert_eq!(registry.response_count(), 1);
        assert!(registry.response("InvalidTokenResponse").unwrap().is_empty());
    }
}
