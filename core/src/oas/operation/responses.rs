#![deny(missing_docs)]

//! # Response Building
//!
//! The success response of an endpoint plus one response per error status.
//!
//! Errors are gathered from every authenticator on the call path, from lookup
//! argument sets reachable through the endpoint's arguments and from the
//! endpoint itself. Each error appears once; errors sharing a status are
//! merged into a `oneOf`.

use crate::definition::{ApiDefinition, ArgumentDef, EndpointDef, ErrorDef, Member, RouteDef};
use crate::error::{AppError, AppResult};
use crate::oas::context::SynthesisContext;
use crate::oas::include::IncludeSpec;
use crate::oas::naming::{error_group_id, field_schema_id, Role};
use crate::oas::registry::{register, response_ref, ComponentKey, ComponentRegistry, JsonMap};
use crate::oas::schemas::{member_schema, members_body, polymorph_one_of, property_schema, Projection};
use crate::type_mapping::{classify, TypeClass};
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

/// Prefix of component ids for errors raised by the API-level authenticator.
pub const API_AUTHENTICATOR_PREFIX: &str = "APIAuthenticator";

/// An error reachable from one endpoint.
#[derive(Debug, Clone)]
pub struct PotentialError<'a> {
    /// Qualified id of the error.
    pub id: &'a str,
    /// The error itself.
    pub def: &'a ErrorDef,
    /// Id of its detail schema; the response is `<component>Response`.
    pub component: String,
}

/// `responses` of one operation, success status first.
pub fn responses(
    ctx: &mut SynthesisContext<'_>,
    operation_id: &str,
    route: &RouteDef,
    endpoint: &EndpointDef,
) -> AppResult<JsonMap> {
    let mut responses = JsonMap::new();
    let success = success_response(ctx, operation_id, &route.endpoint, endpoint)?;
    responses.insert(endpoint.http_status.to_string(), success);

    let errors = potential_errors(ctx, route, endpoint)?;
    for (status, group) in group_by_status(errors) {
        if status == endpoint.http_status {
            warn!(
                operation = operation_id,
                status, "error status equals success status; error response omitted"
            );
            continue;
        }
        let id = error_response(ctx, &group)?;
        responses.insert(status.to_string(), response_ref(&id));
    }
    Ok(responses)
}

/// The success response: one property per endpoint field.
pub fn success_response(
    ctx: &mut SynthesisContext<'_>,
    operation_id: &str,
    endpoint_id: &str,
    endpoint: &EndpointDef,
) -> AppResult<Value> {
    let mut properties = JsonMap::new();
    let mut required = Vec::new();
    for (name, field) in &endpoint.fields {
        let include = field.include_spec().map(IncludeSpec::parse).transpose()?;
        let api = ctx.api;
        let schema = match (classify(api, &field.type_ref, endpoint_id)?, &include) {
            (TypeClass::Polymorph(id, def), None) => {
                let one_of = polymorph_one_of(ctx, id, def, 0)?;
                member_schema(field, one_of)
            }
            (_, None) => property_schema(ctx, endpoint_id, field, Projection::Full, 0)?,
            (_, Some(spec)) => {
                let projection = Projection::Partial {
                    include: spec,
                    id: field_schema_id(operation_id, endpoint.http_status, Role::Response, name),
                };
                property_schema(ctx, endpoint_id, field, projection, 0)?
            }
        };
        properties.insert(name.clone(), schema);
        if field.is_required() {
            required.push(Value::String(name.clone()));
        }
    }

    let mut schema = JsonMap::new();
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    Ok(json!({
        "description": endpoint.description.clone().unwrap_or_default(),
        "content": {
            "application/json": {
                "schema": schema
            }
        }
    }))
}

/// Every error one route can produce, first occurrence wins.
///
/// Each error's component id is allocated here, so two errors sharing a
/// last segment still get distinct components.
pub fn potential_errors<'a>(
    ctx: &mut SynthesisContext<'a>,
    route: &RouteDef,
    endpoint: &EndpointDef,
) -> AppResult<Vec<PotentialError<'a>>> {
    let api = ctx.api;
    let mut collector = Collector {
        api,
        components: &mut ctx.components,
        seen: HashSet::new(),
        errors: Vec::new(),
    };

    if let Some(auth_id) = &api.authenticator {
        let auth = api.authenticator(auth_id, &api.id)?;
        collector.extend(auth_id, &auth.potential_errors, API_AUTHENTICATOR_PREFIX)?;
    }
    if let Some(controller_id) = &route.controller {
        let controller = api.controller(controller_id, &route.endpoint)?;
        if let Some(auth_id) = &controller.authenticator {
            let auth = api.authenticator(auth_id, controller_id)?;
            collector.extend(auth_id, &auth.potential_errors, "")?;
        }
    }
    if let Some(auth_id) = &endpoint.authenticator {
        let auth = api.authenticator(auth_id, &route.endpoint)?;
        collector.extend(auth_id, &auth.potential_errors, "")?;
    }

    let mut visited = HashSet::new();
    collect_lookup_errors(&mut collector, &route.endpoint, &endpoint.arguments, &mut visited)?;

    collector.extend(&route.endpoint, &endpoint.potential_errors, "")?;
    Ok(collector.errors)
}

struct Collector<'a, 'r> {
    api: &'a ApiDefinition,
    components: &'r mut ComponentRegistry,
    seen: HashSet<&'a str>,
    errors: Vec<PotentialError<'a>>,
}

impl<'a> Collector<'a, '_> {
    fn extend(&mut self, owner: &str, ids: &[String], prefix: &'static str) -> AppResult<()> {
        let api = self.api;
        for id in ids {
            let (id, def) = api
                .errors
                .get_key_value(id.as_str())
                .ok_or_else(|| AppError::malformed(owner, format!("unknown error '{}'", id)))?;
            if !self.seen.insert(id.as_str()) {
                continue;
            }
            let component = self.components.error_id(prefix, id);
            self.errors.push(PotentialError { id, def, component });
        }
        Ok(())
    }
}

/// Walks argument sets below `arguments`, collecting the errors of lookup sets.
fn collect_lookup_errors<'a>(
    collector: &mut Collector<'a, '_>,
    owner: &str,
    arguments: &IndexMap<String, ArgumentDef>,
    visited: &mut HashSet<&'a str>,
) -> AppResult<()> {
    let api = collector.api;
    for arg in arguments.values() {
        let TypeClass::ArgumentSet(set_id, set) = classify(api, &arg.type_ref, owner)? else {
            continue;
        };
        if !visited.insert(set_id) {
            continue;
        }
        if set.lookup {
            collector.extend(set_id, &set.potential_errors, "")?;
        }
        collect_lookup_errors(collector, set_id, &set.arguments, visited)?;
    }
    Ok(())
}

/// Groups errors by HTTP status, ascending.
pub fn group_by_status(errors: Vec<PotentialError<'_>>) -> BTreeMap<u16, Vec<PotentialError<'_>>> {
    let mut groups: BTreeMap<u16, Vec<PotentialError<'_>>> = BTreeMap::new();
    for error in errors {
        groups.entry(error.def.http_status).or_default().push(error);
    }
    groups
}

/// Registers the response for one status group and returns its id.
///
/// A group is keyed by its member set, so two groups whose truncated ids
/// coincide still get separate components.
fn error_response(ctx: &mut SynthesisContext<'_>, group: &[PotentialError<'_>]) -> AppResult<String> {
    if let [error] = group {
        let id = format!("{}Response", error.component);
        if ctx.components.has_response(&id) {
            return Ok(id);
        }
        let envelope = error_envelope(ctx, error)?;
        let description = error
            .def
            .description
            .clone()
            .unwrap_or_else(|| error.def.code.clone());
        ctx.components
            .register_response(&id, response_body(description, envelope));
        return Ok(id);
    }

    let components: Vec<String> = group.iter().map(|e| e.component.clone()).collect();
    let mut members = components.clone();
    members.sort();
    let group_id = ctx
        .components
        .claim(ComponentKey::ErrorGroup(members), &error_group_id(&components), None);
    let id = format!("{}Response", group_id);
    if ctx.components.has_response(&id) {
        return Ok(id);
    }

    let mut one_of = Vec::with_capacity(group.len());
    for error in group {
        one_of.push(error_envelope(ctx, error)?);
    }
    let schema = register(ctx, &group_id, |_| {
        let mut body = JsonMap::new();
        body.insert("oneOf".to_string(), Value::Array(one_of));
        Ok(body)
    })?;

    let codes: Vec<&str> = group.iter().map(|e| e.def.code.as_str()).collect();
    ctx.components.register_response(
        &id,
        response_body(format!("One of: {}", codes.join(", ")), schema.to_value()),
    );
    Ok(id)
}

/// `{code, description, detail}` for one error; registers its detail schema.
fn error_envelope(ctx: &mut SynthesisContext<'_>, error: &PotentialError<'_>) -> AppResult<Value> {
    let def = error.def;
    let detail = register(ctx, &error.component, |ctx| {
        members_body(ctx, error.id, None, &def.fields, None, 0)
    })?;
    Ok(json!({
        "type": "object",
        "properties": {
            "code": { "type": "string", "enum": [def.code] },
            "description": { "type": "string" },
            "detail": detail.to_value()
        }
    }))
}

fn response_body(description: String, schema: Value) -> JsonMap {
    let mut body = JsonMap::new();
    body.insert("description".to_string(), json!(description));
    body.insert(
        "content".to_string(),
        json!({ "application/json": { "schema": schema } }),
    );
    body
}
