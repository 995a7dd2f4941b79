#![deny(missing_docs)]

//! # Parameter Building
//!
//! Query and path parameters for GET routes. Argument sets are flattened into
//! one `parent[child]` parameter per child, since query strings cannot carry
//! nested objects.

use crate::definition::{ArgumentDef, ArgumentSetDef, EndpointDef};
use crate::error::AppResult;
use crate::oas::context::SynthesisContext;
use crate::oas::naming::path_params;
use crate::oas::registry::JsonMap;
use crate::oas::schemas::{element_schema, Projection};
use crate::type_mapping::{classify, TypeClass};
use serde_json::{json, Value};
use tracing::warn;

const PAGE_DESCRIPTION: &str =
    "The page number to request. If not provided, the first page will be returned.";
const PER_PAGE_DESCRIPTION: &str =
    "The number of items to return per page. If not provided, the default value will be used.";

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Path,
    Query,
}

impl Location {
    fn as_str(&self) -> &'static str {
        match self {
            Location::Path => "path",
            Location::Query => "query",
        }
    }
}

fn build_parameter(
    name: &str,
    location: Location,
    description: Option<&str>,
    required: bool,
    schema: Value,
) -> Value {
    let mut obj = JsonMap::new();
    obj.insert("name".to_string(), json!(name));
    obj.insert("in".to_string(), json!(location.as_str()));
    if let Some(desc) = description {
        obj.insert("description".to_string(), json!(desc));
    }
    if required {
        obj.insert("required".to_string(), json!(true));
    }
    obj.insert("schema".to_string(), schema);
    Value::Object(obj)
}

/// One required string parameter per `:param` segment of `path`.
pub fn path_parameters(path: &str) -> Vec<Value> {
    path_params(path)
        .into_iter()
        .map(|name| build_parameter(name, Location::Path, None, true, json!({ "type": "string" })))
        .collect()
}

/// Query parameters for every argument of a GET endpoint.
pub fn query_parameters(
    ctx: &mut SynthesisContext<'_>,
    endpoint_id: &str,
    endpoint: &EndpointDef,
) -> AppResult<Vec<Value>> {
    let mut params = Vec::new();
    for (name, arg) in &endpoint.arguments {
        let api = ctx.api;
        match classify(api, &arg.type_ref, endpoint_id)? {
            TypeClass::ArgumentSet(set_id, set) => {
                params.extend(fan_out(ctx, name, arg, set_id, set)?);
            }
            class => params.push(single_parameter(ctx, endpoint_id, name, arg, class)?),
        }
    }
    Ok(params)
}

fn single_parameter(
    ctx: &mut SynthesisContext<'_>,
    owner: &str,
    name: &str,
    arg: &ArgumentDef,
    class: TypeClass<'_>,
) -> AppResult<Value> {
    if !arg.array && matches!(class, TypeClass::Scalar(_)) {
        if let Some((schema, description)) = pagination(name) {
            let description = arg.description.as_deref().unwrap_or(description);
            return Ok(build_parameter(
                name,
                Location::Query,
                Some(description),
                arg.required,
                schema,
            ));
        }
    }

    let schema = query_schema(ctx, owner, arg)?;
    Ok(build_parameter(
        &list_name(name, arg.array),
        Location::Query,
        arg.description.as_deref(),
        arg.required,
        schema,
    ))
}

/// `{name}[child]` parameters for an argument set.
fn fan_out(
    ctx: &mut SynthesisContext<'_>,
    name: &str,
    arg: &ArgumentDef,
    set_id: &str,
    set: &ArgumentSetDef,
) -> AppResult<Vec<Value>> {
    let prefix = list_name(name, arg.array);
    let note = set.lookup.then(|| {
        format!(
            "All '{}[]' params are mutually exclusive, only one can be provided.",
            name
        )
    });

    let mut params = Vec::new();
    for (child_name, child) in &set.arguments {
        let api = ctx.api;
        if let TypeClass::ArgumentSet(nested, _) = classify(api, &child.type_ref, set_id)? {
            warn!(
                argument = %format!("{}[{}]", prefix, child_name),
                argument_set = nested,
                "nested argument sets cannot be expressed as query parameters; skipped"
            );
            continue;
        }

        let schema = query_schema(ctx, set_id, child)?;
        let param_name = list_name(&format!("{}[{}]", prefix, child_name), child.array);
        let description = match (child.description.as_deref(), note.as_deref()) {
            (Some(desc), Some(note)) => Some(format!("{} {}", desc, note)),
            (Some(desc), None) => Some(desc.to_string()),
            (None, note) => note.map(str::to_string),
        };
        let required = !set.lookup && arg.required && child.required;
        params.push(build_parameter(
            &param_name,
            Location::Query,
            description.as_deref(),
            required,
            schema,
        ));
    }
    Ok(params)
}

/// Schema of a non-set argument; lists become array schemas.
fn query_schema(
    ctx: &mut SynthesisContext<'_>,
    owner: &str,
    arg: &ArgumentDef,
) -> AppResult<Value> {
    let element = element_schema(ctx, owner, &arg.type_ref, Projection::Full, 0)?;
    if arg.array {
        Ok(json!({ "type": "array", "items": element }))
    } else {
        Ok(element)
    }
}

fn list_name(name: &str, array: bool) -> String {
    if array {
        format!("{}[]", name)
    } else {
        name.to_string()
    }
}

fn pagination(name: &str) -> Option<(Value, &'static str)> {
    match name {
        "page" => Some((
            json!({ "type": "integer", "default": 1, "minimum": 1 }),
            PAGE_DESCRIPTION,
        )),
        "per_page" => Some((
            json!({ "type": "integer", "default": 30, "minimum": 1 }),
            PER_PAGE_DESCRIPTION,
        )),
        _ => None,
    }
}
