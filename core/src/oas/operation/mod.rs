#![deny(missing_docs)]

//! # Operations
//!
//! Builds one OpenAPI Operation Object per documented route.
//!
//! - **params**: query/path parameters for GET routes.
//! - **body**: JSON request bodies for every other method.
//! - **responses**: success and error responses.

pub mod body;
pub mod params;
pub mod responses;

pub use body::request_body;
pub use params::{path_parameters, query_parameters};
pub use responses::{potential_errors, responses, success_response, PotentialError};

use crate::definition::{EndpointDef, HttpMethod, RouteDef};
use crate::error::AppResult;
use crate::oas::context::SynthesisContext;
use crate::oas::registry::JsonMap;
use serde_json::{json, Value};
use tracing::debug;

/// Builds the operation for `route`, allocating its operation id.
pub fn build_operation(
    ctx: &mut SynthesisContext<'_>,
    route: &RouteDef,
    endpoint: &EndpointDef,
    tags: &[String],
) -> AppResult<Value> {
    let operation_id = ctx.path_ids.allocate(route.method, &route.path);
    debug!(operation = %operation_id, path = %route.path, "building operation");

    let mut op = JsonMap::new();
    op.insert("operationId".to_string(), json!(operation_id));
    if let Some(summary) = &endpoint.name {
        op.insert("summary".to_string(), json!(summary));
    }
    if let Some(desc) = operation_description(endpoint) {
        op.insert("description".to_string(), json!(desc));
    }
    op.insert("tags".to_string(), json!(tags));

    let mut parameters = path_parameters(&route.path);
    if route.method == HttpMethod::Get {
        parameters.extend(query_parameters(ctx, &route.endpoint, endpoint)?);
    }
    if !parameters.is_empty() {
        op.insert("parameters".to_string(), Value::Array(parameters));
    }
    if route.method != HttpMethod::Get && !endpoint.arguments.is_empty() {
        op.insert(
            "requestBody".to_string(),
            request_body(ctx, &route.endpoint, endpoint)?,
        );
    }

    let responses = responses(ctx, &operation_id, route, endpoint)?;
    op.insert("responses".to_string(), Value::Object(responses));
    Ok(Value::Object(op))
}

/// The endpoint description with its scopes listed underneath.
fn operation_description(endpoint: &EndpointDef) -> Option<String> {
    if endpoint.scopes.is_empty() {
        return endpoint.description.clone();
    }
    let scopes: Vec<String> = endpoint
        .scopes
        .iter()
        .map(|scope| format!("- `{}`", scope))
        .collect();
    let section = format!("## Scopes\n\n{}", scopes.join("\n"));
    Some(match &endpoint.description {
        Some(desc) => format!("{}\n\n{}", desc, section),
        None => section,
    })
}
