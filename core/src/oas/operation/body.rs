#![deny(missing_docs)]

//! # Request Bodies
//!
//! Non-GET routes take their arguments as one JSON object.

use crate::definition::EndpointDef;
use crate::error::AppResult;
use crate::oas::context::SynthesisContext;
use crate::oas::registry::JsonMap;
use crate::oas::schemas::{property_schema, Projection};
use serde_json::{json, Value};

/// `requestBody` for an endpoint's arguments.
pub fn request_body(
    ctx: &mut SynthesisContext<'_>,
    endpoint_id: &str,
    endpoint: &EndpointDef,
) -> AppResult<Value> {
    let mut properties = JsonMap::new();
    let mut required = Vec::new();
    for (name, arg) in &endpoint.arguments {
        let schema = property_schema(ctx, endpoint_id, arg, Projection::Full, 0)?;
        properties.insert(name.clone(), schema);
        if arg.required {
            required.push(Value::String(name.clone()));
        }
    }

    let mut schema = JsonMap::new();
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }

    Ok(json!({
        "content": {
            "application/json": {
                "schema": schema
            }
        }
    }))
}
