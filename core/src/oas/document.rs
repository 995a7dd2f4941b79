#![deny(missing_docs)]

//! # Document Assembly
//!
//! Walks the routes of an API definition and assembles the complete OpenAPI
//! 3.0 document. Key order is fixed so repeated runs over the same input
//! produce byte-identical output.

use crate::config::SynthesisOptions;
use crate::definition::{ApiDefinition, RouteDef};
use crate::error::{AppError, AppResult};
use crate::oas::context::SynthesisContext;
use crate::oas::naming::{component_id, normalize_path};
use crate::oas::normalization::{sort_paths_by_tag, TagTree};
use crate::oas::operation::build_operation;
use crate::oas::registry::JsonMap;
use crate::oas::security::SecurityDefinitions;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Version reported in `info.version`.
pub const DOCUMENT_VERSION: &str = "1.0.0";

/// Tag used for routes outside any group when no name is given.
pub const DEFAULT_TAG: &str = "Core";

/// Builds the document for `api`.
///
/// `name` tags routes that belong to no group. Any malformed definition aborts
/// the whole build.
pub fn build_document(
    api: &ApiDefinition,
    base_url: &str,
    name: Option<&str>,
    options: &SynthesisOptions,
) -> AppResult<Value> {
    Url::parse(base_url).map_err(|e| AppError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    let default_tag = name.unwrap_or(DEFAULT_TAG);

    let mut ctx = SynthesisContext::new(api, options.max_depth);
    let mut tags = TagTree::default();
    let mut paths = JsonMap::new();

    for route in &api.routes {
        let Some(chain) = documented_chain(api, route, default_tag)? else {
            debug!(method = %route.method, path = %route.path, "route excluded from schema");
            continue;
        };
        tags.record(&chain);
        let tag_names: Vec<String> = chain.into_iter().map(|(name, _)| name).collect();

        let endpoint = api.endpoint(&route.endpoint, &route.path)?;
        let operation = build_operation(&mut ctx, route, endpoint, &tag_names)?;

        let item = paths
            .entry(normalize_path(&route.path))
            .or_insert_with(|| json!({}));
        if let Some(item) = item.as_object_mut() {
            if item.contains_key(route.method.as_str()) {
                warn!(method = %route.method, path = %route.path, "duplicate route replaces earlier operation");
            }
            item.insert(route.method.as_str().to_string(), operation);
        }
    }

    let paths = sort_paths_by_tag(paths);

    let mut security = SecurityDefinitions::from_api(api);
    security.merge_overrides(&options.security_schemes);

    let mut components = JsonMap::new();
    components.insert(
        "schemas".to_string(),
        Value::Object(ctx.components.schemas_value()),
    );
    components.insert(
        "responses".to_string(),
        Value::Object(ctx.components.responses_value()),
    );
    if !security.schemes.is_empty() {
        components.insert(
            "securitySchemes".to_string(),
            Value::Object(security.schemes),
        );
    }

    info!(
        paths = paths.len(),
        schemas = ctx.components.schema_count(),
        responses = ctx.components.response_count(),
        "synthesized OpenAPI document"
    );

    let mut doc = JsonMap::new();
    doc.insert("openapi".to_string(), json!(OPENAPI_VERSION));
    doc.insert("info".to_string(), Value::Object(info_value(api, &options.info)));
    doc.insert("servers".to_string(), json!([{ "url": base_url }]));
    doc.insert("paths".to_string(), Value::Object(paths));
    doc.insert("components".to_string(), Value::Object(components));
    doc.insert("security".to_string(), Value::Array(security.requirements));
    doc.insert("tags".to_string(), Value::Array(tags.tags_value()));
    doc.insert("x-tagGroups".to_string(), Value::Array(tags.tag_groups_value()));
    if !options.external_docs.is_empty() {
        doc.insert(
            "externalDocs".to_string(),
            Value::Object(options.external_docs.clone()),
        );
    }
    Ok(Value::Object(doc))
}

/// The tag chain of a documented route, or `None` when the route opts out.
fn documented_chain(
    api: &ApiDefinition,
    route: &RouteDef,
    default_tag: &str,
) -> AppResult<Option<Vec<(String, Option<String>)>>> {
    let endpoint = api.endpoint(&route.endpoint, &route.path)?;
    let groups = api.group_chain(route)?;
    if !endpoint.schema || groups.iter().any(|(_, group)| !group.schema) {
        return Ok(None);
    }
    if groups.is_empty() {
        return Ok(Some(vec![(default_tag.to_string(), None)]));
    }
    Ok(Some(
        groups
            .into_iter()
            .map(|(id, group)| {
                let name = group.name.clone().unwrap_or_else(|| component_id(id));
                (name, group.description.clone())
            })
            .collect(),
    ))
}

fn info_value(api: &ApiDefinition, overrides: &JsonMap) -> JsonMap {
    let title = api.name.clone().unwrap_or_else(|| api.id.clone());
    let description = api
        .description
        .clone()
        .unwrap_or_else(|| format!("Welcome to the documentation for the {}", title));

    let mut info = JsonMap::new();
    info.insert("version".to_string(), json!(DOCUMENT_VERSION));
    info.insert("title".to_string(), json!(title));
    info.insert("description".to_string(), json!(description));
    for (key, value) in overrides {
        info.insert(key.clone(), value.clone());
    }
    info
}
