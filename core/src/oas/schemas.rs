#![deny(missing_docs)]

//! # Schema Synthesis
//!
//! Turns fields, arguments and types into OpenAPI schemas.
//!
//! - **Full** projection references the shared component of a type,
//!   registering it on first use.
//! - **Partial** projection builds a one-off component holding only the
//!   fields an include specification selects, under an id scoped to one
//!   response field.

use crate::definition::{Member, PolymorphDef, TypeRef};
use crate::error::{AppError, AppResult};
use crate::oas::context::SynthesisContext;
use crate::oas::include::IncludeSpec;
use crate::oas::naming::{component_id, nested_part_id};
use crate::oas::registry::{register, ComponentKey, JsonMap};
use crate::type_mapping::{classify, data_type, TypeClass};
use indexmap::IndexMap;
use serde_json::{json, Value};

/// How much of a composite type a schema exposes.
#[derive(Debug, Clone)]
pub enum Projection<'p> {
    /// Every field, through the shared component.
    Full,
    /// Only the selected fields, as the component `id`.
    Partial {
        /// The selection at this level.
        include: &'p IncludeSpec,
        /// Id of the partial component.
        id: String,
    },
}

/// Schema of a field or argument: the element schema, wrapped as an array
/// when the member is a list, with description and nullability applied.
pub fn property_schema<M: Member>(
    ctx: &mut SynthesisContext<'_>,
    owner: &str,
    member: &M,
    projection: Projection<'_>,
    depth: usize,
) -> AppResult<Value> {
    let element = element_schema(ctx, owner, member.type_ref(), projection, depth)?;
    Ok(member_schema(member, element))
}

/// Wraps an element schema according to the member's own flags.
pub fn member_schema<M: Member>(member: &M, element: Value) -> Value {
    let schema = if member.is_array() {
        json!({ "type": "array", "items": element })
    } else {
        element
    };
    decorate(schema, member.description(), member.is_nullable())
}

/// Schema of a single value of `type_ref`.
pub fn element_schema(
    ctx: &mut SynthesisContext<'_>,
    owner: &str,
    type_ref: &TypeRef,
    projection: Projection<'_>,
    depth: usize,
) -> AppResult<Value> {
    let api = ctx.api;
    let class = classify(api, type_ref, owner)?;
    match (class, projection) {
        (TypeClass::Scalar(kind), _) => Ok(data_type(kind).to_value()),
        (TypeClass::Enum(..), _) | (_, Projection::Full) => component_ref(ctx, class, depth),
        (TypeClass::Polymorph(id, def), projection @ Projection::Partial { .. }) => {
            // A selection on a polymorph is taken to exist on every option,
            // so the first option stands in for all of them.
            let first = first_option(id, def)?;
            element_schema(ctx, id, first, projection, depth)
        }
        (_, Projection::Partial { include, id }) => partial_ref(ctx, class, include, &id, depth),
    }
}

/// `$ref` to the shared component of a named type, building it on first use.
pub fn component_ref(
    ctx: &mut SynthesisContext<'_>,
    class: TypeClass<'_>,
    depth: usize,
) -> AppResult<Value> {
    let Some(qualified) = class.id() else {
        return Ok(scalar_value(class));
    };
    let id = ctx.components.type_id(qualified);
    let reference = register(ctx, &id, |ctx| type_body(ctx, class, None, depth + 1))?;
    Ok(reference.to_value())
}

/// `{oneOf: [...]}` over the options of a polymorph.
pub fn polymorph_one_of(
    ctx: &mut SynthesisContext<'_>,
    id: &str,
    def: &PolymorphDef,
    depth: usize,
) -> AppResult<Value> {
    let mut options = Vec::with_capacity(def.options.len());
    for type_ref in def.options.values() {
        options.push(element_schema(ctx, id, type_ref, Projection::Full, depth)?);
    }
    Ok(json!({ "oneOf": options }))
}

/// Object schema over `members`, restricted to `include` when given.
///
/// `include` pairs the selection with the id of the component being built,
/// which seeds the ids of nested partial components.
pub fn members_body<M: Member>(
    ctx: &mut SynthesisContext<'_>,
    owner: &str,
    description: Option<&str>,
    members: &IndexMap<String, M>,
    include: Option<(&IncludeSpec, &str)>,
    depth: usize,
) -> AppResult<JsonMap> {
    if let Some((spec, _)) = include {
        spec.validate(owner, members.keys().map(String::as_str))?;
    }

    let mut properties = JsonMap::new();
    let mut required = Vec::new();
    for (name, member) in members {
        let projection = match include {
            None => Projection::Full,
            Some((spec, _)) if !spec.includes(name) => continue,
            Some((spec, parent_id)) => match spec.nested(name) {
                Some(nested) => Projection::Partial {
                    include: nested,
                    id: nested_part_id(parent_id, name),
                },
                None => Projection::Full,
            },
        };
        let schema = property_schema(ctx, owner, member, projection, depth)?;
        properties.insert(name.clone(), schema);
        if member.is_required() {
            required.push(Value::String(name.clone()));
        }
    }

    let mut body = JsonMap::new();
    body.insert("type".to_string(), json!("object"));
    if let Some(desc) = description {
        body.insert("description".to_string(), json!(desc));
    }
    body.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        body.insert("required".to_string(), Value::Array(required));
    }
    Ok(body)
}

/// Body of the component for a named type.
fn type_body(
    ctx: &mut SynthesisContext<'_>,
    class: TypeClass<'_>,
    include: Option<(&IncludeSpec, &str)>,
    depth: usize,
) -> AppResult<JsonMap> {
    if depth > ctx.max_depth {
        return Err(AppError::SchemaTooDeep {
            id: class.id().unwrap_or_default().to_string(),
            limit: ctx.max_depth,
        });
    }

    match class {
        TypeClass::Scalar(kind) => Ok(data_type(kind).to_map()),
        TypeClass::Enum(_, def) => {
            let mut body = JsonMap::new();
            body.insert("type".to_string(), json!("string"));
            if let Some(desc) = &def.description {
                body.insert("description".to_string(), json!(desc));
            }
            let values: Vec<&str> = def.values.iter().map(|v| v.name.as_str()).collect();
            body.insert("enum".to_string(), json!(values));
            Ok(body)
        }
        TypeClass::Polymorph(id, def) => {
            let node = def.name.clone().unwrap_or_else(|| component_id(id));
            let one_of = polymorph_one_of(ctx, id, def, depth)?;
            let mut body = JsonMap::new();
            body.insert("type".to_string(), json!("object"));
            if let Some(desc) = &def.description {
                body.insert("description".to_string(), json!(desc));
            }
            body.insert("properties".to_string(), json!({ node: one_of }));
            Ok(body)
        }
        TypeClass::Object(id, def) => members_body(
            ctx,
            id,
            def.description.as_deref(),
            &def.fields,
            include,
            depth,
        ),
        TypeClass::ArgumentSet(id, def) => members_body(
            ctx,
            id,
            def.description.as_deref(),
            &def.arguments,
            include,
            depth,
        ),
    }
}

/// `$ref` to a projection of `class`, registered under `requested` unless a
/// different projection already holds that id.
fn partial_ref(
    ctx: &mut SynthesisContext<'_>,
    class: TypeClass<'_>,
    include: &IncludeSpec,
    requested: &str,
    depth: usize,
) -> AppResult<Value> {
    let key = ComponentKey::Partial {
        id: requested.to_string(),
        type_id: class.id().unwrap_or_default().to_string(),
        include: include.to_string(),
    };
    let id = ctx.components.claim(key, requested, None);
    let reference = register(ctx, &id, |ctx| {
        type_body(ctx, class, Some((include, &id)), depth + 1)
    })?;
    Ok(reference.to_value())
}

fn first_option<'d>(id: &str, def: &'d PolymorphDef) -> AppResult<&'d TypeRef> {
    def.options
        .values()
        .next()
        .ok_or_else(|| AppError::malformed(id, "polymorph has no options"))
}

fn scalar_value(class: TypeClass<'_>) -> Value {
    match class {
        TypeClass::Scalar(kind) => data_type(kind).to_value(),
        _ => json!({ "type": "object" }),
    }
}

/// Applies description and nullability to a rendered schema.
///
/// `$ref` may not have siblings in OpenAPI 3.0, so a nullable reference is
/// wrapped in `allOf` and a plain reference loses its description.
pub fn decorate(schema: Value, description: Option<&str>, nullable: bool) -> Value {
    let Value::Object(mut map) = schema else {
        return schema;
    };

    if map.contains_key("$ref") {
        if !nullable {
            return Value::Object(map);
        }
        let mut wrapper = JsonMap::new();
        wrapper.insert("allOf".to_string(), json!([Value::Object(map)]));
        wrapper.insert("nullable".to_string(), json!(true));
        if let Some(desc) = description {
            wrapper.insert("description".to_string(), json!(desc));
        }
        return Value::Object(wrapper);
    }

    if let Some(desc) = description {
        map.insert("description".to_string(), json!(desc));
    }
    if nullable {
        map.insert("nullable".to_string(), json!(true));
    }
    Value::Object(map)
}
