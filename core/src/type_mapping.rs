#![deny(missing_docs)]

//! # Type Mapping
//!
//! Classifies type references from the API definition and maps scalar kinds
//! to OpenAPI data types. This is the only place that interprets a raw
//! [`TypeRef`].

use crate::definition::{
    ApiDefinition, ArgumentSetDef, EnumDef, ObjectDef, PolymorphDef, TypeDef, TypeRef,
};
use crate::error::{AppError, AppResult};
use serde_json::{json, Map, Value};
use std::fmt::Display;
use std::str::FromStr;

/// Represents the simplified JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// A string type.
    String,
    /// An integer type.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean type.
    Boolean,
}

impl Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Number => write!(f, "number"),
            JsonType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Represents the schema definition for a mapped scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSchema {
    /// The primary JSON type.
    pub type_: JsonType,
    /// Optional format specifier (e.g., "date", "float").
    pub format: Option<&'static str>,
}

impl JsonSchema {
    /// Renders `{type, format?}`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!(self.type_.to_string()));
        if let Some(format) = self.format {
            schema.insert("format".to_string(), json!(format));
        }
        schema
    }

    /// Renders `{type, format?}` as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

/// The scalar kinds with a known OpenAPI mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `float`
    Float,
    /// `decimal`
    Decimal,
    /// `unix_time`, seconds since the epoch.
    UnixTime,
    /// `date`
    Date,
    /// `base64`
    Base64,
}

impl FromStr for ScalarKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ScalarKind::String),
            "integer" => Ok(ScalarKind::Integer),
            "boolean" => Ok(ScalarKind::Boolean),
            "float" => Ok(ScalarKind::Float),
            "decimal" => Ok(ScalarKind::Decimal),
            "unix_time" => Ok(ScalarKind::UnixTime),
            "date" => Ok(ScalarKind::Date),
            "base64" => Ok(ScalarKind::Base64),
            _ => Err(()),
        }
    }
}

/// Maps a scalar kind to its OpenAPI data type.
pub fn data_type(kind: ScalarKind) -> JsonSchema {
    match kind {
        ScalarKind::String => simple(JsonType::String),
        ScalarKind::Integer => simple(JsonType::Integer),
        ScalarKind::Boolean => simple(JsonType::Boolean),
        ScalarKind::Float | ScalarKind::Decimal => formatted(JsonType::Number, "float"),
        ScalarKind::UnixTime => formatted(JsonType::Integer, "int64"),
        ScalarKind::Date => formatted(JsonType::String, "date"),
        ScalarKind::Base64 => formatted(JsonType::String, "byte"),
    }
}

/// A classified type reference.
#[derive(Debug, Clone, Copy)]
pub enum TypeClass<'a> {
    /// A scalar value.
    Scalar(ScalarKind),
    /// An enum, with its qualified id.
    Enum(&'a str, &'a EnumDef),
    /// An object, with its qualified id.
    Object(&'a str, &'a ObjectDef),
    /// An argument set, with its qualified id.
    ArgumentSet(&'a str, &'a ArgumentSetDef),
    /// A polymorph, with its qualified id.
    Polymorph(&'a str, &'a PolymorphDef),
}

impl<'a> TypeClass<'a> {
    /// Qualified id of a named type; `None` for scalars.
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            TypeClass::Scalar(_) => None,
            TypeClass::Enum(id, _)
            | TypeClass::Object(id, _)
            | TypeClass::ArgumentSet(id, _)
            | TypeClass::Polymorph(id, _) => Some(id),
        }
    }
}

/// Classifies `type_ref`, which is used by the definition `owner`.
///
/// A reference naming an entry of `api.types` is that type. Anything else
/// without a `/` must be a known scalar kind; anything else with a `/` is a
/// dangling reference. Both failures are fatal.
pub fn classify<'a>(
    api: &'a ApiDefinition,
    type_ref: &TypeRef,
    owner: &str,
) -> AppResult<TypeClass<'a>> {
    if let Some((id, def)) = api.types.get_key_value(type_ref.as_str()) {
        let id = id.as_str();
        return Ok(match def {
            TypeDef::Object(o) => TypeClass::Object(id, o),
            TypeDef::Enum(e) => TypeClass::Enum(id, e),
            TypeDef::ArgumentSet(a) => TypeClass::ArgumentSet(id, a),
            TypeDef::Polymorph(p) => TypeClass::Polymorph(id, p),
        });
    }

    if type_ref.as_str().contains('/') {
        return Err(AppError::UnresolvedType {
            id: owner.to_string(),
            reference: type_ref.to_string(),
        });
    }

    type_ref
        .as_str()
        .parse::<ScalarKind>()
        .map(TypeClass::Scalar)
        .map_err(|_| AppError::UnknownScalar {
            id: owner.to_string(),
            kind: type_ref.to_string(),
        })
}

// Helpers for cleaner construction
fn simple(t: JsonType) -> JsonSchema {
    JsonSchema {
        type_: t,
        format: None,
    }
}

fn formatted(t: JsonType, fmt: &'static str) -> JsonSchema {
    JsonSchema {
        type_: t,
        format: Some(fmt),
    }
}
