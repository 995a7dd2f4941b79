//! # Type Definitions
//!
//! Objects, enums, argument sets, polymorphs and the fields/arguments that
//! connect them. Everything here is read-only input to a synthesis run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A reference to a type, as written on a field or argument.
///
/// Either the qualified id of an entry in [`crate::ApiDefinition::types`] or a
/// scalar kind name such as `string` or `unix_time`. Only the type classifier
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    /// Creates a reference from its textual form.
    pub fn new(reference: impl Into<String>) -> Self {
        TypeRef(reference.into())
    }

    /// The reference as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, reusable type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDef {
    /// An output object with fields.
    Object(ObjectDef),
    /// A closed set of string values.
    Enum(EnumDef),
    /// An input object with arguments.
    ArgumentSet(ArgumentSetDef),
    /// A union of named options.
    Polymorph(PolymorphDef),
}

/// An output object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

/// An enum type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Permitted values in declaration order.
    #[serde(default)]
    pub values: Vec<EnumValueDef>,
}

/// One enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDef {
    /// The literal value.
    pub name: String,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
}

/// An argument set (input object) type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSetDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Lookup sets expect exactly one of their arguments.
    #[serde(default)]
    pub lookup: bool,
    /// Arguments in declaration order.
    #[serde(default)]
    pub arguments: IndexMap<String, ArgumentDef>,
    /// Qualified ids of errors raised while resolving this set.
    #[serde(default)]
    pub potential_errors: Vec<String>,
}

/// A polymorph (union) type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolymorphDef {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Named options, each resolving to its own type.
    #[serde(default)]
    pub options: IndexMap<String, TypeRef>,
}

/// The `include` option of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInclude {
    /// `true` or `false`; either way every nested field is exposed.
    Flag(bool),
    /// An include specification such as `unix,year[as_string]`.
    Spec(String),
}

impl FieldInclude {
    /// The include specification, if this restricts the nested fields.
    pub fn spec(&self) -> Option<&str> {
        match self {
            FieldInclude::Flag(_) => None,
            FieldInclude::Spec(spec) => Some(spec),
        }
    }
}

/// A field of an object, endpoint or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// The field's type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Whether the field holds a list of `type_ref`.
    #[serde(default)]
    pub array: bool,
    /// Whether the field may be null.
    #[serde(default, rename = "null")]
    pub nullable: bool,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Restricts which nested fields are exposed.
    #[serde(default)]
    pub include: Option<FieldInclude>,
    /// Opaque display condition; only its presence matters.
    #[serde(default)]
    pub condition: Option<String>,
}

impl FieldDef {
    /// A plain, non-array, non-null field of the given type.
    pub fn of(type_ref: impl Into<String>) -> Self {
        FieldDef {
            type_ref: TypeRef::new(type_ref),
            array: false,
            nullable: false,
            description: None,
            include: None,
            condition: None,
        }
    }

    /// The include specification restricting nested fields, if any.
    pub fn include_spec(&self) -> Option<&str> {
        self.include.as_ref().and_then(FieldInclude::spec)
    }
}

/// An argument of an argument set or endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgumentDef {
    /// The argument's type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Whether the argument accepts a list of `type_ref`.
    #[serde(default)]
    pub array: bool,
    /// Whether the argument must be supplied.
    #[serde(default)]
    pub required: bool,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
}

impl ArgumentDef {
    /// An optional, non-array argument of the given type.
    pub fn of(type_ref: impl Into<String>) -> Self {
        ArgumentDef {
            type_ref: TypeRef::new(type_ref),
            array: false,
            required: false,
            description: None,
        }
    }
}

/// A declared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDef {
    /// Machine readable error code.
    pub code: String,
    /// HTTP status returned with the error.
    pub http_status: u16,
    /// Human readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Extra detail fields.
    #[serde(default)]
    pub fields: IndexMap<String, FieldDef>,
}

/// The common view of fields and arguments used by the schema synthesizer.
pub trait Member {
    /// The member's type.
    fn type_ref(&self) -> &TypeRef;
    /// Whether the member is a list.
    fn is_array(&self) -> bool;
    /// Whether the member may be null.
    fn is_nullable(&self) -> bool;
    /// Human readable description.
    fn description(&self) -> Option<&str>;
    /// Whether the member belongs in its parent's `required` list.
    fn is_required(&self) -> bool;
}

impl Member for FieldDef {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn is_array(&self) -> bool {
        self.array
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Conditional fields depend on response data, so they are never required.
    fn is_required(&self) -> bool {
        self.condition.is_none()
    }
}

impl Member for ArgumentDef {
    fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    fn is_array(&self) -> bool {
        self.array
    }

    fn is_nullable(&self) -> bool {
        false
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn is_required(&self) -> bool {
        self.required
    }
}
