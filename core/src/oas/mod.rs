#![deny(missing_docs)]

//! # OpenAPI Synthesis Module
//!
//! - **naming**: component, operation and error-group ids.
//! - **include**: the include-specification parser.
//! - **registry**: the write-once component buckets.
//! - **context**: per-run state.
//! - **schemas**: the recursive schema synthesizer.
//! - **operation**: parameters, request bodies and responses of one route.
//! - **security**: bearer security schemes.
//! - **normalization**: tags, tag groups and path ordering.
//! - **document**: the assembler tying it together.

pub mod context;
pub mod document;
pub mod include;
pub mod naming;
pub mod normalization;
pub mod operation;
pub mod registry;
pub mod schemas;
pub mod security;

pub use context::{PathIdSet, SynthesisContext, DEFAULT_MAX_DEPTH};
pub use document::build_document;
pub use include::IncludeSpec;
pub use registry::{ComponentRegistry, SchemaRef};
