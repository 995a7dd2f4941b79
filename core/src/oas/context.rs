//! # Synthesis Context
//!
//! State owned by one synthesis run and threaded by `&mut` through every
//! builder. Nothing here outlives the run.

use crate::definition::{ApiDefinition, HttpMethod};
use crate::oas::naming::{fallback_operation_id, operation_id};
use crate::oas::registry::ComponentRegistry;
use std::collections::HashSet;
use tracing::debug;

/// Default bound on schema nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Operation ids handed out so far.
#[derive(Debug, Default)]
pub struct PathIdSet {
    ids: HashSet<String>,
}

impl PathIdSet {
    /// Allocates the operation id for a route.
    ///
    /// The derived id is preferred; on collision the literal path is used, and
    /// if even that is taken a numeric suffix is appended.
    pub fn allocate(&mut self, method: HttpMethod, path: &str) -> String {
        let derived = operation_id(method, path);
        if self.ids.insert(derived.clone()) {
            return derived;
        }

        let fallback = fallback_operation_id(method, path);
        debug!(derived = %derived, fallback = %fallback, "operation id collision");
        if self.ids.insert(fallback.clone()) {
            return fallback;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", fallback, n);
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Everything one run reads and writes.
pub struct SynthesisContext<'a> {
    /// The definition being documented.
    pub api: &'a ApiDefinition,
    /// Reusable schemas and responses.
    pub components: ComponentRegistry,
    /// Allocated operation ids.
    pub path_ids: PathIdSet,
    /// Maximum schema nesting before failing.
    pub max_depth: usize,
}

impl<'a> SynthesisContext<'a> {
    /// Fresh state for one run over `api`.
    pub fn new(api: &'a ApiDefinition, max_depth: usize) -> Self {
        SynthesisContext {
            api,
            components: ComponentRegistry::new(),
            path_ids: PathIdSet::default(),
            max_depth,
        }
    }
}

impl AsMut<ComponentRegistry> for SynthesisContext<'_> {
    fn as_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }
}
