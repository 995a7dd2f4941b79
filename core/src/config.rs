#![deny(missing_docs)]

//! # Synthesis Options
//!
//! Caller-supplied overrides for a synthesis run. Every key is optional, so
//! an empty YAML document is a valid configuration.

use crate::error::AppResult;
use crate::oas::context::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Overrides applied to the generated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct SynthesisOptions {
    /// Keys merged into (and replacing those of) the `info` object.
    #[serde(default)]
    pub info: Map<String, Value>,
    /// The `externalDocs` object; omitted from the document when empty.
    #[serde(default)]
    pub external_docs: Map<String, Value>,
    /// Extra or replacement security schemes, keyed by scheme name.
    #[serde(default)]
    pub security_schemes: Map<String, Value>,
    /// Maximum schema nesting before synthesis fails.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            info: Map::new(),
            external_docs: Map::new(),
            security_schemes: Map::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SynthesisOptions {
    /// Parses options from YAML.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}
