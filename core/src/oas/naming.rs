#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Deterministic identifiers for operations, schema components and response
//! components. Ids double as file names in generated clients, so every
//! synthesized id has a bounded length.

use crate::definition::HttpMethod;
use heck::ToUpperCamelCase;
use regex::Regex;
use std::fmt::Display;
use std::sync::OnceLock;

/// Paths at least this long are abbreviated when used as a fallback operation id.
pub const FALLBACK_PATH_LIMIT: usize = 50;

/// Concatenated error-group ids longer than this are truncated.
pub const ERROR_GROUP_ID_LIMIT: usize = 80;

/// Hard cap on an error-group id, leaving room for a `_N` suffix and
/// `Response` under 100 characters.
pub const ERROR_GROUP_ID_MAX: usize = 88;

/// Role of a synthesized partial-schema id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A top-level response field.
    Response,
    /// A nested part of a response field.
    Part,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Response => write!(f, "Response"),
            Role::Part => write!(f, "Part"),
        }
    }
}

/// Component id of a definition: the last segment of its qualified id.
///
/// e.g. `CoreAPI/Objects/TimeZone` -> `TimeZone`
pub fn component_id(qualified_id: &str) -> String {
    qualified_id
        .rsplit(['/', '.'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(qualified_id)
        .to_string()
}

/// Component id spelling out the whole qualified id, used when the last
/// segment is already taken.
///
/// e.g. `CoreAPI/ArgumentSets/ZoneLookup/NotFound` -> `CoreAPI_ArgumentSets_ZoneLookup_NotFound`
pub fn qualified_component_id(qualified_id: &str) -> String {
    qualified_id
        .split(['/', '.'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Converts a route path template to OpenAPI path syntax.
///
/// e.g. `test/:object` -> `/test/{object}`
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<String> = path
        .trim_matches('/')
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(param) => format!("{{{}}}", param),
            None => segment.to_string(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Names of the `:param` segments of a path template, in order, without repeats.
pub fn path_params(path: &str) -> Vec<&str> {
    let mut params: Vec<&str> = Vec::new();
    for param in path.split('/').filter_map(|p| p.strip_prefix(':')) {
        if !params.contains(&param) {
            params.push(param);
        }
    }
    params
}

/// Derives an operation id from the method and path.
///
/// Parameter segments are kept once; literal segments naming a parameter
/// (or its plural) are dropped, so `/virtual_machines/:virtual_machine/start`
/// becomes `post:virtual_machine_start`.
pub fn operation_id(method: HttpMethod, path: &str) -> String {
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    let params = path_params(path);
    let plurals: Vec<String> = params.iter().map(|p| pluralize(p)).collect();

    let mut result: Vec<&str> = Vec::new();
    for &part in &parts {
        if let Some(param) = part.strip_prefix(':') {
            if !result.contains(&param) {
                result.push(param);
            }
        } else if !params
            .iter()
            .zip(&plurals)
            .any(|(param, plural)| part == *param || part.contains(plural.as_str()))
        {
            result.push(part);
        }
    }

    format!("{}:{}", method, result.join("_"))
}

/// Operation id used when [`operation_id`] collides: the literal path,
/// abbreviated to the first letter of each `/`, `_` or `:` delimited word once
/// it reaches [`FALLBACK_PATH_LIMIT`] characters.
pub fn fallback_operation_id(method: HttpMethod, path: &str) -> String {
    let path = path.trim_matches('/');
    let last_part = if path.len() >= FALLBACK_PATH_LIMIT {
        path.split(['_', ':', '/'])
            .map(|word| word.chars().next().map(String::from).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("_")
    } else {
        path.to_string()
    };
    format!("{}:{}", method, last_part)
}

/// Makes an operation id safe for use inside component ids.
///
/// The method separator becomes `_`, other colons are dropped, slashes become `_`.
pub fn sanitize_operation_id(operation_id: &str) -> String {
    operation_id
        .replacen(':', "_", 1)
        .replace(':', "")
        .replace('/', "_")
}

/// Id of the partial schema for one response field.
///
/// e.g. (`get:time_now`, 200, Response, `time`) -> `GetTimeNow200ResponseTime`
pub fn field_schema_id(operation_id: &str, http_status: u16, role: Role, field: &str) -> String {
    format!(
        "{}_{}_{}_{}",
        sanitize_operation_id(operation_id),
        http_status,
        role,
        field
    )
    .to_upper_camel_case()
}

fn part_prefix() -> &'static Regex {
    static PART_PREFIX: OnceLock<Regex> = OnceLock::new();
    PART_PREFIX.get_or_init(|| {
        Regex::new(r"^.*?\d{3}(?:Response|Part).*?Part").expect("static regex is valid")
    })
}

/// Id of a nested partial schema below `parent_id`.
///
/// Everything after the first `Part` marker of the parent is dropped before the
/// child is appended, so ids stay bounded under deep nesting:
/// `X200ResponseTime` -> `X200ResponseTimePartYear`, and a child of that
/// becomes `X200ResponseTimePartAsString`.
pub fn nested_part_id(parent_id: &str, child: &str) -> String {
    let base = match part_prefix().find(parent_id) {
        Some(prefix) => prefix.as_str().to_string(),
        None => format!("{}{}", parent_id, Role::Part),
    };
    format!("{}{}", base, child.to_upper_camel_case())
}

/// Id shared by several errors returned with one HTTP status.
///
/// The sorted ids are concatenated; past [`ERROR_GROUP_ID_LIMIT`] characters
/// only the first and the last two are kept, and the result is cut at
/// [`ERROR_GROUP_ID_MAX`] characters. Distinct groups may therefore share an
/// id; the registry disambiguates them.
pub fn error_group_id(error_ids: &[String]) -> String {
    let mut sorted: Vec<&str> = error_ids.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let joined = sorted.concat();
    let mut id = if joined.len() <= ERROR_GROUP_ID_LIMIT || sorted.len() <= 3 {
        joined
    } else {
        let n = sorted.len();
        [sorted[0], sorted[n - 2], sorted[n - 1]].concat()
    };
    if let Some((cut, _)) = id.char_indices().nth(ERROR_GROUP_ID_MAX) {
        id.truncate(cut);
    }
    id
}

/// English plural of a snake_case word, enough for resource names.
pub fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if matches!(before_y, Some(c) if !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
        return format!("{}s", word);
    }
    if word.ends_with('s')
        || word.ends_with('x')
        || word.ends_with('z')
        || word.ends_with("sh")
        || word.ends_with("ch")
    {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
