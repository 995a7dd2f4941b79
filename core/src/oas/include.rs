//! # Include Specifications
//!
//! Parses the compact field-selection grammar attached to response fields,
//! e.g. `unix,year[as_string]` or `year[*,-as_integer]`, into a tree that the
//! schema synthesizer walks level by level.
//!
//! ```text
//! list := item ("," item)*
//! item := "*" | "-" name | name ("[" list "]")?
//! ```

use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use std::fmt::Display;

/// One level of a parsed include specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeSpec {
    all: bool,
    excluded: Vec<String>,
    fields: IndexMap<String, Option<IncludeSpec>>,
}

impl IncludeSpec {
    /// Parses an include specification.
    pub fn parse(spec: &str) -> AppResult<Self> {
        let mut parser = Parser {
            raw: spec,
            chars: spec.char_indices().peekable(),
        };
        let parsed = parser.list(0)?;
        match parser.chars.next() {
            None => Ok(parsed),
            Some((pos, c)) => Err(parser.error(format!("unexpected '{}' at {}", c, pos))),
        }
    }

    /// Whether `name` is exposed at this level.
    pub fn includes(&self, name: &str) -> bool {
        self.fields.contains_key(name) || (self.all && !self.excluded.iter().any(|e| e == name))
    }

    /// The restriction on `name`'s own nested fields, if it has one.
    ///
    /// `None` means the field is either not selected or selected whole.
    pub fn nested(&self, name: &str) -> Option<&IncludeSpec> {
        self.fields.get(name).and_then(Option::as_ref)
    }

    /// Checks every name this level mentions against the fields of `owner`.
    pub fn validate<'a>(
        &self,
        owner: &str,
        known: impl Iterator<Item = &'a str> + Clone,
    ) -> AppResult<()> {
        let mentioned = self.fields.keys().chain(self.excluded.iter());
        for name in mentioned {
            if !known.clone().any(|k| k == name) {
                return Err(AppError::UnknownIncludeField {
                    id: owner.to_string(),
                    field: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Canonical form: `*`, then exclusions, then selections.
impl Display for IncludeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut items = Vec::new();
        if self.all {
            items.push("*".to_string());
        }
        items.extend(self.excluded.iter().map(|name| format!("-{}", name)));
        for (name, nested) in &self.fields {
            match nested {
                Some(nested) => items.push(format!("{}[{}]", name, nested)),
                None => items.push(name.clone()),
            }
        }
        f.write_str(&items.join(","))
    }
}

struct Parser<'s> {
    raw: &'s str,
    chars: std::iter::Peekable<std::str::CharIndices<'s>>,
}

impl<'s> Parser<'s> {
    fn error(&self, reason: String) -> AppError {
        AppError::InvalidInclude {
            spec: self.raw.to_string(),
            reason,
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn list(&mut self, depth: usize) -> AppResult<IncludeSpec> {
        let mut spec = IncludeSpec::default();
        self.skip_whitespace();
        if self.at_list_end(depth) {
            return Ok(spec);
        }
        loop {
            self.item(&mut spec, depth)?;
            self.skip_whitespace();
            match self.chars.peek() {
                Some((_, ',')) => {
                    self.chars.next();
                }
                _ => return Ok(spec),
            }
        }
    }

    fn at_list_end(&mut self, depth: usize) -> bool {
        match self.chars.peek() {
            None => true,
            Some((_, ']')) => depth > 0,
            _ => false,
        }
    }

    fn item(&mut self, spec: &mut IncludeSpec, depth: usize) -> AppResult<()> {
        self.skip_whitespace();
        match self.chars.peek() {
            Some((_, '*')) => {
                self.chars.next();
                spec.all = true;
                Ok(())
            }
            Some((_, '-')) => {
                self.chars.next();
                let name = self.name()?;
                spec.excluded.push(name);
                Ok(())
            }
            _ => {
                let name = self.name()?;
                self.skip_whitespace();
                let nested = if let Some((_, '[')) = self.chars.peek() {
                    self.chars.next();
                    let nested = self.list(depth + 1)?;
                    self.skip_whitespace();
                    match self.chars.next() {
                        Some((_, ']')) => Some(nested),
                        _ => return Err(self.error(format!("unclosed '[' after '{}'", name))),
                    }
                } else {
                    None
                };
                spec.fields.insert(name, nested);
                Ok(())
            }
        }
    }

    fn name(&mut self) -> AppResult<String> {
        self.skip_whitespace();
        let mut name = String::new();
        while let Some((_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || *c == '_' {
                name.push(*c);
                self.chars.next();
            } else {
                break;
            }
        }
        if name.is_empty() {
            let found = self
                .chars
                .peek()
                .map(|(pos, c)| format!("'{}' at {}", c, pos))
                .unwrap_or_else(|| "end of input".to_string());
            return Err(self.error(format!("expected a field name, found {}", found)));
        }
        Ok(name)
    }
}
