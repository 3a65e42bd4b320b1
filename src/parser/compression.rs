//! Name compression table.
//!
//! Callgrind shortens repeated names with parenthesized reference tokens:
//! `fn=(12) main` defines token `(12)`, a later `cfn=(12)` reuses it. Each
//! entity kind has its own token space.

use log::trace;
use std::collections::HashMap;

/// Entity kinds with independent token spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Object,
    File,
    Function,
    Jump,
}

/// How the value of a field-assignment line names its entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValue<'a> {
    /// Token followed by the literal it stands for, e.g. `(3) foo`
    Definition { token: &'a str, literal: String },

    /// Token alone, e.g. `(3)`
    Reference(&'a str),

    /// Plain name without any token
    Literal(&'a str),
}

impl<'a> NameValue<'a> {
    /// Classify the value part of a `key=value` line
    pub fn classify(value: &'a str) -> Self {
        let value = value.trim();
        let mut pieces = value.split_whitespace();

        match pieces.next() {
            Some(first) if is_reference_token(first) => {
                let literal = pieces.collect::<Vec<_>>().join(" ");
                if literal.is_empty() {
                    NameValue::Reference(first)
                } else {
                    NameValue::Definition {
                        token: first,
                        literal,
                    }
                }
            }
            _ => NameValue::Literal(value),
        }
    }

    /// Text stored in the record's field: the token when one is present
    pub fn field_value(&self) -> &'a str {
        match self {
            NameValue::Definition { token, .. } => token,
            NameValue::Reference(token) => token,
            NameValue::Literal(name) => name,
        }
    }
}

/// Whether a piece of text is a parenthesized reference token
pub fn is_reference_token(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('(') && text.ends_with(')')
}

/// Token -> literal mappings for every entity kind
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    tables: HashMap<EntityKind, Vec<(String, String)>>,
    index: HashMap<(EntityKind, String), usize>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `literal` under `token`. The first definition of a token wins.
    ///
    /// Returns false when the token was already defined.
    pub fn define(&mut self, kind: EntityKind, token: &str, literal: &str) -> bool {
        let key = (kind, token.to_string());
        if self.index.contains_key(&key) {
            trace!("Ignoring redefinition of {:?} {}", kind, token);
            return false;
        }

        let entries = self.tables.entry(kind).or_default();
        self.index.insert(key, entries.len());
        entries.push((token.to_string(), literal.to_string()));
        trace!("Defined {:?} {} => {}", kind, token, literal);
        true
    }

    /// Literal for `token`, or the token itself when it was never defined
    pub fn resolve<'a>(&'a self, kind: EntityKind, token: &'a str) -> &'a str {
        self.index
            .get(&(kind, token.to_string()))
            .and_then(|&i| self.tables.get(&kind).and_then(|entries| entries.get(i)))
            .map(|(_, literal)| literal.as_str())
            .unwrap_or(token)
    }

    /// First token, in definition order, whose literal is `literal`
    pub fn token_for(&self, kind: EntityKind, literal: &str) -> Option<&str> {
        self.tables
            .get(&kind)?
            .iter()
            .find(|(_, l)| l == literal)
            .map(|(token, _)| token.as_str())
    }

    /// Number of tokens defined for a kind
    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables.get(&kind).map_or(0, Vec::len)
    }

    /// Apply a classified field value: definitions are recorded, references
    /// and literals leave the table untouched
    pub fn record(&mut self, kind: EntityKind, value: &NameValue<'_>) {
        if let NameValue::Definition { token, literal } = value {
            self.define(kind, token, literal);
        }
    }
}
