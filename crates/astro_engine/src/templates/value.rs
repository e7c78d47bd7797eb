//! Field values before and after resolution

use std::collections::BTreeMap;

use serde::Deserialize;

use super::records::Template;
use crate::types::FieldDefault;

/// A field value exactly as written in a source document
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// `true` / `false`
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// String, possibly a template reference
    Text(String),
    /// Sequence of values
    List(Vec<RawValue>),
    /// Nested table, possibly a derived reference
    Table(RawFields),
}

/// Declared fields of one template
pub type RawFields = BTreeMap<String, RawValue>;

/// A whole source document: kind name, then template key, then fields
pub type RawDocument = BTreeMap<String, BTreeMap<String, RawFields>>;

impl From<FieldDefault> for RawValue {
    fn from(value: FieldDefault) -> Self {
        match value {
            FieldDefault::Bool(b) => Self::Bool(b),
            FieldDefault::Number(n) => Self::Float(n),
            FieldDefault::Text(s) => Self::Text(s.to_string()),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A field value after defaults were applied and references resolved
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Boolean
    Bool(bool),
    /// Any number
    Number(f64),
    /// Plain string
    Text(String),
    /// Sequence
    List(Vec<FieldValue>),
    /// Nested table
    Table(BTreeMap<String, FieldValue>),
    /// Link to another template
    Template(Template),
}

impl FieldValue {
    /// Short description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Bool(_) => "a boolean",
            Self::Number(_) => "a number",
            Self::Text(_) => "a string",
            Self::List(_) => "a list",
            Self::Table(_) => "a table",
            Self::Template(_) => "a template",
        }
    }
}

/// Split `Kind[key]`, the syntax for referring to a loaded template
pub fn template_reference(text: &str) -> Option<(&str, &str)> {
    split_reference(text, '[', ']')
}

/// Split `Kind(key)`, the syntax for a modified copy of a loaded template
pub fn derived_reference(text: &str) -> Option<(&str, &str)> {
    split_reference(text, '(', ')')
}

fn split_reference(text: &str, open: char, close: char) -> Option<(&str, &str)> {
    let inner = text.strip_suffix(close)?;
    let (kind, key) = inner.split_once(open)?;
    (is_word(kind) && is_word(key)).then_some((kind, key))
}

fn is_word(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c.is_alphanumeric() || c == '_')
}
