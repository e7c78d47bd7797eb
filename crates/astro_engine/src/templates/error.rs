//! Template loading errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// What exactly is wrong with a template
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Problem {
    /// The record header names a kind nobody registered
    #[error("unknown kind `{0}`")]
    UnknownKind(String),

    /// Required fields still absent after defaults were applied
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field holds a value of the wrong shape
    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        /// Field name
        field: String,
        /// Human readable description of the expected value
        expected: &'static str,
        /// Description of the value actually given
        found: &'static str,
    },

    /// A numeric field is outside its allowed range
    #[error("field `{field}` {requirement}")]
    OutOfRange {
        /// Field name
        field: String,
        /// Human readable requirement, e.g. "must be positive"
        requirement: &'static str,
    },

    /// A reference names a template that has not been loaded (yet)
    #[error("reference to unknown template `{0}`")]
    UnknownReference(String),

    /// A reference names a template of an unexpected kind
    #[error("`{reference}` is a {found} template, expected {expected}")]
    WrongFamily {
        /// The reference as written
        reference: String,
        /// Kind or family the field accepts
        expected: String,
        /// Kind of the referenced template
        found: String,
    },

    /// A `Kind(key)` derivation whose body is not a table
    #[error("derived reference `{0}` must map to a table of overrides")]
    MalformedDerivation(String),

    /// Building a derived copy failed
    #[error("invalid derived template: {0}")]
    InvalidDerivation(Box<ValidationError>),
}

/// A template failed validation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}[{key}]: {problem}")]
pub struct ValidationError {
    /// Kind named in the record header
    pub kind: String,
    /// Template key
    pub key: String,
    /// What went wrong
    pub problem: Problem,
}

impl ValidationError {
    /// Create an error for one template
    pub fn new(kind: impl Into<String>, key: impl Into<String>, problem: Problem) -> Self {
        Self {
            kind: kind.into(),
            key: key.into(),
            problem,
        }
    }
}

/// Two templates were declared under the same key
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template key `{key}` from {origin} is already defined by {existing_origin}")]
pub struct DuplicateKeyError {
    /// The contested key
    pub key: String,
    /// Source declaring the second template
    pub origin: String,
    /// Source that declared the first template
    pub existing_origin: String,
}

/// Template loading errors
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Reading a source failed
    #[error("failed to read {path}: {source}")]
    Io {
        /// File or directory being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// A source is not a well-formed document
    #[error("failed to parse {origin}: {message}")]
    Parse {
        /// Source name
        origin: String,
        /// Parser message
        message: String,
    },

    /// A source file has an extension no parser handles
    #[error("unsupported template source {0}")]
    UnsupportedFormat(PathBuf),

    /// A category directory from the load order does not exist
    #[error("template category directory {0} does not exist")]
    MissingCategory(PathBuf),

    /// A template failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A template key was declared twice
    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),
}
