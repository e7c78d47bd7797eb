//! Kind lookup and collision handler table

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::descriptor::TypeDescriptor;
use crate::entity::{Entity, BUILTIN_KINDS};

/// Collision handler stored in the registry.
///
/// Called with an entity of the pair's first kind, then one of the second.
pub type CollisionHandler = Arc<dyn Fn(&mut Entity, &mut Entity) + Send + Sync>;

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Kind names must be non-empty lowercase identifiers
    #[error("kind name `{0}` is not a lowercase identifier")]
    InvalidName(String),

    /// The kind was registered before
    #[error("kind `{0}` is already registered")]
    DuplicateKind(String),

    /// A handler refers to a kind nobody registered
    #[error("collision handler refers to unknown kind `{0}`")]
    UnknownKind(String),

    /// The ordered pair already has a handler
    #[error("collision handler for ({0}, {1}) is already registered")]
    DuplicateHandler(String, String),
}

/// Mapping from kind name to descriptor, plus the pairwise collision
/// handlers.
///
/// Built once at startup and shared read-only afterwards; there is no way to
/// remove a kind or a handler.
#[derive(Default)]
pub struct TypeRegistry {
    kinds: HashMap<&'static str, &'static TypeDescriptor>,
    handlers: HashMap<(&'static str, &'static str), CollisionHandler>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every kind the engine ships with
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for &kind in BUILTIN_KINDS {
            registry.register(kind)?;
        }
        registry.validate()?;
        log::debug!(
            "Type registry built with {} kinds and {} collision handlers",
            registry.kinds.len(),
            registry.handlers.len()
        );
        Ok(registry)
    }

    /// Register a kind together with the handlers it declares
    pub fn register(&mut self, descriptor: &'static TypeDescriptor) -> Result<(), RegistryError> {
        check_name(descriptor.name)?;
        if self.kinds.contains_key(descriptor.name) {
            return Err(RegistryError::DuplicateKind(descriptor.name.to_string()));
        }
        self.kinds.insert(descriptor.name, descriptor);

        for &(partner, handler) in descriptor.handlers {
            check_name(partner)?;
            self.insert_handler(descriptor.name, partner, Arc::new(handler))?;
        }
        Ok(())
    }

    /// Register a handler for the ordered pair `(kind_a, kind_b)`; both kinds
    /// must already be registered
    pub fn register_handler<F>(&mut self, kind_a: &str, kind_b: &str, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(&mut Entity, &mut Entity) + Send + Sync + 'static,
    {
        let a = self
            .lookup(kind_a)
            .ok_or_else(|| RegistryError::UnknownKind(kind_a.to_string()))?;
        let b = self
            .lookup(kind_b)
            .ok_or_else(|| RegistryError::UnknownKind(kind_b.to_string()))?;
        self.insert_handler(a.name, b.name, Arc::new(handler))
    }

    /// Check that every handler partner names a registered kind
    pub fn validate(&self) -> Result<(), RegistryError> {
        for &(a, b) in self.handlers.keys() {
            for kind in [a, b] {
                if !self.kinds.contains_key(kind) {
                    return Err(RegistryError::UnknownKind(kind.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Find a kind by name, ignoring case
    pub fn lookup(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.kinds.get(name.to_ascii_lowercase().as_str()).copied()
    }

    /// Handler for the ordered pair `(kind_a, kind_b)`
    pub fn get_handler(&self, kind_a: &str, kind_b: &str) -> Option<&CollisionHandler> {
        let a = self.lookup(kind_a)?;
        let b = self.lookup(kind_b)?;
        self.handlers.get(&(a.name, b.name))
    }

    /// Iterate over every registered kind
    pub fn kinds(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        self.kinds.values().copied()
    }

    /// Number of registered kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no kind is registered
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    fn insert_handler(
        &mut self,
        kind_a: &'static str,
        kind_b: &'static str,
        handler: CollisionHandler,
    ) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&(kind_a, kind_b)) {
            return Err(RegistryError::DuplicateHandler(kind_a.to_string(), kind_b.to_string()));
        }
        self.handlers.insert((kind_a, kind_b), handler);
        Ok(())
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.kinds.keys().collect();
        kinds.sort();
        let mut pairs: Vec<_> = self.handlers.keys().collect();
        pairs.sort();
        f.debug_struct("TypeRegistry")
            .field("kinds", &kinds)
            .field("handlers", &pairs)
            .finish()
    }
}

fn check_name(name: &str) -> Result<(), RegistryError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Capabilities, Family, HandlerFn};

    static ROCK: TypeDescriptor = TypeDescriptor {
        name: "rock",
        family: Family::Projectile,
        capabilities: Capabilities::COLLIDABLE,
        required_fields: &[],
        defaults: &[],
        handlers: &[("comet", rock_hits_comet as HandlerFn)],
    };

    static COMET: TypeDescriptor = TypeDescriptor {
        name: "comet",
        family: Family::Projectile,
        capabilities: Capabilities::COLLIDABLE,
        required_fields: &[],
        defaults: &[],
        handlers: &[],
    };

    static SHOUTY: TypeDescriptor = TypeDescriptor {
        name: "Shouty",
        family: Family::Ship,
        capabilities: Capabilities::empty(),
        required_fields: &[],
        defaults: &[],
        handlers: &[],
    };

    fn rock_hits_comet(_rock: &mut Entity, comet: &mut Entity) {
        comet.destroy();
    }

    #[test]
    fn test_builtin_kinds() {
        let registry = TypeRegistry::builtin().unwrap();

        for name in ["projectile", "weapon", "ship", "playership", "enemyship"] {
            assert!(registry.lookup(name).is_some(), "missing {name}");
        }
        assert_eq!(registry.len(), 5);
        let mut names: Vec<_> = registry.kinds().map(|kind| kind.name).collect();
        names.sort_unstable();
        assert_eq!(names, ["enemyship", "playership", "projectile", "ship", "weapon"]);
        assert!(registry.get_handler("playership", "projectile").is_some());
        assert!(registry.get_handler("projectile", "playership").is_none());
    }

    #[test]
    fn test_lookup_normalizes_case() {
        let registry = TypeRegistry::builtin().unwrap();
        let descriptor = registry.lookup("PlayerShip").unwrap();
        assert_eq!(descriptor.name, "playership");
        assert!(registry.get_handler("PLAYERSHIP", "Projectile").is_some());
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let mut registry = TypeRegistry::new();
        registry.register(&COMET).unwrap();
        assert_eq!(
            registry.register(&COMET),
            Err(RegistryError::DuplicateKind("comet".to_string()))
        );
    }

    #[test]
    fn test_non_normalized_name_rejected() {
        let mut registry = TypeRegistry::new();
        assert_eq!(
            registry.register(&SHOUTY),
            Err(RegistryError::InvalidName("Shouty".to_string()))
        );
    }

    #[test]
    fn test_validate_reports_missing_partner() {
        let mut registry = TypeRegistry::new();
        registry.register(&ROCK).unwrap();
        assert_eq!(registry.validate(), Err(RegistryError::UnknownKind("comet".to_string())));

        registry.register(&COMET).unwrap();
        assert_eq!(registry.validate(), Ok(()));
        assert!(registry.get_handler("rock", "comet").is_some());
    }

    #[test]
    fn test_register_handler_requires_known_kinds() {
        let mut registry = TypeRegistry::new();
        registry.register(&COMET).unwrap();

        let err = registry.register_handler("comet", "rock", |_, _| {}).unwrap_err();
        assert_eq!(err, RegistryError::UnknownKind("rock".to_string()));

        registry.register_handler("Comet", "comet", |_, _| {}).unwrap();
        let err = registry.register_handler("comet", "comet", |_, _| {}).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateHandler("comet".to_string(), "comet".to_string())
        );
    }
}
