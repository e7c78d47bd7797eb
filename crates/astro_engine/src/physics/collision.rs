//! Collision resolution through the pairwise handler table

use std::sync::Arc;

use thiserror::Error;

use crate::entity::Entity;
use crate::types::TypeRegistry;

/// No handler exists for a colliding pair in either order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("collisions not defined between {kind_a} and {kind_b}")]
pub struct UnhandledCollisionError {
    /// Kind of the first entity
    pub kind_a: String,
    /// Kind of the second entity
    pub kind_b: String,
}

/// Which registered handler resolved a collision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handler for `(kind_a, kind_b)`, called as given
    Forward,
    /// Handler for `(kind_b, kind_a)`, called with the arguments swapped
    Reversed,
}

/// Routes colliding entity pairs to the handler registered for their kinds
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    types: Arc<TypeRegistry>,
}

impl CollisionResolver {
    /// Create a resolver over a registry
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    /// Registry the resolver dispatches through
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Run the handler for `a` and `b`.
    ///
    /// The handler for `(kind_a, kind_b)` is preferred; otherwise the one for
    /// `(kind_b, kind_a)` runs with the arguments in its own order.
    pub fn resolve(&self, a: &mut Entity, b: &mut Entity) -> Result<Dispatch, UnhandledCollisionError> {
        let kind_a = a.kind().name;
        let kind_b = b.kind().name;

        if let Some(handler) = self.types.get_handler(kind_a, kind_b) {
            log::trace!("Resolving {} -> {}", kind_a, kind_b);
            handler(a, b);
            return Ok(Dispatch::Forward);
        }
        if let Some(handler) = self.types.get_handler(kind_b, kind_a) {
            log::trace!("Resolving {} -> {} (reversed)", kind_b, kind_a);
            handler(b, a);
            return Ok(Dispatch::Reversed);
        }

        Err(UnhandledCollisionError {
            kind_a: kind_a.to_string(),
            kind_b: kind_b.to_string(),
        })
    }
}
