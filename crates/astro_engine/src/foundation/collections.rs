//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a live entity in the world.
    ///
    /// Handles of removed entities never alias later ones.
    pub struct EntityId;
}

/// Handle-based map of entities
pub type EntityMap<T> = SlotMap<EntityId, T>;
