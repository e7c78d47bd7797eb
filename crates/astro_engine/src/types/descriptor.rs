//! Static description of one entity kind

use std::fmt;

use bitflags::bitflags;

use crate::entity::Entity;

bitflags! {
    /// What an entity kind can do
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// Takes part in collision checks
        const COLLIDABLE = 1 << 0;
        /// Velocity is steered by player input
        const CONTROLLABLE = 1 << 1;
        /// Clamped inside the screen instead of being removed off-screen
        const CONFINED = 1 << 2;
        /// On the player's side; sprites are drawn upside down
        const FRIENDLY = 1 << 3;
        /// Opposes the player
        const HOSTILE = 1 << 4;
    }
}

/// Broad family of a kind; templates of one family may reference each other
/// through the family's root kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Fired by weapons
    Projectile,
    /// Mounted on ships
    Weapon,
    /// Flown by the player or the enemy
    Ship,
}

impl Family {
    /// Name of the family's root kind
    pub const fn name(self) -> &'static str {
        match self {
            Self::Projectile => "projectile",
            Self::Weapon => "weapon",
            Self::Ship => "ship",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default value applied to a template field before declared values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// Boolean default
    Bool(bool),
    /// Numeric default
    Number(f64),
    /// Text default
    Text(&'static str),
}

/// Collision handler contributed by a kind: the first argument is always an
/// entity of the declaring kind, the second one of the partner kind
pub type HandlerFn = fn(&mut Entity, &mut Entity);

/// Everything the engine knows about one entity kind.
///
/// Descriptors are declared as statics next to the code of their kind and
/// registered once when the [`TypeRegistry`](super::TypeRegistry) is built.
#[derive(Debug)]
pub struct TypeDescriptor {
    /// Case-normalized kind name
    pub name: &'static str,

    /// Family the kind belongs to
    pub family: Family,

    /// Capability set
    pub capabilities: Capabilities,

    /// Fields every template of this kind must end up with
    pub required_fields: &'static [&'static str],

    /// Values applied before the declared fields of a template
    pub defaults: &'static [(&'static str, FieldDefault)],

    /// Collision handlers keyed by partner kind name
    pub handlers: &'static [(&'static str, HandlerFn)],
}

impl TypeDescriptor {
    /// Check a capability
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Whether this is the root kind of its family (`ship` for ships)
    pub fn is_family_root(&self) -> bool {
        self.name == self.family.name()
    }

    /// Whether a reference written as this kind may point at a template of
    /// `other`'s kind. A family root accepts every kind of its family.
    pub fn accepts(&self, other: &TypeDescriptor) -> bool {
        self.name == other.name || (self.is_family_root() && self.family == other.family)
    }

    /// Default for one field, if the kind declares it
    pub fn default_for(&self, field: &str) -> Option<FieldDefault> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| *value)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ROOT: TypeDescriptor = TypeDescriptor {
        name: "ship",
        family: Family::Ship,
        capabilities: Capabilities::CONFINED,
        required_fields: &[],
        defaults: &[("hp", FieldDefault::Number(10.0))],
        handlers: &[],
    };

    static FIGHTER: TypeDescriptor = TypeDescriptor {
        name: "fighter",
        family: Family::Ship,
        capabilities: Capabilities::CONFINED.union(Capabilities::FRIENDLY),
        required_fields: &[],
        defaults: &[],
        handlers: &[],
    };

    #[test]
    fn test_family_root_accepts_family_members() {
        assert!(ROOT.is_family_root());
        assert!(!FIGHTER.is_family_root());
        assert!(ROOT.accepts(&FIGHTER));
        assert!(FIGHTER.accepts(&FIGHTER));
        assert!(!FIGHTER.accepts(&ROOT));
    }

    #[test]
    fn test_capabilities_and_defaults() {
        assert!(FIGHTER.has(Capabilities::FRIENDLY));
        assert!(!ROOT.has(Capabilities::FRIENDLY));
        assert_eq!(ROOT.default_for("hp"), Some(FieldDefault::Number(10.0)));
        assert_eq!(ROOT.default_for("speed"), None);
    }
}
