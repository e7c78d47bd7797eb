//! Declarative entity templates
//!
//! Templates are read from TOML or RON documents grouped in category
//! directories. Each record header names a kind and a key:
//!
//! ```toml
//! [Weapon.blaster]
//! rate_of_fire = 4.0
//! projectiles = ["Projectile[bolt]"]
//! ```
//!
//! Kind defaults are applied first, then the declared fields. Required
//! fields are checked, references to earlier templates are resolved and the
//! result is stored as an immutable typed record.

pub mod error;
pub mod records;
pub mod registry;
pub mod value;

pub use error::{DuplicateKeyError, Problem, TemplateError, ValidationError};
pub use records::{ProjectileTemplate, ShipTemplate, Template, WeaponTemplate};
pub use registry::{Source, TemplateRegistry};
pub use value::{FieldValue, RawDocument, RawFields, RawValue};

/// Category directories in dependency order
pub const DEFAULT_LOAD_ORDER: [&str; 3] = ["projectiles", "weapons", "ships"];
