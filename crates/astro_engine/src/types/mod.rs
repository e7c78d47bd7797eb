//! Entity kinds and their runtime lookup
//!
//! Every kind is described by a static [`TypeDescriptor`]. The
//! [`TypeRegistry`] collects them once at startup and answers two questions
//! afterwards: "which kind is called X?" and "who handles a collision between
//! X and Y?".

pub mod descriptor;
pub mod registry;

pub use descriptor::{Capabilities, Family, FieldDefault, HandlerFn, TypeDescriptor};
pub use registry::{CollisionHandler, RegistryError, TypeRegistry};
