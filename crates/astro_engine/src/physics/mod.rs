//! Motion and collision resolution

pub mod collision;
pub mod kinematics;

pub use collision::{CollisionResolver, Dispatch, UnhandledCollisionError};
pub use kinematics::{KinematicController, Steering};
