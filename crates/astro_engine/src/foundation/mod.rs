//! Small building blocks shared by every subsystem: screen-space vectors
//! and rectangles, frame timing, and the entity key type.

pub mod collections;
pub mod math;
pub mod time;
