//! Backend abstraction layer
//!
//! Defines the traits and types a device/allocation backend must implement.
//! The graph compiler only ever talks to the GPU through these interfaces.

pub mod traits;
pub mod types;
