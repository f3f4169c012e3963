//! # Domain Layer (Inner Hexagon)
//!
//! Pure registry logic: value objects, the router store, the ownership guard
//! and the snapshot entity. NO I/O, NO logging.

pub mod access;
pub mod dictionary;
pub mod entities;
pub mod invariants;
pub mod value_objects;

pub use access::*;
pub use dictionary::*;
pub use entities::*;
pub use invariants::*;
pub use value_objects::*;
