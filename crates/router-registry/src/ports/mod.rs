//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions between the registry and its host.
//!
//! - **Driving Ports (Inbound)**: `RegistryApi`
//! - **Driven Ports (Outbound)**: `AccountStore`, `MessageSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
