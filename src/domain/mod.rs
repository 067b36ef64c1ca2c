//! Domain layer - Core business objects with no external dependencies
//!
//! This layer contains:
//! - Entities: Users, occurrences, invocations, role tables
//! - Traits: Abstractions over the protocol client (Outbound, EventSource)

pub mod entities;
pub mod traits;
