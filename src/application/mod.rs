//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: Session lifecycle, task scheduling
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing and routing, event fan-out

pub mod errors;
pub mod services;
pub mod messaging;
