//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod roles;

pub use user::User;
pub use message::{Invocation, Occurrence};
pub use roles::RoleTable;
