//! Type-safe wrappers for common domain concepts.

pub mod code;
pub mod email;
pub mod id;
pub mod phone;
pub mod quantity;
pub mod role;
