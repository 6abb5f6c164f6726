//! Core types for Milkround.
//!
//! This crate provides the type-safe domain values shared by the server and
//! CLI: entity IDs, validated identifiers (email, phone, milkman code), the
//! order quantity, and the account role tag.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::code::{CodeError, MilkmanCode};
pub use types::email::{Email, EmailError};
pub use types::id::*;
pub use types::phone::{Phone, PhoneError};
pub use types::quantity::{Quantity, QuantityError};
pub use types::role::Role;
