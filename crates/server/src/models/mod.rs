//! Data models for Milkround entities.

pub mod account;
pub mod order;
pub mod session;

pub use account::{Admin, Customer, Milkman};
pub use order::{DaySlot, DayStatus, EffectiveOrder, Order};
pub use session::{CurrentUser, keys as session_keys};
