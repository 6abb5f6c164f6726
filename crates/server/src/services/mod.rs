//! Domain services.
//!
//! Each service wraps the repositories it needs and owns one slice of the
//! domain: authentication, the milkman directory, order/preference
//! resolution, and the calendar projection.

pub mod auth;
pub mod calendar;
pub mod directory;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use calendar::{CalendarError, CalendarService};
pub use directory::{DirectoryError, DirectoryService, ManifestLine};
pub use orders::{OrderError, OrderService};
