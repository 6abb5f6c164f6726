//! Account role tag.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of account roles.
///
/// Each authenticated session carries exactly one role; dispatch on it is an
/// exhaustive match, never a string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Farm administrator, identified by email.
    Admin,
    /// Delivery person, identified by phone.
    Milkman,
    /// Customer, identified by phone.
    Customer,
}

impl Role {
    /// URL path segment for this role's pages (`/admin`, `/milkman`,
    /// `/customer`).
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Milkman => "milkman",
            Self::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_uses_snake_case_tags() {
        let json = serde_json::to_string(&Role::Milkman).expect("serialize");
        assert_eq!(json, "\"milkman\"");
        let role: Role = serde_json::from_str("\"customer\"").expect("deserialize");
        assert_eq!(role, Role::Customer);
    }

    #[test]
    fn test_path_segments() {
        assert_eq!(Role::Admin.path_segment(), "admin");
        assert_eq!(Role::Milkman.to_string(), "milkman");
    }
}
