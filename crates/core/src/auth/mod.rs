//! Authentication and password hashing.

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};

/// User roles in the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Utility staff: manages consumers, bills, and support info.
    Admin,
    /// A billed water consumer: read-only on their own account.
    Consumer,
}

impl UserRole {
    /// Parses a stored role string. Unknown text is treated as consumer.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        if s == "admin" { Self::Admin } else { Self::Consumer }
    }

    /// Returns the role as stored text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Consumer => "consumer",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(UserRole::parse("admin"), UserRole::Admin);
        assert_eq!(UserRole::parse("consumer"), UserRole::Consumer);
        assert_eq!(UserRole::parse("user"), UserRole::Consumer);
    }
}
