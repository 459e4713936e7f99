//! User roles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role carried in access tokens and stored on user records.
///
/// Persisted as a small integer (`0` standard, `1` admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular marketplace customer.
    #[default]
    Standard,
    /// Catalogue administrator: may create, update and delete brands and cars.
    Admin,
}

impl Role {
    /// Database code for this role.
    pub fn code(self) -> i16 {
        match self {
            Self::Standard => 0,
            Self::Admin => 1,
        }
    }

    /// Decode a database role code. Unknown codes are treated as standard.
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => Self::Admin,
            _ => Self::Standard,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
