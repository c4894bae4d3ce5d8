//! Recipient roles.
//!
//! The string forms must match the `recipients.role` check constraint in
//! `20260301000001_create_recipients.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STOREKEEPER: &str = "storekeeper";
pub const ROLE_LOADER: &str = "loader";

/// Role a recipient holds in the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Storekeeper,
    Loader,
}

impl Role {
    /// Every role, in the order the default audience lists them.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Storekeeper, Role::Loader];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Storekeeper => ROLE_STOREKEEPER,
            Role::Loader => ROLE_LOADER,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_STOREKEEPER => Ok(Role::Storekeeper),
            ROLE_LOADER => Ok(Role::Loader),
            other => Err(CoreError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}
