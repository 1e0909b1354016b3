//! Users and Roles

use serde::{Deserialize, Serialize};

/// Role of the signed-in user
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Platform administrator; bypasses the subscription gate
    Admin,
    /// Tenant owner
    Owner,
    /// Tenant staff member
    Staff,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// The currently signed-in user, as reported by the backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}
