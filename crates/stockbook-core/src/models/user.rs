//! User domain model.
//!
//! Users are provisioned from the external identity provider; stockbook
//! never authenticates them itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Subject identifier assigned by the identity provider.
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
}
