//! SurrealDB implementation of [`UserRepository`].
//!
//! User records mirror the external identity provider; the provider's
//! subject id is the record id, so provisioning events can be replayed
//! safely.

use chrono::{DateTime, Utc};
use stockbook_core::error::StockResult;
use stockbook_core::models::user::{CreateUser, User};
use stockbook_core::repository::UserRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;
use crate::retry::RetryPolicy;

#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, user_id: String) -> User {
        User {
            user_id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    retry: RetryPolicy,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            db,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy applied to storage operations.
    pub fn with_retry(db: Surreal<C>, retry: RetryPolicy) -> Self {
        Self { db, retry }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn upsert(&self, input: CreateUser) -> StockResult<User> {
        let row = self.retry.run(|| upsert_user(&self.db, &input)).await?;
        Ok(row.into_user(input.user_id))
    }

    async fn get(&self, user_id: &str) -> StockResult<User> {
        let row = self.retry.run(|| get_user(&self.db, user_id)).await?;
        Ok(row.into_user(user_id.to_string()))
    }
}

async fn upsert_user<C: Connection>(
    db: &Surreal<C>,
    input: &CreateUser,
) -> Result<UserRow, DbError> {
    let result = db
        .query(
            "UPSERT type::record('user', $id) SET \
             email = $email, \
             name = $name",
        )
        .bind(("id", input.user_id.clone()))
        .bind(("email", input.email.clone()))
        .bind(("name", input.name.clone()))
        .await?;

    let mut result = result.check()?;

    let rows: Vec<UserRow> = result.take(0)?;
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "user".into(),
        id: input.user_id.clone(),
    })
}

async fn get_user<C: Connection>(db: &Surreal<C>, user_id: &str) -> Result<UserRow, DbError> {
    let mut result = db
        .query("SELECT * FROM type::record('user', $id)")
        .bind(("id", user_id.to_string()))
        .await?;

    let rows: Vec<UserRow> = result.take(0)?;
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "user".into(),
        id: user_id.to_string(),
    })
}
