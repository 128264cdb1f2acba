//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! catalog-cli user create -n "Ada" -e ada@example.com -p hunter22 --admin
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

use catalog_api::db::{PgStore, UserRepository};
use catalog_api::models::UserRecord;
use catalog_api::services::password::{PasswordError, hash_password};
use catalog_core::{Email, EmailError, UserId};
use thiserror::Error;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] catalog_api::db::RepositoryError),

    #[error("Invalid name: must not be empty")]
    EmptyName,

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Failed to hash password: {0}")]
    Password(#[from] PasswordError),
}

/// Validate the inputs and build the record to store.
fn user_record(
    name: &str,
    email: &str,
    password: &str,
    admin: bool,
) -> Result<UserRecord, UserError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UserError::EmptyName);
    }

    Ok(UserRecord {
        name: name.to_owned(),
        email: Email::parse(email)?,
        password_hash: hash_password(password)?,
        is_admin: admin,
    })
}

/// Create a new user.
///
/// Emails are not unique, so running this twice creates two users.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create(
    name: &str,
    email: &str,
    password: &str,
    admin: bool,
) -> Result<UserId, UserError> {
    let record = user_record(name, email, password, admin)?;
    let database_url = database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = catalog_api::db::create_pool(&database_url).await?;
    let store = PgStore::new(pool);

    let user = store.create_user(&record).await?;
    tracing::info!(
        "User created successfully! ID: {}, Email: {}, Admin: {}",
        user.id,
        user.email,
        user.is_admin
    );

    Ok(user.id)
}

#[cfg(test)]
mod tests {
    use catalog_api::services::password::verify_password;

    use super::*;

    #[test]
    fn test_user_record_hashes_password() {
        let record = user_record(" Ada ", "ada@example.com", "hunter22", true)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(record.name, "Ada");
        assert_eq!(record.email.as_str(), "ada@example.com");
        assert!(record.is_admin);
        assert!(verify_password("hunter22", &record.password_hash).is_ok());
    }

    #[test]
    fn test_user_record_rejects_bad_input() {
        assert!(matches!(
            user_record("  ", "ada@example.com", "x", false),
            Err(UserError::EmptyName)
        ));
        assert!(matches!(
            user_record("Ada", "nope", "x", false),
            Err(UserError::InvalidEmail(_))
        ));
    }
}
