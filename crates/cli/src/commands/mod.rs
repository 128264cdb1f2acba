//! CLI subcommands.

pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Read the database URL the same way the server does.
pub(crate) fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("CATALOG_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

/// Neither `CATALOG_DATABASE_URL` nor `DATABASE_URL` is set.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: CATALOG_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;
