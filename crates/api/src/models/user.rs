//! User domain types.

use serde::Serialize;
use utoipa::ToSchema;

use catalog_core::{Email, UserId};

/// A catalog user.
///
/// The password hash is kept on the domain type so it can be verified, but it
/// is never serialized into responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(skip)]
    pub password_hash: String,
    pub is_admin: bool,
}

/// Every mutable field of a user, with the password already hashed.
///
/// Used both for inserts and for wholesale replacement on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}
