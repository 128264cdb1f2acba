//! Business logic services for the catalog.
//!
//! # Services
//!
//! - `password` - Argon2 password hashing and verification
//! - `uploads` - Validation and storage of uploaded product images
//! - `orders` - Order placement (items, total, order) and removal

pub mod orders;
pub mod password;
pub mod uploads;
