//! # CivicWatch Core
//!
//! Foundational types shared by every CivicWatch crate:
//!
//! - [`errors`]: the HTTP-facing [`AppError`] with its stable machine-readable code
//! - [`password`]: bcrypt hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_core::{AppError, codes};
//!
//! let error = AppError::unauthorized(codes::NO_TOKEN, "No token provided");
//! ```

pub mod errors;
pub mod password;

pub use errors::{AppError, codes};
pub use password::{hash_password, verify_login_password, verify_password};
