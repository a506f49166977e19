//! # CivicWatch Auth
//!
//! The authentication core every protected route passes through:
//!
//! - [`jwt`]: the token codec that issues and verifies signed, expiring bearer tokens
//! - [`identity`]: resolution of a verified subject to a live user record
//! - [`credentials`]: password credentials looked up by the login flow
//! - [`gate`]: the per-request state machine implementing the required,
//!   optional and role-gated policies
//!
//! # Flow
//!
//! ```text
//! Authorization header
//!     -> Credential (absent | malformed | bearer)
//!     -> TokenCodec::verify      (expired | invalid | claims)
//!     -> IdentityResolver::resolve (miss | identity)
//!     -> role check               (forbidden | authorized)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use civicwatch_auth::{AuthGate, IdentityResolver, TokenCodec};
//!
//! let gate = AuthGate::new(TokenCodec::new(&jwt_config), IdentityResolver::new(users));
//! let identity = gate.authenticate(headers.get("authorization")).await?;
//! ```

pub mod claims;
pub mod credentials;
pub mod gate;
pub mod identity;
pub mod jwt;

pub use claims::Claims;
pub use credentials::{CredentialStore, UserCredentials};
pub use gate::{AuthFailure, AuthGate, Credential, RejectionKind, check_any_role, check_role};
pub use identity::{Identity, IdentityResolver, LookupError, UserLookup, UserRole, Viewer};
pub use jwt::{IssuedToken, TokenCodec, TokenError};
