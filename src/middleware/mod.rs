//! Middleware and extractors for cross-cutting request concerns.
//!
//! - [`auth`]: required and optional authentication, plus the `AuthUser` /
//!   `OptionalAuthUser` extractors
//! - [`role`]: role-gated routes and the `RequireAdmin` / `RequireStaff`
//!   extractors
//! - [`rate_limit`]: per-client sliding-window limiting
//!
//! # Flow
//!
//! 1. The rate limiter admits or rejects the request by client IP
//! 2. An auth layer (or extractor) turns the `Authorization: Bearer <token>`
//!    header into an [`Identity`](civicwatch_auth::Identity)
//! 3. A role layer (or extractor) checks the identity against an allow-list
//! 4. The handler runs with the identity in hand
//!
//! A layer attaches what it resolved to the request extensions, so an
//! extractor further down reuses it instead of reading the user store again.
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//! use crate::middleware::role::RequireAdmin;
//!
//! async fn get_profile(AuthUser(identity): AuthUser) -> impl IntoResponse {
//!     Json(identity)
//! }
//!
//! async fn admin_only(RequireAdmin(identity): RequireAdmin) -> impl IntoResponse {
//!     // Only executes for admins
//! }
//! ```

pub mod auth;
pub mod rate_limit;
pub mod role;
