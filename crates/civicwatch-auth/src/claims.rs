//! Claims carried by a bearer token.

use serde::{Deserialize, Serialize};

/// JWT claims for access tokens.
///
/// The token identifies an account and nothing else: role and account status
/// are read from the user store on every request, so a ban or role change
/// takes effect without waiting for outstanding tokens to expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Issued-at timestamp (Unix seconds)
    pub iat: usize,
    /// Expiration timestamp (Unix seconds)
    pub exp: usize,
}
