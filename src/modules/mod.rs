pub mod admin;
pub mod auth;

pub use self::auth::model::LoginRequest;
