//! Authentication
//!
//! Session lifecycle: password hashing, dual-token issuance, refresh
//! rotation, and cookie-based delivery.

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod service;
pub mod store;
pub mod tokens;

pub use extractors::AuthUser;
pub use service::AuthService;
pub use store::{CredentialStore, PgCredentialStore};
pub use tokens::TokenIssuer;
