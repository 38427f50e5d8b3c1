//! `stocktally-auth` — roles, permissions and the request capability object.
//!
//! This crate is intentionally decoupled from HTTP and storage. Login and
//! session handling live with the external identity provider; this crate only
//! validates the tokens it mints and decides what a bearer may do.

pub mod account;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod roles;

pub use account::{Account, NewAccount};
pub use authorize::{AuthzError, Capabilities};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtError, JwtValidator};
pub use permissions::Permission;
pub use roles::Role;
