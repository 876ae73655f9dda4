//! Authentication Module
//! Mission: Secure API access with sealed access tokens and RBAC

pub mod api;
pub mod codec;
pub mod maker;
pub mod middleware;
pub mod models;
pub mod password;

pub use codec::{TokenCodec, TokenError};
pub use maker::TokenMaker;
pub use middleware::{authenticate, require_admin, AuthError, AuthPayload};
pub use models::{Payload, UserRole};
