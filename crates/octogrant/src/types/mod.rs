//! Domain types handled by the grant engine.
//!
//! ## Domain Types
//!
//! - [`Client`] - registered application identity
//! - [`Owner`] - resource owner on whose behalf tokens are issued
//! - [`GrantType`] - grant types built into the engine
//! - [`Token`] - opaque token identifier with absolute expiration
//! - [`Scope`] - named permission unit
//! - [`Session`] - the result of a successful grant

pub mod client;
pub mod session;
pub mod token;

pub use client::{Client, GrantType, Owner};
pub use session::{Scope, Session};
pub use token::{NO_EXPIRATION, Token};
