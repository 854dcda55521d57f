//! Token generation.
//!
//! Tokens are opaque identifiers with an absolute expiration. The generator
//! decides lifetimes; storage enforces them.

pub mod generator;

pub use generator::{DefaultTokenGenerator, TokenGenerator, TokenIdGenerator, generate_token_id};
