//! Token request abstraction.
//!
//! The transport layer turns whatever it received (form body, query string,
//! RPC message) into a [`GrantRequest`]. Grants read parameters through this
//! trait only.

use std::collections::HashMap;

/// Well-known request parameter names.
pub mod params {
    /// Client identifier.
    pub const CLIENT_ID: &str = "client_id";
    /// Client secret.
    pub const CLIENT_SECRET: &str = "client_secret";
    /// Resource owner username.
    pub const USERNAME: &str = "username";
    /// Resource owner password.
    pub const PASSWORD: &str = "password";
    /// Refresh token being exchanged.
    pub const REFRESH_TOKEN: &str = "refresh_token";
    /// Requested scope names, one value per scope.
    pub const SCOPES: &str = "scopes";
}

/// A read-only token request.
pub trait GrantRequest: Send + Sync {
    /// Returns the requested grant type name.
    fn grant(&self) -> &str;

    /// Returns every value for `key`, in order. Empty if absent.
    fn get(&self, key: &str) -> &[String];

    /// Returns the first value for `key`.
    fn get_first(&self, key: &str) -> Option<&str> {
        self.get(key).first().map(String::as_str)
    }
}

/// In-memory [`GrantRequest`].
///
/// ```
/// use octogrant::request::{BasicGrantRequest, GrantRequest, params};
///
/// let request = BasicGrantRequest::new("client_credentials")
///     .with(params::CLIENT_ID, "c1")
///     .with(params::CLIENT_SECRET, "secret")
///     .with_values(params::SCOPES, ["read", "write"]);
///
/// assert_eq!(request.get_first(params::CLIENT_ID), Some("c1"));
/// assert_eq!(request.get(params::SCOPES).len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasicGrantRequest {
    grant: String,
    values: HashMap<String, Vec<String>>,
}

impl BasicGrantRequest {
    /// Creates an empty request for the given grant type.
    #[must_use]
    pub fn new(grant: impl Into<String>) -> Self {
        Self {
            grant: grant.into(),
            values: HashMap::new(),
        }
    }

    /// Appends a value for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(key, value);
        self
    }

    /// Appends several values for `key`.
    #[must_use]
    pub fn with_values<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.add_all(key, values);
        self
    }

    /// Changes the grant type name.
    pub fn set_grant(&mut self, grant: impl Into<String>) {
        self.grant = grant.into();
    }

    /// Replaces all values for `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Replaces all values for `key`.
    pub fn set_all<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Appends a value for `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Appends several values for `key`.
    pub fn add_all<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.values
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Removes `key` and returns its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }
}

impl GrantRequest for BasicGrantRequest {
    fn grant(&self) -> &str {
        &self.grant
    }

    fn get(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
