//! Grant engine error types.
//!
//! [`OAuthError`] is the closed set of failures the [`Server`](crate::Server)
//! hands back to callers. [`StorageError`] is what storage backends report;
//! it travels inside `OAuthError` as the underlying cause.

use std::fmt;

/// Boxed error used at the grant boundary.
///
/// Grants may fail with any error type. The server classifies the failure:
/// an [`OAuthError`] passes through unchanged, anything else becomes
/// [`OAuthError::Unexpected`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the grant engine.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// A mandatory request field is absent or empty.
    #[error("{name} is required.")]
    RequiredValueMissing {
        /// Request field name, e.g. `client_id`.
        name: String,
    },

    /// A storage lookup did not produce the requested entity.
    #[error("Failed to find {entity}.")]
    StorageSearchFailed {
        /// Entity that was searched for: `client`, `owner` or `session`.
        entity: String,
        /// Storage failure.
        #[source]
        source: StorageError,
    },

    /// A scope is unknown, or not permitted for this session.
    #[error("The scope named {name} is invalid.")]
    InvalidScope {
        /// Scope name as it appeared in the request.
        name: String,
        /// Storage failure, when the scope could not be resolved.
        #[source]
        source: Option<StorageError>,
    },

    /// No grant is registered under the requested name.
    #[error("The grant named {name} was not found.")]
    GrantNotFound {
        /// Grant type name from the request.
        name: String,
    },

    /// A grant failed with an error outside this taxonomy.
    #[error("An unexpected error occurred.")]
    Unexpected {
        /// Original failure.
        #[source]
        source: BoxError,
    },
}

impl OAuthError {
    /// Creates a new `RequiredValueMissing` error.
    #[must_use]
    pub fn required_value_missing(name: impl Into<String>) -> Self {
        Self::RequiredValueMissing { name: name.into() }
    }

    /// Creates a new `StorageSearchFailed` error.
    #[must_use]
    pub fn storage_search_failed(entity: impl Into<String>, source: StorageError) -> Self {
        Self::StorageSearchFailed {
            entity: entity.into(),
            source,
        }
    }

    /// Creates a new `InvalidScope` error with no underlying cause.
    #[must_use]
    pub fn invalid_scope(name: impl Into<String>) -> Self {
        Self::InvalidScope {
            name: name.into(),
            source: None,
        }
    }

    /// Creates a new `InvalidScope` error caused by a failed scope lookup.
    #[must_use]
    pub fn invalid_scope_with_source(name: impl Into<String>, source: StorageError) -> Self {
        Self::InvalidScope {
            name: name.into(),
            source: Some(source),
        }
    }

    /// Creates a new `GrantNotFound` error.
    #[must_use]
    pub fn grant_not_found(name: impl Into<String>) -> Self {
        Self::GrantNotFound { name: name.into() }
    }

    /// Creates a new `Unexpected` error.
    #[must_use]
    pub fn unexpected(source: impl Into<BoxError>) -> Self {
        Self::Unexpected {
            source: source.into(),
        }
    }

    /// Classifies a failure returned by a grant.
    ///
    /// Errors that already are an `OAuthError` keep their classification.
    /// Everything else is wrapped as [`OAuthError::Unexpected`].
    #[must_use]
    pub fn from_grant_failure(err: BoxError) -> Self {
        match err.downcast::<OAuthError>() {
            Ok(classified) => *classified,
            Err(other) => Self::Unexpected { source: other },
        }
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequiredValueMissing { .. } => ErrorKind::RequiredValueMissing,
            Self::StorageSearchFailed { .. } => ErrorKind::StorageSearchFailed,
            Self::InvalidScope { .. } => ErrorKind::InvalidScope,
            Self::GrantNotFound { .. } => ErrorKind::GrantNotFound,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Returns the storage failure carried by this error, if any.
    #[must_use]
    pub fn storage_error(&self) -> Option<&StorageError> {
        match self {
            Self::StorageSearchFailed { source, .. } => Some(source),
            Self::InvalidScope { source, .. } => source.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if the request itself was at fault (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !self.is_server_error()
    }

    /// Returns `true` if the failure originated on the server (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        match self {
            Self::Unexpected { .. } => true,
            Self::StorageSearchFailed { source, .. } => source.is_backend(),
            _ => false,
        }
    }

    /// Returns the OAuth 2.0 error code (RFC 6749 section 5.2) for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::RequiredValueMissing { .. } => "invalid_request",
            Self::StorageSearchFailed { source, .. } if source.is_backend() => "server_error",
            Self::StorageSearchFailed { entity, .. } if entity == "client" => "invalid_client",
            Self::StorageSearchFailed { .. } => "invalid_grant",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::GrantNotFound { .. } => "unsupported_grant_type",
            Self::Unexpected { .. } => "server_error",
        }
    }
}

/// Kinds of [`OAuthError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A mandatory request field is absent.
    RequiredValueMissing,
    /// A storage lookup returned nothing.
    StorageSearchFailed,
    /// A scope is unknown or not permitted.
    InvalidScope,
    /// The grant type is not registered.
    GrantNotFound,
    /// Any failure outside the taxonomy.
    Unexpected,
}

impl ErrorKind {
    /// Returns the kind as a stable string identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequiredValueMissing => "required_value_missing",
            Self::StorageSearchFailed => "storage_search_failed",
            Self::InvalidScope => "invalid_scope",
            Self::GrantNotFound => "grant_not_found",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors reported by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No record matches the lookup key.
    #[error("{entity} not found")]
    NotFound {
        /// Entity type, e.g. `client`.
        entity: String,
    },

    /// The record exists but the supplied secret does not match.
    #[error("Invalid credentials for {entity}")]
    InvalidCredentials {
        /// Entity type, e.g. `owner`.
        entity: String,
    },

    /// The record exists but its token has expired.
    #[error("{entity} has expired")]
    Expired {
        /// Entity type, e.g. `session`.
        entity: String,
    },

    /// Re-resolving an entity produced a different identity.
    #[error("{entity} identity changed: expected {expected}, found {found}")]
    IdentityMismatch {
        /// Entity type.
        entity: String,
        /// Identifier held by the session.
        expected: String,
        /// Identifier returned by storage.
        found: String,
    },

    /// The backend itself failed.
    #[error("Storage backend error: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    /// Creates a new `InvalidCredentials` error.
    #[must_use]
    pub fn invalid_credentials(entity: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            entity: entity.into(),
        }
    }

    /// Creates a new `Expired` error.
    #[must_use]
    pub fn expired(entity: impl Into<String>) -> Self {
        Self::Expired {
            entity: entity.into(),
        }
    }

    /// Creates a new `IdentityMismatch` error.
    #[must_use]
    pub fn identity_mismatch(
        entity: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::IdentityMismatch {
            entity: entity.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Returns `true` if no matching record exists.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the backend failed, as opposed to a lookup miss.
    #[must_use]
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}
