//! Error types for the dessinemoi-core crate.
//!
//! This module provides three error types:
//!
//! - [`FactoryError`] for registration conflicts, lookups, type constraints
//!   and conversion input problems
//! - [`ConstructError`] for failures raised while an implementation builds
//!   an instance from its [`Arguments`](crate::Arguments)
//! - [`ConfigError`] for factory configuration loading and validation

use serde_json::Value;

use crate::types::TypeKey;

/// Broad classification of a [`FactoryError`].
///
/// Callers that only care about the category of a failure (a bad identifier
/// versus a type constraint violation, for instance) can match on this
/// instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller supplied a value the factory rejects: a conflicting
    /// registration or an unknown type identifier.
    Value,
    /// The resolved implementation does not satisfy the requested type
    /// constraint.
    Type,
    /// A conversion mapping does not carry the discriminator key.
    Lookup,
    /// The implementation's own constructor failed.
    Construction,
}

/// Errors returned by [`Factory`](crate::Factory) operations.
///
/// Every failure leaves the registry exactly as it was before the call.
///
/// # Examples
///
/// ```
/// use dessinemoi_core::{ErrorKind, FactoryError};
///
/// let error = FactoryError::unregistered("mouton");
/// assert_eq!(error.kind(), ErrorKind::Value);
/// assert_eq!(error.identifier(), Some("mouton"));
/// assert!(error.to_string().contains("mouton"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    /// The type identifier is already bound and overwriting was not allowed.
    #[error("type ID '{type_id}' is already registered to {existing}")]
    IdTaken {
        /// The identifier that was requested.
        type_id: String,
        /// The implementation currently bound to it.
        existing: TypeKey,
    },

    /// The implementation is already bound under another identifier and
    /// aliasing was not allowed.
    #[error("{implementation} is already registered as '{existing_id}', cannot alias it as '{type_id}'")]
    AlreadyRegistered {
        /// The identifier that was requested.
        type_id: String,
        /// The implementation being registered.
        implementation: TypeKey,
        /// An identifier the implementation is already bound to.
        existing_id: String,
    },

    /// No implementation is registered under the type identifier.
    #[error("unregistered type ID '{0}'")]
    Unregistered(String),

    /// The implementation registered under the identifier is not a subtype
    /// of the allowed type.
    #[error("type ID '{type_id}' resolves to {implementation}, which is not a subtype of {allowed}")]
    NotAllowed {
        /// The identifier that was looked up.
        type_id: String,
        /// The implementation it resolved to.
        implementation: TypeKey,
        /// The type the caller restricted construction to.
        allowed: TypeKey,
    },

    /// A conversion mapping has no entry under the discriminator key.
    #[error("conversion mapping has no '{key}' entry")]
    MissingDiscriminator {
        /// The discriminator key that was expected.
        key: String,
    },

    /// The discriminator entry of a conversion mapping is not a string.
    #[error("conversion mapping entry '{key}' must be a string type ID, found {found}")]
    InvalidDiscriminator {
        /// The discriminator key.
        key: String,
        /// The value found under the key.
        found: Value,
    },

    /// The implementation's constructor failed.
    #[error(transparent)]
    Construct(#[from] ConstructError),
}

impl FactoryError {
    /// Creates a new [`FactoryError::Unregistered`] error.
    #[inline]
    pub fn unregistered(type_id: impl Into<String>) -> Self {
        Self::Unregistered(type_id.into())
    }

    /// Creates a new [`FactoryError::MissingDiscriminator`] error.
    #[inline]
    pub fn missing_discriminator(key: impl Into<String>) -> Self {
        Self::MissingDiscriminator { key: key.into() }
    }

    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IdTaken { .. }
            | Self::AlreadyRegistered { .. }
            | Self::Unregistered(_)
            | Self::InvalidDiscriminator { .. } => ErrorKind::Value,
            Self::NotAllowed { .. } => ErrorKind::Type,
            Self::MissingDiscriminator { .. } => ErrorKind::Lookup,
            Self::Construct(_) => ErrorKind::Construction,
        }
    }

    /// Returns `true` if this error was raised by a rejected registration.
    #[inline]
    #[must_use]
    pub const fn is_registration_conflict(&self) -> bool {
        matches!(self, Self::IdTaken { .. } | Self::AlreadyRegistered { .. })
    }

    /// Returns the type identifier involved in this error, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::IdTaken { type_id, .. }
            | Self::AlreadyRegistered { type_id, .. }
            | Self::NotAllowed { type_id, .. }
            | Self::Unregistered(type_id) => Some(type_id),
            Self::MissingDiscriminator { .. }
            | Self::InvalidDiscriminator { .. }
            | Self::Construct(_) => None,
        }
    }
}

/// Errors raised while an implementation builds an instance.
///
/// Constructors written against [`Arguments`](crate::Arguments) get the
/// binding failures for free; anything else can be reported through
/// [`ConstructError::custom`].
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
    /// A required parameter was given neither positionally nor by keyword.
    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    /// A parameter was given both positionally and by keyword.
    #[error("got multiple values for argument '{0}'")]
    MultipleValues(String),

    /// More positional arguments were given than the constructor accepts.
    #[error("{count} unexpected positional argument(s)")]
    UnexpectedPositional {
        /// Number of positional arguments left over.
        count: usize,
    },

    /// Keyword arguments were given that the constructor does not accept.
    #[error("unexpected keyword argument(s): {}", .0.join(", "))]
    UnexpectedKeyword(Vec<String>),

    /// An argument could not be decoded into the parameter's type.
    #[error("invalid value for argument '{name}': {source}")]
    InvalidArgument {
        /// The parameter name.
        name: String,
        /// The underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// Keyword arguments could not be deserialized into the implementation.
    #[error("failed to deserialize instance: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// A constructor-specific failure.
    #[error("{0}")]
    Custom(String),

    /// An error raised by the constructor's own code, kept as the source.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ConstructError {
    /// Creates a new [`ConstructError::InvalidArgument`] error.
    #[inline]
    pub fn invalid_argument(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            source,
        }
    }

    /// Creates a new [`ConstructError::Custom`] error.
    #[inline]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }

    /// Wraps an arbitrary error raised by a constructor.
    ///
    /// The error stays reachable through [`std::error::Error::source`].
    #[inline]
    pub fn other(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(source.into())
    }

    /// Returns `true` if the failure comes from binding arguments to
    /// parameters rather than from the constructor's own logic.
    #[inline]
    #[must_use]
    pub const fn is_binding_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument(_)
                | Self::MultipleValues(_)
                | Self::UnexpectedPositional { .. }
                | Self::UnexpectedKeyword(_)
        )
    }
}

/// Errors that can occur during factory configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// An I/O error occurred while reading configuration.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
