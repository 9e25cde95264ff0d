//! Registration options.

use serde::{Deserialize, Serialize};

/// Options controlling a single registration.
///
/// The defaults are the strict policy: the identifier comes from the
/// implementation, and neither aliasing nor overwriting is allowed. Each flag
/// only gates its own check.
///
/// # Examples
///
/// ```
/// use dessinemoi_core::RegisterOptions;
///
/// let options = RegisterOptions::new().type_id("agneau").allow_aliases(true);
/// assert_eq!(options.type_id.as_deref(), Some("agneau"));
/// assert!(options.allow_aliases);
/// assert!(!options.allow_id_overwrite);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterOptions {
    /// Explicit identifier. `None` uses the implementation's default.
    pub type_id: Option<String>,

    /// Allow binding an implementation that is already registered under
    /// another identifier.
    pub allow_aliases: bool,

    /// Allow replacing the implementation bound to an existing identifier.
    pub allow_id_overwrite: bool,
}

impl RegisterOptions {
    /// Creates the default (strict) options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit identifier.
    #[must_use]
    pub fn type_id(mut self, type_id: impl Into<String>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    /// Sets whether aliasing is allowed.
    #[must_use]
    pub const fn allow_aliases(mut self, allow: bool) -> Self {
        self.allow_aliases = allow;
        self
    }

    /// Sets whether overwriting an identifier is allowed.
    #[must_use]
    pub const fn allow_id_overwrite(mut self, allow: bool) -> Self {
        self.allow_id_overwrite = allow;
        self
    }
}
