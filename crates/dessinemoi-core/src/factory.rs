//! The [`Factory`]: registration and construction by type identifier.
//!
//! # Usage
//!
//! ```
//! use dessinemoi_core::{Arguments, ConstructError, Constructible, Factory, Implementation};
//!
//! #[derive(Debug, PartialEq)]
//! struct Sheep {
//!     age: u32,
//!     name: String,
//! }
//!
//! impl Constructible for Sheep {
//!     const TYPE_ID: Option<&'static str> = Some("sheep");
//!
//!     fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
//!         Ok(Self {
//!             age: args.required("age")?,
//!             name: args.required("name")?,
//!         })
//!     }
//! }
//!
//! let mut factory: Factory = Factory::new();
//! factory.register(Implementation::of::<Sheep>())?;
//!
//! let dolly = factory.create("sheep", Arguments::new().arg(5).arg("Dolly"), None)?;
//! assert_eq!(
//!     dolly.downcast_ref::<Sheep>(),
//!     Some(&Sheep { age: 5, name: "Dolly".to_owned() })
//! );
//! # Ok::<(), dessinemoi_core::FactoryError>(())
//! ```

use tracing::{debug, trace};

use crate::config::FactoryConfig;
use crate::error::{ConfigError, FactoryError};
use crate::registry::Registry;
use crate::types::{Arguments, Implementation, Object, RegisterOptions, TypeKey};

/// A type registry and polymorphic object factory.
///
/// `P` is the product type every registered implementation builds; it
/// defaults to [`Object`], so any `Send + Sync` type can be registered and
/// instances are recovered with [`Box::downcast`]. A factory for a trait
/// object (`Factory<dyn Animal>`) only accepts implementations that
/// [`Upcast`](crate::Upcast) into it.
///
/// Factories are independent of one another. Registration needs `&mut self`;
/// share a factory across threads behind a lock.
pub struct Factory<P: ?Sized = Object> {
    registry: Registry<P>,
    config: FactoryConfig,
}

impl<P: ?Sized + 'static> Factory<P> {
    /// Creates an empty factory with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            config: FactoryConfig::default(),
        }
    }

    /// Creates an empty factory with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] if the configuration does not
    /// pass [`FactoryConfig::validate`].
    pub fn with_config(config: FactoryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            registry: Registry::new(),
            config,
        })
    }

    /// Returns the factory configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Returns a read-only view of the registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &Registry<P> {
        &self.registry
    }

    /// Registers an implementation with the default (strict) options.
    ///
    /// Returns the implementation unchanged so registrations chain.
    ///
    /// # Errors
    ///
    /// See [`Factory::register_with`].
    pub fn register(
        &mut self,
        implementation: Implementation<P>,
    ) -> Result<Implementation<P>, FactoryError> {
        self.register_with(implementation, &RegisterOptions::default())
    }

    /// Registers an implementation.
    ///
    /// The identifier is `options.type_id`, else the implementation's
    /// declared identifier, else its short type name. Returns the
    /// implementation unchanged so registrations chain:
    ///
    /// ```
    /// use dessinemoi_core::{Arguments, ConstructError, Constructible, Factory, Implementation, RegisterOptions};
    ///
    /// struct Lamb;
    ///
    /// impl Constructible for Lamb {
    ///     const TYPE_ID: Option<&'static str> = Some("lamb");
    ///
    ///     fn construct(_args: &mut Arguments) -> Result<Self, ConstructError> {
    ///         Ok(Self)
    ///     }
    /// }
    ///
    /// let mut factory: Factory = Factory::new();
    /// let lamb = factory.register(Implementation::of::<Lamb>())?;
    /// let lamb = factory.register_with(lamb, &RegisterOptions::new().type_id("agneau").allow_aliases(true))?;
    ///
    /// assert_eq!(factory.registry().get("lamb"), Some(&lamb));
    /// assert_eq!(factory.registry().get("agneau"), Some(&lamb));
    /// # Ok::<(), dessinemoi_core::FactoryError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - [`FactoryError::AlreadyRegistered`] if the implementation is bound
    ///   under another identifier and `allow_aliases` is off
    /// - [`FactoryError::IdTaken`] if the identifier is bound and
    ///   `allow_id_overwrite` is off
    ///
    /// The registry is unchanged on error.
    pub fn register_with(
        &mut self,
        implementation: Implementation<P>,
        options: &RegisterOptions,
    ) -> Result<Implementation<P>, FactoryError> {
        let key = implementation.type_key();
        let registration = match self.registry.insert(implementation.clone(), options) {
            Ok(registration) => registration,
            Err(err) => {
                debug!(
                    factory = self.config.label(),
                    implementation = %key,
                    error = %err,
                    "Registration rejected"
                );
                return Err(err);
            }
        };

        debug!(
            factory = self.config.label(),
            type_id = %registration.type_id,
            implementation = %key,
            aliased = registration.aliased,
            replaced = registration.replaced.map(|previous| previous.name()),
            "Registered implementation"
        );

        Ok(implementation)
    }

    /// Returns a reusable registering function bound to `options`.
    ///
    /// Each call behaves exactly like [`Factory::register_with`] with the
    /// captured options.
    pub fn registrar(
        &mut self,
        options: RegisterOptions,
    ) -> impl FnMut(Implementation<P>) -> Result<Implementation<P>, FactoryError> + '_ {
        move |implementation| self.register_with(implementation, &options)
    }

    /// Looks up `type_id` and checks it against `allowed`, without
    /// constructing anything.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::Unregistered`] if `type_id` is not bound
    /// - [`FactoryError::NotAllowed`] if the implementation is not a subtype
    ///   of `allowed`
    pub fn resolve(
        &self,
        type_id: &str,
        allowed: Option<&TypeKey>,
    ) -> Result<&Implementation<P>, FactoryError> {
        let implementation = self
            .registry
            .get(type_id)
            .ok_or_else(|| FactoryError::unregistered(type_id))?;

        if let Some(allowed) = allowed {
            if !implementation.is_subtype_of(allowed) {
                return Err(FactoryError::NotAllowed {
                    type_id: type_id.to_owned(),
                    implementation: implementation.type_key(),
                    allowed: *allowed,
                });
            }
        }

        Ok(implementation)
    }

    /// Creates a new instance of the implementation bound to `type_id`.
    ///
    /// The type constraint is checked before the constructor runs, so a
    /// disallowed implementation is never invoked.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::Unregistered`] if `type_id` is not bound
    /// - [`FactoryError::NotAllowed`] if the implementation is not a subtype
    ///   of `allowed`
    /// - [`FactoryError::Construct`] carrying the constructor's own error
    pub fn create(
        &self,
        type_id: &str,
        args: Arguments,
        allowed: Option<&TypeKey>,
    ) -> Result<Box<P>, FactoryError> {
        let implementation = self.resolve(type_id, allowed).inspect_err(|err| {
            debug!(factory = self.config.label(), type_id, error = %err, "Creation rejected");
        })?;

        trace!(
            factory = self.config.label(),
            type_id,
            implementation = %implementation.type_key(),
            positional = args.positional_len(),
            keyword = args.keyword().len(),
            "Creating instance"
        );

        Ok(implementation.construct(args)?)
    }
}

impl<P: ?Sized + 'static> Default for Factory<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static> std::fmt::Debug for Factory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish()
    }
}
