//! Process-wide default factory.
//!
//! Most programs only need one registry. This crate holds a lazily created
//! [`Factory`] behind a [`parking_lot::RwLock`] and exposes free functions
//! forwarding to it, so implementations can be registered and built without
//! passing a factory around:
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Debug, PartialEq, Deserialize)]
//! struct Shepherd {
//!     #[serde(default)]
//!     name: String,
//! }
//!
//! dessinemoi::register(
//!     dessinemoi::Implementation::deserialized::<Shepherd>().with_type_id("shepherd"),
//! )?;
//!
//! let built = dessinemoi::create("shepherd", dessinemoi::Arguments::new(), None)?;
//! assert_eq!(built.downcast_ref::<Shepherd>(), Some(&Shepherd { name: String::new() }));
//! # Ok::<(), dessinemoi::FactoryError>(())
//! ```
//!
//! The default factory is only a convenience: independent [`Factory`] values
//! can still be created and used side by side.
//!
//! # Locking
//!
//! Each function holds the lock for the duration of one call. Registration
//! takes the write lock; lookups, creation and conversion take a recursive
//! read lock, so a constructor may itself create instances through this
//! module. A constructor must not register anything.

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::sync::LazyLock;

use parking_lot::RwLock;

pub use dessinemoi_core::{
    Arguments, ConfigError, ConstructError, Constructible, Convertible,
    DEFAULT_DISCRIMINATOR_KEY, ErrorKind, Factory, FactoryConfig, FactoryError, Implementation,
    Map, Object, RegisterOptions, Registry, Supertypes, TypeKey, Upcast, Value, upcast,
};

static FACTORY: LazyLock<RwLock<Factory>> = LazyLock::new(|| {
    RwLock::new(
        Factory::with_config(FactoryConfig::default().with_name("default")).unwrap_or_default(),
    )
});

/// Returns the default factory.
///
/// Prefer the free functions of this crate; the lock is exposed for
/// operations they do not cover, such as inspecting the
/// [`Registry`].
#[inline]
pub fn factory() -> &'static RwLock<Factory> {
    &FACTORY
}

/// Registers an implementation in the default factory with the default
/// (strict) options.
///
/// See [`Factory::register`].
pub fn register(implementation: Implementation) -> Result<Implementation, FactoryError> {
    FACTORY.write().register(implementation)
}

/// Registers an implementation in the default factory.
///
/// See [`Factory::register_with`].
pub fn register_with(
    implementation: Implementation,
    options: &RegisterOptions,
) -> Result<Implementation, FactoryError> {
    FACTORY.write().register_with(implementation, options)
}

/// Returns a registering function bound to `options`.
///
/// The function takes the write lock on each call.
pub fn registrar(
    options: RegisterOptions,
) -> impl Fn(Implementation) -> Result<Implementation, FactoryError> + Send + Sync + 'static {
    move |implementation| FACTORY.write().register_with(implementation, &options)
}

/// Creates an instance from the default factory.
///
/// See [`Factory::create`].
pub fn create(
    type_id: &str,
    args: Arguments,
    allowed: Option<&TypeKey>,
) -> Result<Box<Object>, FactoryError> {
    FACTORY.read_recursive().create(type_id, args, allowed)
}

/// Converts a value with the default factory.
///
/// See [`Factory::convert`].
pub fn convert(
    value: impl Into<Convertible>,
    allowed: Option<&TypeKey>,
) -> Result<Box<Object>, FactoryError> {
    FACTORY.read_recursive().convert(value, allowed)
}

/// Returns a conversion function over the default factory with `allowed`
/// bound.
///
/// Implementations registered after the function was created are visible
/// to it.
pub fn converter(
    allowed: Option<TypeKey>,
) -> impl Fn(Convertible) -> Result<Box<Object>, FactoryError> + Send + Sync + 'static {
    move |value| FACTORY.read_recursive().convert(value, allowed.as_ref())
}

/// Returns `true` if `type_id` is bound in the default factory.
pub fn is_registered(type_id: &str) -> bool {
    FACTORY.read_recursive().registry().contains(type_id)
}

/// Returns the identifiers bound in the default factory, sorted.
pub fn registered_ids() -> Vec<String> {
    let factory = FACTORY.read_recursive();
    let mut ids: Vec<String> = factory.registry().ids().map(str::to_owned).collect();
    ids.sort_unstable();
    ids
}
