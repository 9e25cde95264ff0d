//! Type registry and polymorphic object factory.
//!
//! This crate maps string type identifiers to constructible implementations
//! and builds instances from them:
//!
//! - Registration with an explicit alias and overwrite policy
//! - Construction by identifier with positional and keyword arguments
//! - An optional "must be a subtype of" constraint checked before construction
//! - Conversion of `{"type": ..., ...}` mappings into instances, leaving
//!   already-built instances untouched
//!
//! # Overview
//!
//! The main entry point is [`Factory`]. Implementations are described by
//! [`Implementation`] handles, built from a [`Constructible`] type, a serde
//! [`Deserialize`](serde::Deserialize) type, or a plain closure:
//!
//! ```
//! use dessinemoi_core::{
//!     Arguments, ConstructError, Constructible, Factory, FactoryError, Implementation,
//!     RegisterOptions, Supertypes, TypeKey,
//! };
//!
//! #[derive(Debug)]
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
//! #[derive(Debug)]
//! struct Ram(Sheep);
//!
//! impl Constructible for Ram {
//!     const TYPE_ID: Option<&'static str> = Some("ram");
//!
//!     fn supertypes() -> Supertypes {
//!         Supertypes::from_slice(&[TypeKey::of::<Sheep>()])
//!     }
//!
//!     fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
//!         Ok(Self(Sheep {
//!             age: args.required("age")?,
//!             name: args.optional("name")?.unwrap_or_else(|| "Gorki".to_owned()),
//!         }))
//!     }
//! }
//!
//! let mut factory: Factory = Factory::new();
//! factory.register(Implementation::of::<Sheep>())?;
//! factory.register(Implementation::of::<Ram>())?;
//!
//! let gorki = factory.create("ram", Arguments::new().arg(7), Some(&TypeKey::of::<Sheep>()))?;
//! assert_eq!(gorki.downcast_ref::<Ram>().map(|ram| ram.0.name.as_str()), Some("Gorki"));
//!
//! let err = factory
//!     .create("sheep", Arguments::new().arg(5).arg("Dolly"), Some(&TypeKey::of::<Ram>()))
//!     .unwrap_err();
//! assert!(matches!(err, FactoryError::NotAllowed { .. }));
//! # Ok::<(), FactoryError>(())
//! ```
//!
//! # Trait object products
//!
//! A factory can produce a trait object instead of [`Object`]; every
//! registered type must then implement [`Upcast`] into it, usually through the
//! [`upcast!`] macro.
//!
//! # Logging
//!
//! Registration, rejection, creation and conversion are reported through
//! `tracing` events. No subscriber is installed here.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod config;
mod convert;
mod error;
mod factory;
mod registry;
pub mod types;

pub use config::{DEFAULT_DISCRIMINATOR_KEY, FactoryConfig};
pub use convert::Convertible;
pub use error::{ConfigError, ConstructError, ErrorKind, FactoryError};
pub use factory::Factory;
pub use registry::Registry;
pub use types::{
    Arguments, Constructible, Implementation, Object, RegisterOptions, Supertypes, TypeKey,
    Upcast,
};

// Re-export the JSON types that appear in our public API
pub use serde_json::{Map, Value};
