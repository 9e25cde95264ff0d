//! Domain types for the factory.
//!
//! # Module Organization
//!
//! - [`key`] - Runtime type identity and product upcasting
//! - [`arguments`] - Positional and keyword construction arguments
//! - [`implementation`] - Constructible implementations
//! - [`options`] - Registration options
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use dessinemoi_core::{Arguments, Implementation, RegisterOptions, TypeKey};
//! ```

pub mod arguments;
pub mod implementation;
pub mod key;
pub mod options;

pub use arguments::Arguments;
pub use implementation::{Constructible, Implementation, Supertypes};
pub use key::{Object, TypeKey, Upcast};
pub use options::RegisterOptions;
