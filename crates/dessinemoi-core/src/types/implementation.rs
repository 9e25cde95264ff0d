//! Constructible implementations.
//!
//! An [`Implementation`] is what a [`Factory`](crate::Factory) stores under a
//! type identifier: the identity of a concrete type, the types it counts as a
//! subtype of, and a constructor producing the factory's product type.
//!
//! Implementations are usually described through the [`Constructible`] trait,
//! but any deserializable type or plain closure can be registered too.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use smallvec::SmallVec;

use super::arguments::Arguments;
use super::key::{Object, TypeKey, Upcast};
use crate::error::ConstructError;

/// Inline capacity for supertype lists; hierarchies are shallow.
pub type Supertypes = SmallVec<[TypeKey; 4]>;

/// A type that knows how to build itself from [`Arguments`].
///
/// # Examples
///
/// ```
/// use dessinemoi_core::{Arguments, ConstructError, Constructible, Supertypes, TypeKey};
///
/// struct Sheep {
///     age: u32,
///     name: String,
/// }
///
/// impl Constructible for Sheep {
///     const TYPE_ID: Option<&'static str> = Some("sheep");
///
///     fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
///         Ok(Self {
///             age: args.required("age")?,
///             name: args.required("name")?,
///         })
///     }
/// }
///
/// struct Ram(Sheep);
///
/// impl Constructible for Ram {
///     const TYPE_ID: Option<&'static str> = Some("ram");
///
///     fn supertypes() -> Supertypes {
///         Supertypes::from_slice(&[TypeKey::of::<Sheep>()])
///     }
///
///     fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
///         Ok(Self(Sheep {
///             age: args.required("age")?,
///             name: args.optional("name")?.unwrap_or_else(|| "Gorki".to_owned()),
///         }))
///     }
/// }
/// ```
pub trait Constructible: Sized + 'static {
    /// The identifier this type registers under when none is given.
    ///
    /// `None` falls back to the type's short name.
    const TYPE_ID: Option<&'static str> = None;

    /// Types this one counts as a subtype of, for `allowed` checks.
    fn supertypes() -> Supertypes {
        Supertypes::new()
    }

    /// Builds an instance, consuming the parameters it declares.
    fn construct(args: &mut Arguments) -> Result<Self, ConstructError>;
}

/// A registrable implementation producing instances of `P`.
///
/// Cloning is cheap: the constructor is shared.
pub struct Implementation<P: ?Sized = Object> {
    key: TypeKey,
    declared_id: Option<String>,
    supertypes: Supertypes,
    constructor: Arc<dyn Fn(Arguments) -> Result<Box<P>, ConstructError> + Send + Sync>,
}

impl<P: ?Sized + 'static> Implementation<P> {
    /// Describes a [`Constructible`] type.
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: Constructible + Upcast<P>,
    {
        let mut implementation = Self::from_fn(T::construct);
        implementation.declared_id = T::TYPE_ID.map(str::to_owned);
        implementation.supertypes = T::supertypes();
        implementation
    }

    /// Describes a type built by deserializing the keyword arguments.
    ///
    /// Positional arguments are rejected, and so are keywords the type does
    /// not read. Defaults come from the type's serde attributes.
    #[must_use]
    pub fn deserialized<T>() -> Self
    where
        T: DeserializeOwned + Upcast<P> + 'static,
    {
        Self::from_fn(|args: &mut Arguments| {
            if args.positional_len() > 0 {
                return Err(ConstructError::UnexpectedPositional {
                    count: args.positional_len(),
                });
            }
            let keyword = args.take_keywords();
            let mut unexpected = Vec::new();
            let instance: T = serde_ignored::deserialize(Value::Object(keyword), |path| {
                unexpected.push(path.to_string());
            })?;
            if !unexpected.is_empty() {
                unexpected.sort_unstable();
                return Err(ConstructError::UnexpectedKeyword(unexpected));
            }
            Ok(instance)
        })
    }

    /// Describes a type built by an arbitrary constructor.
    ///
    /// Arguments left unconsumed by `constructor` are reported as
    /// [`ConstructError::UnexpectedPositional`] or
    /// [`ConstructError::UnexpectedKeyword`].
    #[must_use]
    pub fn from_fn<T, F>(constructor: F) -> Self
    where
        T: Upcast<P> + 'static,
        F: Fn(&mut Arguments) -> Result<T, ConstructError> + Send + Sync + 'static,
    {
        Self {
            key: TypeKey::of::<T>(),
            declared_id: None,
            supertypes: Supertypes::new(),
            constructor: Arc::new(move |mut args: Arguments| {
                let instance = constructor(&mut args)?;
                args.finish()?;
                Ok(<T as Upcast<P>>::upcast(Box::new(instance)))
            }),
        }
    }

    /// Sets the identifier this implementation registers under by default.
    #[must_use]
    pub fn with_type_id(mut self, type_id: impl Into<String>) -> Self {
        self.declared_id = Some(type_id.into());
        self
    }

    /// Adds a type this implementation counts as a subtype of.
    #[must_use]
    pub fn with_supertype(mut self, supertype: TypeKey) -> Self {
        if !self.supertypes.contains(&supertype) {
            self.supertypes.push(supertype);
        }
        self
    }

}

impl<P: ?Sized> Implementation<P> {
    /// Returns the identity of the implementing type.
    #[inline]
    #[must_use]
    pub const fn type_key(&self) -> TypeKey {
        self.key
    }

    /// Returns the identifier the implementation declares, if any.
    #[inline]
    #[must_use]
    pub fn declared_type_id(&self) -> Option<&str> {
        self.declared_id.as_deref()
    }

    /// Returns the identifier used when registering without an explicit one.
    ///
    /// This is the declared identifier, or the type's short name.
    #[must_use]
    pub fn default_type_id(&self) -> &str {
        self.declared_id
            .as_deref()
            .unwrap_or_else(|| self.key.short_name())
    }

    /// Returns the declared supertypes.
    #[inline]
    #[must_use]
    pub fn supertypes(&self) -> &[TypeKey] {
        &self.supertypes
    }

    /// Returns `true` if the implementing type is `allowed` or declares it as
    /// a supertype.
    #[must_use]
    pub fn is_subtype_of(&self, allowed: &TypeKey) -> bool {
        self.key == *allowed || self.supertypes.contains(allowed)
    }

    /// Builds an instance from `args`.
    ///
    /// Errors raised by the constructor are returned as they are.
    pub fn construct(&self, args: Arguments) -> Result<Box<P>, ConstructError> {
        (self.constructor)(args)
    }
}

impl<P: ?Sized> Clone for Implementation<P> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            declared_id: self.declared_id.clone(),
            supertypes: self.supertypes.clone(),
            constructor: Arc::clone(&self.constructor),
        }
    }
}

/// Implementations are equal when they describe the same type.
impl<P: ?Sized> PartialEq for Implementation<P> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<P: ?Sized> Eq for Implementation<P> {}

impl<P: ?Sized> fmt::Debug for Implementation<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation")
            .field("key", &self.key)
            .field("declared_id", &self.declared_id)
            .field("supertypes", &self.supertypes)
            .finish_non_exhaustive()
    }
}
