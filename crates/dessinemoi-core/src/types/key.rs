//! Runtime type identity.
//!
//! [`TypeKey`] pairs a [`TypeId`] with the type's name so registrations can be
//! compared by identity and still be reported readably in errors and logs.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// The default product type of a [`Factory`](crate::Factory).
///
/// Instances produced through this type can be recovered with
/// [`Box::downcast`].
pub type Object = dyn Any + Send + Sync;

/// Runtime identity of a Rust type.
///
/// Equality and hashing only consider the [`TypeId`]; the name is carried
/// for display purposes.
///
/// # Examples
///
/// ```
/// use dessinemoi_core::TypeKey;
///
/// struct Sheep;
///
/// let key = TypeKey::of::<Sheep>();
/// assert_eq!(key, TypeKey::of::<Sheep>());
/// assert_ne!(key, TypeKey::of::<String>());
/// assert_eq!(key.short_name(), "Sheep");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    #[inline]
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the underlying [`TypeId`].
    #[inline]
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified type name.
    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the type name without its module path or generic arguments.
    ///
    /// This is the identifier an implementation registers under when it
    /// declares none of its own.
    ///
    /// ```
    /// use dessinemoi_core::TypeKey;
    ///
    /// assert_eq!(TypeKey::of::<Vec<String>>().short_name(), "Vec");
    /// assert_eq!(TypeKey::of::<u32>().short_name(), "u32");
    /// ```
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Conversion of a boxed concrete type into a factory's product type.
///
/// Every `Send + Sync + 'static` type already converts into [`Object`].
/// Factories producing a trait object implement it with [`upcast!`](crate::upcast).
pub trait Upcast<P: ?Sized> {
    /// Converts the boxed value into the product type.
    fn upcast(self: Box<Self>) -> Box<P>;
}

impl<T: Any + Send + Sync> Upcast<Object> for T {
    #[inline]
    fn upcast(self: Box<Self>) -> Box<Object> {
        self
    }
}

/// Implements [`Upcast`] from each listed type into a trait object.
///
/// ```
/// use dessinemoi_core::{upcast, Upcast};
///
/// trait Animal {
///     fn sound(&self) -> &'static str;
/// }
///
/// struct Sheep;
///
/// impl Animal for Sheep {
///     fn sound(&self) -> &'static str {
///         "baa"
///     }
/// }
///
/// upcast!(dyn Animal => Sheep);
///
/// let animal = <Sheep as Upcast<dyn Animal>>::upcast(Box::new(Sheep));
/// assert_eq!(animal.sound(), "baa");
/// ```
#[macro_export]
macro_rules! upcast {
    ($product:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Upcast<$product> for $ty {
                #[inline]
                fn upcast(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<$product> {
                    self
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sheep;

    mod pasture {
        pub struct Ram<T>(pub T);
    }

    #[test]
    fn test_type_key_identity() {
        assert_eq!(TypeKey::of::<Sheep>(), TypeKey::of::<Sheep>());
        assert_ne!(TypeKey::of::<Sheep>(), TypeKey::of::<pasture::Ram<u8>>());
        assert_ne!(
            TypeKey::of::<pasture::Ram<u8>>(),
            TypeKey::of::<pasture::Ram<u16>>()
        );
    }

    #[test]
    fn test_short_name_strips_path_and_generics() {
        assert_eq!(TypeKey::of::<Sheep>().short_name(), "Sheep");
        assert_eq!(TypeKey::of::<pasture::Ram<Sheep>>().short_name(), "Ram");
        assert!(TypeKey::of::<Sheep>().name().ends_with("::Sheep"));
    }

    #[test]
    fn test_hash_follows_type_id() {
        let mut set = rustc_hash::FxHashSet::default();
        set.insert(TypeKey::of::<Sheep>());
        set.insert(TypeKey::of::<Sheep>());
        set.insert(TypeKey::of::<String>());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_upcast_to_object() {
        let object = <Sheep as Upcast<Object>>::upcast(Box::new(Sheep));
        assert!(object.downcast::<Sheep>().is_ok());
    }
}
