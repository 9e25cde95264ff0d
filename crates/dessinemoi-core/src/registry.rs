//! Registry storage and registration policy.
//!
//! A [`Registry`] maps type identifiers to [`Implementation`]s. It is owned by
//! a [`Factory`](crate::Factory), which exposes it read-only; entries are only
//! added through the factory's registration calls and never removed.
//!
//! # Policy
//!
//! Registration resolves the identifier (explicit option, else the
//! implementation's declared identifier, else its short type name) and then
//! runs two independent checks:
//!
//! 1. **Aliasing** - gated by `allow_aliases`: the implementation must not
//!    already be bound under a different identifier.
//! 2. **Overwriting** - gated by `allow_id_overwrite`: the identifier must not
//!    already be bound.
//!
//! A rejected registration leaves the registry untouched.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::FactoryError;
use crate::types::{Implementation, Object, RegisterOptions, TypeKey};

/// Outcome of an accepted registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Registration {
    /// The identifier the implementation was bound to.
    pub(crate) type_id: String,

    /// The implementation previously bound to the identifier, if any.
    pub(crate) replaced: Option<TypeKey>,

    /// Whether the implementation was already bound elsewhere.
    pub(crate) aliased: bool,
}

/// Mapping from type identifier to implementation.
///
/// Every identifier maps to exactly one implementation; an implementation
/// may be reachable through several identifiers (aliases).
pub struct Registry<P: ?Sized = Object> {
    entries: FxHashMap<String, Implementation<P>>,
}

impl<P: ?Sized + 'static> Registry<P> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Returns the implementation bound to `type_id`.
    #[inline]
    #[must_use]
    pub fn get(&self, type_id: &str) -> Option<&Implementation<P>> {
        self.entries.get(type_id)
    }

    /// Returns `true` if `type_id` is bound.
    #[inline]
    #[must_use]
    pub fn contains(&self, type_id: &str) -> bool {
        self.entries.contains_key(type_id)
    }

    /// Returns the number of bound identifiers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the bound identifiers, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(identifier, implementation)` pairs, in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Implementation<P>)> {
        self.entries
            .iter()
            .map(|(type_id, implementation)| (type_id.as_str(), implementation))
    }

    /// Returns every identifier bound to the type `key`, sorted.
    #[must_use]
    pub fn ids_of(&self, key: &TypeKey) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .iter()
            .filter(|(_, implementation)| implementation.type_key() == *key)
            .map(|(type_id, _)| type_id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Applies the registration policy and binds the implementation.
    pub(crate) fn insert(
        &mut self,
        implementation: Implementation<P>,
        options: &RegisterOptions,
    ) -> Result<Registration, FactoryError> {
        let type_id = options
            .type_id
            .clone()
            .unwrap_or_else(|| implementation.default_type_id().to_owned());
        let key = implementation.type_key();
        let other_id = self
            .entries
            .iter()
            .find(|(id, bound)| bound.type_key() == key && **id != type_id)
            .map(|(id, _)| id.clone());
        let aliased = other_id.is_some();

        if !options.allow_aliases {
            if let Some(existing_id) = other_id {
                return Err(FactoryError::AlreadyRegistered {
                    type_id,
                    implementation: key,
                    existing_id,
                });
            }
        }

        if !options.allow_id_overwrite {
            if let Some(existing) = self.entries.get(&type_id) {
                return Err(FactoryError::IdTaken {
                    existing: existing.type_key(),
                    type_id,
                });
            }
        }

        let replaced = self
            .entries
            .insert(type_id.clone(), implementation)
            .map(|previous| previous.type_key());

        Ok(Registration {
            type_id,
            replaced,
            aliased,
        })
    }
}

impl<P: ?Sized + 'static> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> Clone for Registry<P> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<P: ?Sized + 'static> fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(type_id, implementation)| (type_id, implementation.type_key())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstructError;
    use crate::types::{Arguments, Constructible};

    struct Sheep;

    impl Constructible for Sheep {
        const TYPE_ID: Option<&'static str> = Some("sheep");

        fn construct(_args: &mut Arguments) -> Result<Self, ConstructError> {
            Ok(Self)
        }
    }

    struct Goat;

    impl Constructible for Goat {
        fn construct(_args: &mut Arguments) -> Result<Self, ConstructError> {
            Ok(Self)
        }
    }

    fn sheep() -> Implementation {
        Implementation::of::<Sheep>()
    }

    fn goat() -> Implementation {
        Implementation::of::<Goat>()
    }

    fn strict() -> RegisterOptions {
        RegisterOptions::new()
    }

    #[test]
    fn test_insert_uses_declared_then_short_name() {
        let mut registry = Registry::new();
        let sheep_reg = registry.insert(sheep(), &strict()).unwrap();
        assert_eq!(sheep_reg.type_id, "sheep");
        let goat_reg = registry.insert(goat(), &strict()).unwrap();
        assert_eq!(goat_reg.type_id, "Goat");
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("sheep"));
        assert!(registry.contains("Goat"));
    }

    #[test]
    fn test_alias_rejected_without_permission() {
        let mut registry = Registry::new();
        registry.insert(sheep(), &strict()).unwrap();

        let err = registry
            .insert(sheep(), &strict().type_id("mouton"))
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::AlreadyRegistered { ref existing_id, .. } if existing_id == "sheep"
        ));
        assert!(!registry.contains("mouton"));

        let reg = registry
            .insert(sheep(), &strict().type_id("mouton").allow_aliases(true))
            .unwrap();
        assert!(reg.aliased);
        assert_eq!(registry.ids_of(&TypeKey::of::<Sheep>()), vec!["mouton", "sheep"]);
    }

    #[test]
    fn test_overwrite_rejected_without_permission() {
        let mut registry = Registry::new();
        registry.insert(sheep(), &strict()).unwrap();

        let err = registry
            .insert(goat(), &strict().type_id("sheep"))
            .unwrap_err();
        assert!(matches!(err, FactoryError::IdTaken { ref existing, .. } if *existing == TypeKey::of::<Sheep>()));
        assert_eq!(registry.get("sheep").unwrap().type_key(), TypeKey::of::<Sheep>());

        let reg = registry
            .insert(goat(), &strict().type_id("sheep").allow_id_overwrite(true))
            .unwrap();
        assert_eq!(reg.replaced, Some(TypeKey::of::<Sheep>()));
        assert_eq!(registry.get("sheep").unwrap().type_key(), TypeKey::of::<Goat>());
    }

    #[test]
    fn test_same_id_again_is_an_overwrite_not_an_alias() {
        let mut registry = Registry::new();
        registry.insert(sheep(), &strict()).unwrap();

        let err = registry
            .insert(sheep(), &strict().allow_aliases(true))
            .unwrap_err();
        assert!(matches!(err, FactoryError::IdTaken { .. }));

        let reg = registry
            .insert(sheep(), &strict().allow_id_overwrite(true))
            .unwrap();
        assert!(!reg.aliased);
        assert_eq!(reg.replaced, Some(TypeKey::of::<Sheep>()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_checks_are_independent() {
        // "sheep" -> Sheep, "Goat" -> Goat; then bind Goat to "sheep".
        // That is both an alias (Goat already has "Goat") and an overwrite.
        let setup = || {
            let mut registry = Registry::new();
            registry.insert(sheep(), &strict()).unwrap();
            registry.insert(goat(), &strict()).unwrap();
            registry
        };
        let target = || strict().type_id("sheep");

        let mut registry = setup();
        let err = registry.insert(goat(), &target()).unwrap_err();
        assert!(matches!(err, FactoryError::AlreadyRegistered { .. }));

        let mut registry = setup();
        let err = registry
            .insert(goat(), &target().allow_aliases(true))
            .unwrap_err();
        assert!(matches!(err, FactoryError::IdTaken { .. }));

        let mut registry = setup();
        let err = registry
            .insert(goat(), &target().allow_id_overwrite(true))
            .unwrap_err();
        assert!(matches!(err, FactoryError::AlreadyRegistered { .. }));

        let mut registry = setup();
        let reg = registry
            .insert(
                goat(),
                &target().allow_aliases(true).allow_id_overwrite(true),
            )
            .unwrap();
        assert!(reg.aliased);
        assert_eq!(reg.replaced, Some(TypeKey::of::<Sheep>()));
        assert_eq!(registry.ids_of(&TypeKey::of::<Goat>()), vec!["Goat", "sheep"]);
        assert!(registry.ids_of(&TypeKey::of::<Sheep>()).is_empty());
    }

    #[test]
    fn test_debug_lists_entries() {
        let mut registry = Registry::new();
        registry.insert(sheep(), &strict()).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("\"sheep\""));
        assert!(debug.contains("Sheep"));
    }

    #[test]
    fn test_alias_lookup_among_many_entries() {
        let mut registry = Registry::new();
        registry.insert(goat(), &strict()).unwrap();
        for i in 0..1_000 {
            let reg = registry
                .insert(sheep(), &strict().type_id(format!("sheep_{i}")).allow_aliases(true))
                .unwrap();
            assert_eq!(reg.aliased, i > 0);
        }
        assert_eq!(registry.len(), 1_001);

        let err = registry
            .insert(goat(), &strict().type_id("chevre"))
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::AlreadyRegistered { ref existing_id, .. } if existing_id == "Goat"
        ));
    }
}
