//! Conversion of mappings into instances.
//!
//! A mapping carrying a type identifier under the factory's discriminator key
//! is turned into an instance of the implementation registered under that
//! identifier; the remaining entries become keyword arguments. Values that
//! are already instances pass through untouched, so conversion can be applied
//! to a field whether or not it has been converted before.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::FactoryError;
use crate::factory::Factory;
use crate::types::{Arguments, Object, TypeKey};

/// Input accepted by [`Factory::convert`].
pub enum Convertible<P: ?Sized = Object> {
    /// A mapping describing an instance to build.
    Mapping(Map<String, Value>),
    /// An instance that is returned as-is.
    Object(Box<P>),
}

impl<P: ?Sized> From<Map<String, Value>> for Convertible<P> {
    fn from(mapping: Map<String, Value>) -> Self {
        Self::Mapping(mapping)
    }
}

/// Borrowed mappings are copied; the caller's mapping is never modified.
impl<P: ?Sized> From<&Map<String, Value>> for Convertible<P> {
    fn from(mapping: &Map<String, Value>) -> Self {
        Self::Mapping(mapping.clone())
    }
}

impl<P: ?Sized> From<Box<P>> for Convertible<P> {
    fn from(object: Box<P>) -> Self {
        Self::Object(object)
    }
}

impl<P: ?Sized> std::fmt::Debug for Convertible<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mapping(mapping) => f.debug_tuple("Mapping").field(mapping).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

impl<P: ?Sized + 'static> Factory<P> {
    /// Converts a mapping into an instance, or returns an instance unchanged.
    ///
    /// For a mapping, the entry under the configured discriminator key
    /// (`"type"` by default) selects the implementation and the other entries
    /// are passed to [`Factory::create`] as keyword arguments. An instance is
    /// returned without lookup or type check.
    ///
    /// # Examples
    ///
    /// ```
    /// use dessinemoi_core::{Factory, Implementation, Map};
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Debug, PartialEq, Deserialize)]
    /// struct Sheep {
    ///     wool: String,
    /// }
    ///
    /// let mut factory: Factory = Factory::new();
    /// factory.register(Implementation::deserialized::<Sheep>().with_type_id("sheep"))?;
    ///
    /// let mapping: Map<String, _> = json!({"type": "sheep", "wool": "a_lot"})
    ///     .as_object()
    ///     .cloned()
    ///     .unwrap_or_default();
    /// let sheep = factory.convert(&mapping, None)?;
    /// assert_eq!(sheep.downcast_ref::<Sheep>(), Some(&Sheep { wool: "a_lot".to_owned() }));
    ///
    /// // Already converted: returned as-is.
    /// let again = factory.convert(sheep, None)?;
    /// assert!(again.is::<Sheep>());
    /// # Ok::<(), dessinemoi_core::FactoryError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// - [`FactoryError::MissingDiscriminator`] if the mapping has no entry
    ///   under the discriminator key
    /// - [`FactoryError::InvalidDiscriminator`] if that entry is not a string
    /// - any error of [`Factory::create`]
    pub fn convert(
        &self,
        value: impl Into<Convertible<P>>,
        allowed: Option<&TypeKey>,
    ) -> Result<Box<P>, FactoryError> {
        let mut mapping = match value.into() {
            Convertible::Object(object) => return Ok(object),
            Convertible::Mapping(mapping) => mapping,
        };

        let key = self.config().discriminator_key.as_str();
        let type_id = match mapping.remove(key) {
            Some(Value::String(type_id)) => type_id,
            Some(found) => {
                return Err(FactoryError::InvalidDiscriminator {
                    key: key.to_owned(),
                    found,
                });
            }
            None => return Err(FactoryError::missing_discriminator(key)),
        };

        trace!(
            factory = self.config().label(),
            type_id = %type_id,
            fields = mapping.len(),
            "Converting mapping"
        );

        self.create(&type_id, Arguments::keywords(mapping), allowed)
    }

    /// Returns a conversion function with `allowed` bound.
    ///
    /// Useful as a field-level conversion hook:
    ///
    /// ```
    /// use dessinemoi_core::{Convertible, Factory, Implementation, Map, TypeKey};
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Lamb {}
    ///
    /// let mut factory: Factory = Factory::new();
    /// factory.register(Implementation::deserialized::<Lamb>().with_type_id("lamb"))?;
    ///
    /// let to_lamb = factory.converter(Some(TypeKey::of::<Lamb>()));
    /// let mut mapping = Map::new();
    /// mapping.insert("type".to_owned(), "lamb".into());
    /// assert!(to_lamb(Convertible::Mapping(mapping))?.is::<Lamb>());
    /// # Ok::<(), dessinemoi_core::FactoryError>(())
    /// ```
    pub fn converter(
        &self,
        allowed: Option<TypeKey>,
    ) -> impl Fn(Convertible<P>) -> Result<Box<P>, FactoryError> + '_ {
        move |value| self.convert(value, allowed.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::config::FactoryConfig;
    use crate::error::{ConstructError, ErrorKind};
    use crate::types::{Constructible, Implementation, RegisterOptions, Supertypes};

    #[derive(Debug, PartialEq, Deserialize)]
    struct Sheep {
        #[serde(default = "Sheep::default_wool")]
        wool: String,
    }

    impl Sheep {
        fn default_wool() -> String {
            "some".to_owned()
        }
    }

    #[derive(Debug, PartialEq)]
    struct Lamb {
        wool: String,
    }

    impl Constructible for Lamb {
        const TYPE_ID: Option<&'static str> = Some("lamb");

        fn supertypes() -> Supertypes {
            Supertypes::from_slice(&[TypeKey::of::<Sheep>()])
        }

        fn construct(args: &mut Arguments) -> Result<Self, ConstructError> {
            Ok(Self {
                wool: args.optional("wool")?.unwrap_or_else(|| "little".to_owned()),
            })
        }
    }

    fn mapping(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn flock() -> Factory {
        let mut factory: Factory = Factory::new();
        factory
            .register_with(
                Implementation::deserialized::<Sheep>(),
                &RegisterOptions::new().type_id("sheep"),
            )
            .unwrap();
        factory.register(Implementation::of::<Lamb>()).unwrap();
        factory
    }

    #[test]
    fn test_convert_mapping_matches_create() {
        let factory = flock();
        let converted = factory
            .convert(mapping(json!({"type": "sheep", "wool": "a_lot"})), None)
            .unwrap();
        let created = factory
            .create("sheep", Arguments::new().kwarg("wool", "a_lot"), None)
            .unwrap();

        assert_eq!(
            converted.downcast_ref::<Sheep>(),
            Some(&Sheep {
                wool: "a_lot".to_owned()
            })
        );
        assert_eq!(converted.downcast_ref::<Sheep>(), created.downcast_ref::<Sheep>());
    }

    #[test]
    fn test_convert_uses_defaults() {
        let factory = flock();
        let converted = factory.convert(mapping(json!({"type": "sheep"})), None).unwrap();
        assert_eq!(converted.downcast_ref::<Sheep>().unwrap().wool, "some");
    }

    #[test]
    fn test_convert_object_is_identity() {
        let factory = flock();
        let merino: Box<Object> = Box::new(Sheep {
            wool: "a_lot".to_owned(),
        });
        let address = std::ptr::from_ref::<Object>(&*merino).cast::<()>();

        let converted = factory.convert(merino, None).unwrap();
        assert_eq!(std::ptr::from_ref::<Object>(&*converted).cast::<()>(), address);

        // Passing the output through again changes nothing either.
        let again = factory.convert(converted, None).unwrap();
        assert_eq!(std::ptr::from_ref::<Object>(&*again).cast::<()>(), address);
    }

    #[test]
    fn test_convert_object_skips_constraint() {
        let factory = flock();
        let merino: Box<Object> = Box::new(Sheep {
            wool: "a_lot".to_owned(),
        });
        let converted = factory
            .convert(merino, Some(&TypeKey::of::<Lamb>()))
            .unwrap();
        assert!(converted.is::<Sheep>());
    }

    #[test]
    fn test_convert_borrowed_mapping_is_not_modified() {
        let factory = flock();
        let original = mapping(json!({"type": "lamb", "wool": "curly"}));
        let converted = factory.convert(&original, None).unwrap();
        assert_eq!(
            converted.downcast_ref::<Lamb>(),
            Some(&Lamb {
                wool: "curly".to_owned()
            })
        );
        assert_eq!(original.get("type"), Some(&json!("lamb")));
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_convert_allowed_type() {
        let factory = flock();
        let lamb_key = TypeKey::of::<Lamb>();

        let lamb = factory
            .convert(mapping(json!({"type": "lamb"})), Some(&lamb_key))
            .unwrap();
        assert_eq!(lamb.downcast_ref::<Lamb>().unwrap().wool, "little");

        let err = factory
            .convert(mapping(json!({"type": "sheep"})), Some(&lamb_key))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);

        // Lamb declares Sheep as a supertype.
        assert!(factory
            .convert(mapping(json!({"type": "lamb"})), Some(&TypeKey::of::<Sheep>()))
            .is_ok());
    }

    #[test]
    fn test_convert_discriminator_errors() {
        let factory = flock();

        let err = factory
            .convert(mapping(json!({"wool": "a_lot"})), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
        insta::assert_snapshot!(err.to_string(), @"conversion mapping has no 'type' entry");

        let err = factory.convert(mapping(json!({"type": 3})), None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        insta::assert_snapshot!(err.to_string(), @"conversion mapping entry 'type' must be a string type ID, found 3");

        let err = factory
            .convert(mapping(json!({"type": "mouton"})), None)
            .unwrap_err();
        assert!(matches!(err, FactoryError::Unregistered(ref id) if id == "mouton"));
    }

    #[test]
    fn test_convert_unknown_field_fails_construction() {
        let factory = flock();
        let err = factory
            .convert(mapping(json!({"type": "lamb", "horns": 2})), None)
            .unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Construct(ConstructError::UnexpectedKeyword(ref names)) if names == &["horns"]
        ));
    }

    #[test]
    fn test_convert_unknown_field_fails_deserialization() {
        let factory = flock();
        let err = factory
            .convert(mapping(json!({"type": "sheep", "horns": 2})), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Construction);
        insta::assert_snapshot!(err.to_string(), @"unexpected keyword argument(s): horns");
    }

    #[test]
    fn test_converter_matches_convert() {
        let factory = flock();
        let to_lamb = factory.converter(Some(TypeKey::of::<Lamb>()));

        let lamb = to_lamb(mapping(json!({"type": "lamb", "wool": "curly"})).into()).unwrap();
        let direct = factory
            .convert(
                mapping(json!({"type": "lamb", "wool": "curly"})),
                Some(&TypeKey::of::<Lamb>()),
            )
            .unwrap();
        assert_eq!(lamb.downcast_ref::<Lamb>(), direct.downcast_ref::<Lamb>());

        let err = to_lamb(mapping(json!({"type": "sheep"})).into()).unwrap_err();
        assert!(matches!(err, FactoryError::NotAllowed { .. }));
    }

    #[test]
    fn test_custom_discriminator_key() {
        let mut factory: Factory = Factory::with_config(FactoryConfig::default().with_discriminator_key("kind")).unwrap();
        factory.register(Implementation::of::<Lamb>()).unwrap();

        let lamb = factory
            .convert(mapping(json!({"kind": "lamb", "wool": "curly"})), None)
            .unwrap();
        assert_eq!(lamb.downcast_ref::<Lamb>().unwrap().wool, "curly");

        let err = factory.convert(mapping(json!({"type": "lamb"})), None).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"conversion mapping has no 'kind' entry");
    }

    #[test]
    fn test_convertible_debug() {
        let value: Convertible = mapping(json!({"type": "lamb"})).into();
        assert_eq!(format!("{value:?}"), r#"Mapping({"type": String("lamb")})"#);

        let value: Convertible = Convertible::Object(Box::new(Lamb {
            wool: "curly".to_owned(),
        }));
        assert_eq!(format!("{value:?}"), "Object(..)");
    }
}
