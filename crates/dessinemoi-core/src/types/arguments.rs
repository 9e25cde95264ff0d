//! Construction arguments.
//!
//! [`Arguments`] carries the positional and keyword values a factory hands to
//! an implementation's constructor. Values are JSON values so the same
//! structure serves direct calls and mapping-based conversion.
//!
//! # Binding
//!
//! Constructors request their parameters by name, in declaration order. Each
//! request consumes the next positional value if one is left, otherwise the
//! keyword of that name:
//!
//! ```
//! use dessinemoi_core::Arguments;
//!
//! let mut args = Arguments::new().arg(7).kwarg("name", "Romuald");
//! let age: u32 = args.required("age")?;
//! let name: String = args.optional("name")?.unwrap_or_else(|| "Gorki".to_owned());
//! args.finish()?;
//!
//! assert_eq!(age, 7);
//! assert_eq!(name, "Romuald");
//! # Ok::<(), dessinemoi_core::ConstructError>(())
//! ```

use std::collections::VecDeque;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ConstructError;

/// Positional and keyword construction arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    /// Positional values, consumed front to back.
    positional: VecDeque<Value>,

    /// Keyword values by parameter name.
    keyword: Map<String, Value>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates arguments from positional values only.
    #[must_use]
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: Map::new(),
        }
    }

    /// Creates arguments from keyword values only.
    #[must_use]
    pub fn keywords(keyword: Map<String, Value>) -> Self {
        Self {
            positional: VecDeque::new(),
            keyword,
        }
    }

    /// Appends a positional value.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push_back(value.into());
        self
    }

    /// Sets a keyword value, replacing any previous value for `name`.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.insert(name.into(), value.into());
        self
    }

    /// Merges a keyword map into the arguments.
    #[must_use]
    pub fn with_kwargs(mut self, keyword: Map<String, Value>) -> Self {
        self.keyword.extend(keyword);
        self
    }

    /// Returns the number of positional values not yet consumed.
    #[inline]
    #[must_use]
    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    /// Returns the keyword values not yet consumed.
    #[inline]
    #[must_use]
    pub fn keyword(&self) -> &Map<String, Value> {
        &self.keyword
    }

    /// Returns `true` if no arguments are left.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keyword.is_empty()
    }

    /// Binds and decodes a required parameter.
    ///
    /// # Errors
    ///
    /// - [`ConstructError::MissingArgument`] if no value is left for `name`
    /// - [`ConstructError::MultipleValues`] if `name` is given both ways
    /// - [`ConstructError::InvalidArgument`] if the value does not decode as `T`
    pub fn required<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, ConstructError> {
        self.optional(name)?
            .ok_or_else(|| ConstructError::MissingArgument(name.to_owned()))
    }

    /// Binds and decodes an optional parameter.
    ///
    /// Returns `Ok(None)` when the parameter was not supplied, leaving the
    /// default to the constructor.
    pub fn optional<T: DeserializeOwned>(
        &mut self,
        name: &str,
    ) -> Result<Option<T>, ConstructError> {
        let Some(value) = self.bind(name)? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|source| ConstructError::invalid_argument(name, source))
    }

    /// Removes and returns every keyword value.
    pub fn take_keywords(&mut self) -> Map<String, Value> {
        std::mem::take(&mut self.keyword)
    }

    /// Checks that every argument was consumed.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructError::UnexpectedPositional`] or
    /// [`ConstructError::UnexpectedKeyword`] for leftovers, positional first.
    pub fn finish(self) -> Result<(), ConstructError> {
        if !self.positional.is_empty() {
            return Err(ConstructError::UnexpectedPositional {
                count: self.positional.len(),
            });
        }
        if !self.keyword.is_empty() {
            let mut names: Vec<String> = self.keyword.into_iter().map(|(name, _)| name).collect();
            names.sort_unstable();
            return Err(ConstructError::UnexpectedKeyword(names));
        }
        Ok(())
    }

    fn bind(&mut self, name: &str) -> Result<Option<Value>, ConstructError> {
        match self.positional.pop_front() {
            Some(_) if self.keyword.contains_key(name) => {
                Err(ConstructError::MultipleValues(name.to_owned()))
            }
            Some(value) => Ok(Some(value)),
            None => Ok(self.keyword.remove(name)),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(keyword: Map<String, Value>) -> Self {
        Self::keywords(keyword)
    }
}
