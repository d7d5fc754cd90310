//! Provenance-carrying field wrapper.
//!
//! Every resolvable setting is stored as a [`Field`], which records not only the
//! value but where it came from. Downstream consumers use this to tell the user
//! which settings they chose and which ones were filled in for them
//! ("region was inferred as us-east-1").
//!
//! # States
//!
//! ```text
//! Absent          never supplied, not yet defaulted
//! Explicit(T)     supplied by the user; no rule may replace it
//! Inferred(T)     supplied or overridden by the engine
//! ```
//!
//! # Serialization
//!
//! Deserialization accepts the plain value (`"gcp"`), producing
//! [`Field::Explicit`]; `null` or a missing key produces [`Field::Absent`].
//! Serialization emits `{ "value": ..., "inferred": ... }` so a resolved
//! configuration keeps its provenance on the wire.
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A configuration value paired with its provenance.
///
/// Equality compares values only: `Explicit(x) == Inferred(x)` and
/// `Absent == Absent`. Use [`Field::is_inferred`] when provenance matters.
///
/// # Examples
///
/// ```rust
/// use resolve::Field;
///
/// let mut region: Field<String> = Field::Absent;
/// region.fill("us-east-1".to_string());
/// assert!(region.is_inferred());
///
/// let mut cloud = Field::Explicit("gcp".to_string());
/// cloud.fill("aws".to_string());
/// assert_eq!(cloud.value().map(String::as_str), Some("gcp"));
/// assert!(!cloud.is_inferred());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Field<T> {
    /// Never supplied and not yet defaulted.
    #[default]
    Absent,
    /// Supplied directly by the user.
    Explicit(T),
    /// Supplied or overridden by the inference engine.
    Inferred(T),
}

impl<T> Field<T> {
    /// Returns the value, if any, regardless of provenance.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Absent => None,
            Field::Explicit(v) | Field::Inferred(v) => Some(v),
        }
    }

    /// Consumes the field and returns its value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Absent => None,
            Field::Explicit(v) | Field::Inferred(v) => Some(v),
        }
    }

    pub fn is_set(&self) -> bool {
        !self.is_absent()
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Field::Explicit(_))
    }

    pub fn is_inferred(&self) -> bool {
        matches!(self, Field::Inferred(_))
    }

    /// Sets an inferred value only when the field is absent.
    ///
    /// This is the write primitive for generic defaults. Returns `true` when the
    /// field changed.
    pub fn fill(&mut self, value: T) -> bool {
        if self.is_absent() {
            *self = Field::Inferred(value);
            true
        } else {
            false
        }
    }

    /// Sets an inferred value unless the user supplied one.
    ///
    /// Replaces both absent and previously inferred values. This is the write
    /// primitive for authoritative capability data (a matched embedding model).
    /// Returns `true` when the field was written.
    pub fn infer(&mut self, value: T) -> bool {
        if self.is_explicit() {
            false
        } else {
            *self = Field::Inferred(value);
            true
        }
    }

    /// Replaces the value while keeping the current provenance.
    ///
    /// Absent fields stay absent.
    pub fn rewrite(&mut self, value: T) {
        match self {
            Field::Absent => {}
            Field::Explicit(v) | Field::Inferred(v) => *v = value,
        }
    }

    /// Re-tags a set value as explicit, as if the user had supplied it.
    pub fn into_explicit(self) -> Self {
        match self {
            Field::Inferred(v) => Field::Explicit(v),
            other => other,
        }
    }
}

impl Field<bool> {
    /// `true` only when the flag is set and its value is `true`.
    pub fn is_true(&self) -> bool {
        matches!(self.value(), Some(true))
    }
}

impl<T: PartialEq> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl<T: Eq> Eq for Field<T> {}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Explicit(v),
            None => Field::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Field", 2)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("inferred", &self.is_inferred())?;
        state.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Field::from)
    }
}
