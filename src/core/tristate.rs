//! Three-state optional for request fields
//!
//! JSON request bodies distinguish a key that is missing from a key that is
//! present with `null`. `Tristate` keeps that distinction up to the point
//! where a field is normalized, so every field goes through exactly one rule.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A request field that is absent, explicitly null, or carries a value
///
/// Use with `#[serde(default)]` so that a missing key deserializes to
/// [`Tristate::Absent`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Tristate<T> {
    #[default]
    Absent,
    Null,
    Present(T),
}

impl<T> Tristate<T> {
    /// Whether a value was supplied
    pub fn is_present(&self) -> bool {
        matches!(self, Tristate::Present(_))
    }

    /// Borrow the value, treating absent and null alike
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Tristate::Present(value) => Some(value),
            Tristate::Absent | Tristate::Null => None,
        }
    }

    /// Take the value, treating absent and null alike
    pub fn into_option(self) -> Option<T> {
        match self {
            Tristate::Present(value) => Some(value),
            Tristate::Absent | Tristate::Null => None,
        }
    }

    /// Map the present value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Tristate<U> {
        match self {
            Tristate::Absent => Tristate::Absent,
            Tristate::Null => Tristate::Null,
            Tristate::Present(value) => Tristate::Present(f(value)),
        }
    }
}

impl<T> From<Option<T>> for Tristate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Tristate::Present(value),
            None => Tristate::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tristate<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only called when the key exists; a missing key goes through Default
        Option::<T>::deserialize(deserializer).map(Into::into)
    }
}

impl<T: Serialize> Serialize for Tristate<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Tristate::Present(value) => serializer.serialize_some(value),
            Tristate::Absent | Tristate::Null => serializer.serialize_none(),
        }
    }
}
