//! Serde helpers for nullable backend columns.

use serde::{Deserialize, Deserializer};

/// Deserialize an explicit `null` as the type's default.
///
/// Pair with `#[serde(default)]` so a missing column behaves the same.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
