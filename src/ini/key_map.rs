//! Map aliases used throughout the crate.
//!
//! Section and option order is the order of first insertion, so [`KeyMap`] is
//! backed by [`indexmap::IndexMap`].

use indexmap::IndexMap;

/// Alias to reduce coupling with map implementation
pub type KeyMap<V> = IndexMap<String, V>;

/// Options of one section, mapping the folded option name to its value.
pub type Section = KeyMap<String>;
