//! Where option values came from.
//!
//! A [`Location`] names a source and a 1-based line. The [`LocationStore`] keeps
//! one per `(section, option)`, keyed by the same folded names the parser uses
//! for values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use super::KeyMap;
use crate::errors::{ConfigError, ConfigResult};

/// Source and line an option value was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Name of the source: a path, or whatever name the caller gave a stream.
    pub file: String,
    /// 1-based line of the option's key.
    pub line: usize,
}

impl Location {
    /// Builds a location, rejecting an empty source name or line 0.
    pub fn new(file: impl Into<String>, line: usize) -> ConfigResult<Self> {
        let location = Location { file: file.into(), line };
        location.validate()?;
        Ok(location)
    }

    /// Checks that this is a usable `(source, line)` pair.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.file.is_empty() {
            return Err(ConfigError::InvalidLocation("empty source name".to_string()));
        }
        if self.line == 0 {
            return Err(ConfigError::InvalidLocation(format!(
                "line numbers start at 1, got 0 for {:?}",
                self.file
            )));
        }
        Ok(())
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl FromStr for Location {
    type Err = ConfigError;

    /// Parses `file:line`, splitting at the last colon.
    fn from_str(s: &str) -> ConfigResult<Self> {
        let Some((file, line)) = s.rsplit_once(':') else {
            return Err(ConfigError::InvalidLocation(format!("expected file:line, got {:?}", s)));
        };
        let line = line
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::InvalidLocation(format!("bad line number in {:?}: {}", s, e)))?;
        Location::new(file, line)
    }
}

/// What happens to an option's location when its value is set programmatically.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationPolicy {
    /// Forget the location: the value no longer comes from any file.
    #[default]
    Erase,
    /// Keep whatever location (or lack of one) the option had.
    Preserve,
    /// Attribute the value to the given place.
    Explicit(Location),
}

impl FromStr for LocationPolicy {
    type Err = ConfigError;

    /// Accepts `erase`, `preserve` or `file:line`.
    fn from_str(s: &str) -> ConfigResult<Self> {
        match s {
            "erase" => Ok(LocationPolicy::Erase),
            "preserve" => Ok(LocationPolicy::Preserve),
            other => other.parse().map(LocationPolicy::Explicit),
        }
    }
}

impl From<Location> for LocationPolicy {
    fn from(location: Location) -> Self {
        LocationPolicy::Explicit(location)
    }
}

/// Locations of options, per section.
///
/// An entry is either a location or an explicit "unknown". The explicit form
/// lets a section override an inherited option's location with nothing,
/// without touching the defaults section's own entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationStore {
    sections: KeyMap<KeyMap<Option<Location>>>,
}

impl LocationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        LocationStore { sections: KeyMap::new() }
    }

    /// Stores `location` for the option, replacing any previous one.
    pub fn record(&mut self, section: &str, option: &str, location: Location) {
        tracing::trace!(section, option, %location, "recording location");
        self.insert_entry(section, option, Some(location));
    }

    /// Stores an explicit "unknown" for the option.
    ///
    /// Unlike [`LocationStore::clear`], this hides the defaults' location of an
    /// inherited option.
    pub fn mark_unknown(&mut self, section: &str, option: &str) {
        tracing::trace!(section, option, "marking location unknown");
        self.insert_entry(section, option, None);
    }

    fn insert_entry(&mut self, section: &str, option: &str, entry: Option<Location>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(option.to_string(), entry);
    }

    /// Forgets the option's entry. Returns the location that was stored, if any.
    pub fn clear(&mut self, section: &str, option: &str) -> Option<Location> {
        let options = self.sections.get_mut(section)?;
        let removed = options.shift_remove(option);
        if removed.is_some() {
            tracing::trace!(section, option, "cleared location");
        }
        if options.is_empty() {
            self.sections.shift_remove(section);
        }
        removed.flatten()
    }

    /// Validates the pair and stores it. Nothing changes when it is malformed.
    pub fn set_explicit(&mut self, section: &str, option: &str, file: &str, line: usize) -> ConfigResult<()> {
        let location = Location::new(file, line)?;
        self.record(section, option, location);
        Ok(())
    }

    /// Forgets every entry of the section.
    pub fn drop_section(&mut self, section: &str) {
        if self.sections.shift_remove(section).is_some() {
            tracing::trace!(section, "dropped section locations");
        }
    }

    /// The location stored for exactly this section and option.
    pub fn get(&self, section: &str, option: &str) -> Option<&Location> {
        self.entry(section, option)?.as_ref()
    }

    /// The raw entry: `None` if nothing is stored, `Some(None)` for an explicit "unknown".
    pub fn entry(&self, section: &str, option: &str) -> Option<&Option<Location>> {
        self.sections.get(section)?.get(option)
    }

    /// Resolves an option's location the way values are resolved.
    ///
    /// An entry stored for the section itself wins. Without one, a value the
    /// section holds itself has no known location, and an inherited value
    /// reports the defaults section's location.
    pub fn lookup(&self, section: &str, option: &str, defaults_section: &str, owns_value: bool) -> Option<&Location> {
        match self.entry(section, option) {
            Some(entry) => entry.as_ref(),
            None if owns_value => None,
            None => self.get(defaults_section, option),
        }
    }

    /// Keeps only the entries for which `keep(section, option)` returns `true`.
    pub fn retain<F: FnMut(&str, &str) -> bool>(&mut self, mut keep: F) {
        for (section, options) in self.sections.iter_mut() {
            options.retain(|option, _| keep(section, option));
        }
        self.sections.retain(|_, options| !options.is_empty());
    }

    /// Number of entries across all sections.
    pub fn len(&self) -> usize {
        self.sections.values().map(KeyMap::len).sum()
    }

    /// `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
