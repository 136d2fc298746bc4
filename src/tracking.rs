//! Configuration parser that remembers where each value came from.
//!
//! [`TrackingParser`] wraps an [`Ini`] and a [`LocationStore`]. Reads run the
//! base [`Parser`] over a [`LineCountingReader`] and stamp every stored option
//! with the source name and the line its key was on. Values assigned outside a
//! read lose their location unless the caller asks otherwise through a
//! [`LocationPolicy`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::errors::{ConfigError, ConfigResult};
use crate::ini::{Ini, Location, LocationPolicy, LocationStore, ParserOptions, Section};
use crate::parser::{AssignObserver, Parser};
use crate::util::{LineCountingReader, ReadSession};

/// Keeps the location store in step with value assignments.
///
/// With no session the assignment is programmatic and the location is erased.
/// During a session the current line of the session is recorded; if no line
/// is current (the source is finished) the location is left alone.
struct Tracker<'a> {
    locations: &'a mut LocationStore,
    session: Option<&'a ReadSession>,
}

impl<'a> Tracker<'a> {
    fn idle(locations: &'a mut LocationStore) -> Self {
        Tracker { locations, session: None }
    }

    fn reading(locations: &'a mut LocationStore, session: &'a ReadSession) -> Self {
        Tracker { locations, session: Some(session) }
    }
}

impl AssignObserver for Tracker<'_> {
    fn assigned(&mut self, section: &str, option: &str) {
        match self.session {
            None => {
                self.locations.clear(section, option);
            }
            Some(session) => {
                if let Some(line) = session.current_line() {
                    let location = Location {
                        file: session.source().to_string(),
                        line,
                    };
                    self.locations.record(section, option, location);
                }
            }
        }
    }
}

/// INI parser with per-option provenance.
///
/// # Examples
///
/// ```rust
/// # use configlines::{TrackingParser, LocationPolicy};
/// let mut cfg = TrackingParser::new();
/// cfg.read_string("# settings\n[foo]\nbar = 1\nbaz = 2\n", "settings.ini").unwrap();
///
/// let location = cfg.get_location("foo", "bar").unwrap().unwrap();
/// assert_eq!((location.file.as_str(), location.line), ("settings.ini", 3));
///
/// cfg.set("foo", "bar", "X", LocationPolicy::Erase).unwrap();
/// assert_eq!(cfg.get_location("foo", "bar").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackingParser {
    ini: Ini,
    locations: LocationStore,
}

impl TrackingParser {
    /// Creates an empty parser with default [`ParserOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty parser with the given options.
    pub fn with_options(options: ParserOptions) -> Self {
        TrackingParser {
            ini: Ini::new(options),
            locations: LocationStore::new(),
        }
    }

    /// The values, without provenance.
    pub fn ini(&self) -> &Ini {
        &self.ini
    }

    /// All tracked locations.
    pub fn locations(&self) -> &LocationStore {
        &self.locations
    }

    // ////////////////////////
    // Reading
    // ////////////////////////

    /// Reads the files in order. Later files override earlier ones, locations included.
    ///
    /// Files that cannot be opened, and paths that are not regular files, are skipped. Returns the paths that were read.
    /// Errors while reading an opened file are returned as they occur; files
    /// before it stay loaded.
    pub fn read<I, P>(&mut self, paths: I) -> ConfigResult<Vec<PathBuf>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut read_ok = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let file = match File::open(path) {
                Ok(file) => file,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            match file.metadata() {
                Ok(metadata) if metadata.is_file() => {}
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "skipping path that is not a regular file");
                    continue;
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            }
            self.read_file(file, &path.display().to_string())?;
            read_ok.push(path.to_path_buf());
        }
        Ok(read_ok)
    }

    /// Reads one open source, recording locations under `name`.
    pub fn read_file<R: Read>(&mut self, source: R, name: &str) -> ConfigResult<()> {
        tracing::debug!(source = name, "reading");
        let session = ReadSession::new(name);
        let reader = LineCountingReader::new(BufReader::new(source), &session);
        let mut tracker = Tracker::reading(&mut self.locations, &session);
        let result = Parser::new().read_lines(&mut self.ini, reader, name, &mut tracker);
        tracing::debug!(source = name, ok = result.is_ok(), "finished reading");
        result
    }

    /// Reads INI text, recording locations under `name`.
    pub fn read_string(&mut self, text: &str, name: &str) -> ConfigResult<()> {
        self.read_file(text.as_bytes(), name)
    }

    /// Loads values from nested `(section, [(option, value)])` data.
    ///
    /// The values come from no file, so each assigned option loses its location.
    pub fn read_dict<'a, D, S>(&mut self, data: D) -> ConfigResult<()>
    where
        D: IntoIterator<Item = (&'a str, S)>,
        S: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.ini.read_dict_observed(data, &mut Tracker::idle(&mut self.locations))
    }

    // ////////////////////////
    // Mutation
    // ////////////////////////

    /// Assigns a value, updating its location according to `policy`.
    ///
    /// Fails without changing anything if the section does not exist or the
    /// explicit location is malformed.
    pub fn set(&mut self, section: &str, option: &str, value: &str, policy: LocationPolicy) -> ConfigResult<()> {
        match policy {
            LocationPolicy::Erase => {
                self.ini.set_observed(section, option, value, &mut Tracker::idle(&mut self.locations))
            }
            LocationPolicy::Preserve => {
                // an inherited value keeps the location it showed before the section took it over
                let folded = self.ini.optionxform(option);
                let inherited = if self.ini.section(section).is_some() && !self.ini.owns_option(section, &folded) {
                    self.locations
                        .lookup(section, &folded, self.ini.default_section(), false)
                        .cloned()
                } else {
                    None
                };
                self.ini.set(section, option, value)?;
                if let Some(location) = inherited {
                    self.locations.record(section, &folded, location);
                }
                Ok(())
            }
            LocationPolicy::Explicit(location) => {
                location.validate()?;
                self.ini.set(section, option, value)?;
                let folded = self.ini.optionxform(option);
                self.locations.set_explicit(section, &folded, &location.file, location.line)
            }
        }
    }

    /// Overwrites or clears the location of an existing option without touching its value.
    ///
    /// Only the named section changes. For an option inherited from the
    /// defaults the new location shadows the defaults' one in this section
    /// alone; other sections and the defaults section keep theirs.
    pub fn set_location(&mut self, section: &str, option: &str, location: Option<Location>) -> ConfigResult<()> {
        self.check_option(section, option)?;
        if let Some(location) = &location {
            location.validate()?;
        }
        let folded = self.ini.optionxform(option);
        match location {
            Some(location) => self.locations.record(section, &folded, location),
            None if self.ini.owns_option(section, &folded) => {
                self.locations.clear(section, &folded);
            }
            None => self.locations.mark_unknown(section, &folded),
        }
        Ok(())
    }

    /// Adds an empty section.
    pub fn add_section(&mut self, section: &str) -> ConfigResult<()> {
        self.ini.add_section(section)
    }

    /// Removes a section and every location in it. Returns whether it existed.
    pub fn remove_section(&mut self, section: &str) -> bool {
        let existed = self.ini.remove_section(section);
        if existed {
            self.locations.drop_section(section);
        }
        existed
    }

    /// Removes an option and its location. Returns whether it existed.
    ///
    /// Removing a default also forgets the locations other sections kept for
    /// the inherited value.
    pub fn remove_option(&mut self, section: &str, option: &str) -> ConfigResult<bool> {
        let existed = self.ini.remove_option(section, option)?;
        let folded = self.ini.optionxform(option);
        self.locations.clear(section, &folded);
        if existed && self.ini.is_default_section(section) {
            let ini = &self.ini;
            self.locations
                .retain(|s, o| o != folded || ini.is_default_section(s) || ini.owns_option(s, o));
        }
        Ok(existed)
    }

    /// Mutable handle on one section, for map-style assignment.
    pub fn section_mut(&mut self, section: &str) -> ConfigResult<SectionMut<'_>> {
        if self.ini.section(section).is_none() {
            return Err(ConfigError::NoSection(section.to_string()));
        }
        Ok(SectionMut {
            parser: self,
            section: section.to_string(),
        })
    }

    // ////////////////////////
    // Queries
    // ////////////////////////

    /// Where the option's value came from, if known.
    ///
    /// `Ok(None)` means the option exists but its origin is unknown. An option
    /// inherited from the defaults reports the defaults' location.
    pub fn get_location(&self, section: &str, option: &str) -> ConfigResult<Option<&Location>> {
        self.check_option(section, option)?;
        let folded = self.ini.optionxform(option);
        let owns_value = self.ini.owns_option(section, &folded);
        Ok(self
            .locations
            .lookup(section, &folded, self.ini.default_section(), owns_value))
    }

    /// Line of the option's key, if known.
    pub fn get_line(&self, section: &str, option: &str) -> ConfigResult<Option<usize>> {
        Ok(self.get_location(section, option)?.map(|l| l.line))
    }

    /// Source the option was read from, if known.
    pub fn get_filename(&self, section: &str, option: &str) -> ConfigResult<Option<&str>> {
        Ok(self.get_location(section, option)?.map(|l| l.file.as_str()))
    }

    /// The option's value, from the section or the defaults.
    pub fn get(&self, section: &str, option: &str) -> ConfigResult<&str> {
        self.ini.get(section, option)
    }

    /// Names of the user sections, in order.
    pub fn sections(&self) -> Vec<&str> {
        self.ini.sections()
    }

    /// `true` if the user section exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.ini.has_section(section)
    }

    /// `true` if the option resolves in the section, directly or through the defaults.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.ini.has_option(section, option)
    }

    /// Option names visible in the section.
    pub fn options(&self, section: &str) -> ConfigResult<Vec<&str>> {
        self.ini.options(section)
    }

    /// `(option, value)` pairs visible in the section.
    pub fn items(&self, section: &str) -> ConfigResult<Vec<(&str, &str)>> {
        self.ini.items(section)
    }

    /// The fallback options.
    pub fn defaults(&self) -> &Section {
        self.ini.defaults()
    }

    /// Fails the way a value lookup would if the option can't be resolved.
    fn check_option(&self, section: &str, option: &str) -> ConfigResult<()> {
        if self.ini.section(section).is_none() {
            return Err(ConfigError::NoSection(section.to_string()));
        }
        if !self.ini.has_option(section, option) {
            return Err(ConfigError::NoOption {
                option: option.to_string(),
                section: section.to_string(),
            });
        }
        Ok(())
    }
}

/// Map-style access to one section of a [`TrackingParser`].
///
/// Assignments through this handle are programmatic and erase locations, the
/// same as [`TrackingParser::set`] with [`LocationPolicy::Erase`].
pub struct SectionMut<'a> {
    parser: &'a mut TrackingParser,
    section: String,
}

impl SectionMut<'_> {
    /// Name of the section.
    pub fn name(&self) -> &str {
        &self.section
    }

    /// The option's value, from the section or the defaults.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.parser.get(&self.section, option).ok()
    }

    /// Assigns a value and erases its location.
    pub fn insert(&mut self, option: &str, value: &str) -> ConfigResult<()> {
        self.parser.set(&self.section, option, value, LocationPolicy::Erase)
    }

    /// Removes an option and its location. Returns whether it existed.
    pub fn remove(&mut self, option: &str) -> ConfigResult<bool> {
        self.parser.remove_option(&self.section, option)
    }
}
