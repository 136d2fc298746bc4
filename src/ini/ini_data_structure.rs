//! Value storage of a parsed configuration.
//!
//! [`Ini`] owns the defaults section and the ordered user sections. Every
//! mutation that assigns a value has an `_observed` form taking an
//! [`AssignObserver`], which is told the folded `(section, option)` of each
//! assignment. The plain forms pass `()`, which ignores them.

use std::collections::HashSet;

use super::{KeyMap, ParserOptions, Section};
use crate::errors::{ConfigError, ConfigResult};
use crate::parser::AssignObserver;

/// Source name reported for errors in data loaded by `read_dict`.
const DICT_SOURCE: &str = "<dict>";

/// Sections and options of a configuration, without provenance.
#[derive(Debug, Clone)]
pub struct Ini {
    options: ParserOptions,
    defaults: Section,
    sections: KeyMap<Section>,
}

impl Default for Ini {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl PartialEq for Ini {
    fn eq(&self, other: &Self) -> bool {
        self.options.default_section == other.options.default_section
            && self.defaults == other.defaults
            && self.sections == other.sections
    }
}

impl Ini {
    /// Creates an empty configuration.
    pub fn new(options: ParserOptions) -> Self {
        Ini {
            options,
            defaults: Section::new(),
            sections: KeyMap::new(),
        }
    }

    /// The options this configuration parses and folds with.
    pub fn parser_options(&self) -> &ParserOptions {
        &self.options
    }

    /// Name of the fallback section.
    pub fn default_section(&self) -> &str {
        &self.options.default_section
    }

    /// Folds an option name the way it is stored.
    pub fn optionxform(&self, option: &str) -> String {
        self.options.fold_option(option)
    }

    /// `true` if `section` names the fallback section.
    pub fn is_default_section(&self, section: &str) -> bool {
        section == self.options.default_section
    }

    /// Names of the user sections, in order. The defaults section is not listed.
    pub fn sections(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// `true` if the user section exists. Always `false` for the defaults section.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Adds an empty user section.
    pub fn add_section(&mut self, section: &str) -> ConfigResult<()> {
        if self.is_default_section(section) {
            return Err(ConfigError::InvalidSectionName(section.to_string()));
        }
        if self.sections.contains_key(section) {
            return Err(ConfigError::SectionExists(section.to_string()));
        }
        self.sections.insert(section.to_string(), Section::new());
        Ok(())
    }

    /// Removes a user section. Returns whether it existed.
    pub fn remove_section(&mut self, section: &str) -> bool {
        self.sections.shift_remove(section).is_some()
    }

    /// The fallback options.
    pub fn defaults(&self) -> &Section {
        &self.defaults
    }

    /// Options of the section itself, or of the defaults for the defaults name.
    pub fn section(&self, section: &str) -> Option<&Section> {
        if self.is_default_section(section) {
            Some(&self.defaults)
        } else {
            self.sections.get(section)
        }
    }

    pub(crate) fn section_mut(&mut self, section: &str) -> Option<&mut Section> {
        if section == self.options.default_section {
            Some(&mut self.defaults)
        } else {
            self.sections.get_mut(section)
        }
    }

    pub(crate) fn section_or_insert(&mut self, section: &str) -> &mut Section {
        if section == self.options.default_section {
            &mut self.defaults
        } else {
            self.sections.entry(section.to_string()).or_default()
        }
    }

    /// `true` if the option resolves in the section, directly or through the defaults.
    ///
    /// For the defaults section only the defaults are searched; for a missing
    /// section the answer is `false`.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        let option = self.optionxform(option);
        if self.is_default_section(section) {
            return self.defaults.contains_key(&option);
        }
        match self.sections.get(section) {
            Some(own) => own.contains_key(&option) || self.defaults.contains_key(&option),
            None => false,
        }
    }

    /// `true` if the section itself holds a value for the already folded option.
    pub fn owns_option(&self, section: &str, folded_option: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains_key(folded_option))
    }

    /// Option names visible in the section: its own, then the defaults it doesn't override.
    pub fn options(&self, section: &str) -> ConfigResult<Vec<&str>> {
        let own = self.existing_section(section)?;
        let mut names: Vec<&str> = own.keys().map(String::as_str).collect();
        if !self.is_default_section(section) {
            names.extend(
                self.defaults
                    .keys()
                    .filter(|k| !own.contains_key(*k))
                    .map(String::as_str),
            );
        }
        Ok(names)
    }

    /// The option's value, looked up in the section and then in the defaults.
    pub fn get(&self, section: &str, option: &str) -> ConfigResult<&str> {
        let own = self.existing_section(section)?;
        let folded = self.optionxform(option);
        own.get(&folded)
            .or_else(|| self.defaults.get(&folded))
            .map(String::as_str)
            .ok_or_else(|| ConfigError::NoOption {
                option: option.to_string(),
                section: section.to_string(),
            })
    }

    /// `(option, value)` pairs visible in the section, defaults included.
    pub fn items(&self, section: &str) -> ConfigResult<Vec<(&str, &str)>> {
        let own = self.existing_section(section)?;
        let mut items: Vec<(&str, &str)> = own.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        if !self.is_default_section(section) {
            items.extend(
                self.defaults
                    .iter()
                    .filter(|(k, _)| !own.contains_key(*k))
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        Ok(items)
    }

    /// Assigns a value without notifying anyone.
    pub fn set(&mut self, section: &str, option: &str, value: &str) -> ConfigResult<()> {
        self.set_observed(section, option, value, &mut ())
    }

    /// Assigns a value and reports the assignment to `observer`.
    ///
    /// The section must exist (or be the defaults section); nothing is changed
    /// when it doesn't.
    pub fn set_observed<O: AssignObserver + ?Sized>(
        &mut self,
        section: &str,
        option: &str,
        value: &str,
        observer: &mut O,
    ) -> ConfigResult<()> {
        let folded = self.optionxform(option);
        let own = self
            .section_mut(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        own.insert(folded.clone(), value.to_string());
        observer.assigned(section, &folded);
        Ok(())
    }

    /// Loads sections from nested `(section, [(option, value)])` data.
    ///
    /// Sections are created as needed and merged into existing ones. Every
    /// value goes through `observer`. In strict mode a section, or an option
    /// after folding, that repeats within `data` is an error; values loaded
    /// before it stay.
    pub fn read_dict_observed<'a, D, S, O>(&mut self, data: D, observer: &mut O) -> ConfigResult<()>
    where
        D: IntoIterator<Item = (&'a str, S)>,
        S: IntoIterator<Item = (&'a str, &'a str)>,
        O: AssignObserver + ?Sized,
    {
        let strict = self.options.strict;
        let mut sections_seen: HashSet<&str> = HashSet::new();
        let mut options_seen: HashSet<(&str, String)> = HashSet::new();
        for (section, options) in data {
            if !sections_seen.insert(section) && strict {
                return Err(ConfigError::DuplicateSection {
                    section: section.to_string(),
                    source_name: DICT_SOURCE.to_string(),
                    line: None,
                });
            }
            self.section_or_insert(section);
            for (option, value) in options {
                let folded = self.optionxform(option);
                if !options_seen.insert((section, folded.clone())) && strict {
                    return Err(ConfigError::DuplicateOption {
                        section: section.to_string(),
                        option: folded,
                        source_name: DICT_SOURCE.to_string(),
                        line: None,
                    });
                }
                self.set_observed(section, option, value, observer)?;
            }
        }
        Ok(())
    }

    /// Removes an option from the section itself. Returns whether it existed.
    pub fn remove_option(&mut self, section: &str, option: &str) -> ConfigResult<bool> {
        let folded = self.optionxform(option);
        let own = self
            .section_mut(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        Ok(own.shift_remove(&folded).is_some())
    }

    fn existing_section(&self, section: &str) -> ConfigResult<&Section> {
        self.section(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<(String, String)>);

    impl AssignObserver for Recorder {
        fn assigned(&mut self, section: &str, option: &str) {
            self.0.push((section.to_string(), option.to_string()));
        }
    }

    fn sample() -> Ini {
        let mut ini = Ini::default();
        ini.add_section("foo").unwrap();
        ini.set("foo", "Bar", "1").unwrap();
        ini.set("DEFAULT", "shared", "d").unwrap();
        ini
    }

    #[test]
    fn new_is_empty() {
        let ini = Ini::default();
        assert!(ini.sections().is_empty());
        assert!(ini.defaults().is_empty());
        assert_eq!(ini.default_section(), "DEFAULT");
    }

    #[test]
    fn add_section_rules() {
        let mut ini = Ini::default();
        ini.add_section("foo").unwrap();
        assert!(matches!(ini.add_section("foo"), Err(ConfigError::SectionExists(_))));
        assert!(matches!(ini.add_section("DEFAULT"), Err(ConfigError::InvalidSectionName(_))));
        assert!(ini.has_section("foo"));
        assert!(!ini.has_section("DEFAULT"));
        assert!(!ini.has_section("Foo"));
    }

    #[test]
    fn options_are_case_folded_and_fall_back_to_defaults() {
        let ini = sample();
        assert_eq!(ini.get("foo", "BAR").unwrap(), "1");
        assert_eq!(ini.get("foo", "shared").unwrap(), "d");
        assert!(ini.has_option("foo", "bar"));
        assert!(ini.has_option("foo", "Shared"));
        assert!(ini.has_option("DEFAULT", "shared"));
        assert!(!ini.has_option("DEFAULT", "bar"));
        assert!(!ini.has_option("nope", "bar"));
        assert!(ini.owns_option("foo", "bar"));
        assert!(!ini.owns_option("foo", "shared"));
        assert_eq!(ini.options("foo").unwrap(), vec!["bar", "shared"]);
        assert_eq!(ini.items("foo").unwrap(), vec![("bar", "1"), ("shared", "d")]);
        assert_eq!(ini.items("DEFAULT").unwrap(), vec![("shared", "d")]);
    }

    #[test]
    fn missing_section_and_option_errors() {
        let ini = sample();
        assert!(matches!(ini.get("nope", "bar"), Err(ConfigError::NoSection(s)) if s == "nope"));
        assert!(matches!(
            ini.get("foo", "nope"),
            Err(ConfigError::NoOption { option, section }) if option == "nope" && section == "foo"
        ));
        assert!(matches!(ini.options("nope"), Err(ConfigError::NoSection(_))));
    }

    #[test]
    fn set_requires_section_and_reports_folded_keys() {
        let mut ini = sample();
        let mut rec = Recorder::default();
        assert!(matches!(
            ini.set_observed("nope", "x", "1", &mut rec),
            Err(ConfigError::NoSection(_))
        ));
        assert!(rec.0.is_empty());
        ini.set_observed("foo", "MiXed", "2", &mut rec).unwrap();
        ini.set_observed("DEFAULT", "Other", "3", &mut rec).unwrap();
        assert_eq!(
            rec.0,
            vec![
                ("foo".to_string(), "mixed".to_string()),
                ("DEFAULT".to_string(), "other".to_string()),
            ]
        );
    }

    #[test]
    fn read_dict_creates_and_merges_sections() {
        let mut ini = sample();
        let mut rec = Recorder::default();
        ini.read_dict_observed(
            vec![("foo", vec![("baz", "2")]), ("new", vec![("a", "b")])],
            &mut rec,
        )
        .unwrap();
        assert_eq!(ini.sections(), vec!["foo", "new"]);
        assert_eq!(ini.get("foo", "bar").unwrap(), "1");
        assert_eq!(ini.get("foo", "baz").unwrap(), "2");
        assert_eq!(ini.get("new", "a").unwrap(), "b");
        assert_eq!(rec.0.len(), 2);
    }

    #[test]
    fn strict_read_dict_rejects_repeats() {
        let mut ini = Ini::default();
        let mut rec = Recorder::default();
        let err = ini
            .read_dict_observed([("a", vec![("x", "1"), ("X", "2")])], &mut rec)
            .unwrap_err();
        match err {
            ConfigError::DuplicateOption { section, option, source_name, line } => {
                assert_eq!((section.as_str(), option.as_str()), ("a", "x"));
                assert_eq!(source_name, "<dict>");
                assert_eq!(line, None);
            }
            other => panic!("unexpected: {:?}", other),
        }
        // values before the repeat stay
        assert_eq!(ini.get("a", "x").unwrap(), "1");
        assert_eq!(rec.0, vec![("a".to_string(), "x".to_string())]);

        let mut ini = Ini::default();
        assert!(matches!(
            ini.read_dict_observed([("a", vec![("x", "1")]), ("a", vec![("y", "2")])], &mut ()),
            Err(ConfigError::DuplicateSection { line: None, .. })
        ));
        assert!(matches!(
            ini.read_dict_observed([("DEFAULT", Vec::<(&str, &str)>::new()), ("DEFAULT", Vec::new())], &mut ()),
            Err(ConfigError::DuplicateSection { .. })
        ));
        // repeats across calls are fine
        ini.read_dict_observed([("a", vec![("x", "3")])], &mut ()).unwrap();
        assert_eq!(ini.get("a", "x").unwrap(), "3");
    }

    #[test]
    fn lenient_read_dict_lets_the_last_value_win() {
        let mut ini = Ini::new(ParserOptions::new().strict(false));
        ini.read_dict_observed([("a", vec![("x", "1")]), ("a", vec![("X", "2")])], &mut ())
            .unwrap();
        assert_eq!(ini.get("a", "x").unwrap(), "2");
    }

    #[test]
    fn remove_option_and_section() {
        let mut ini = sample();
        assert!(ini.remove_option("foo", "BAR").unwrap());
        assert!(!ini.remove_option("foo", "bar").unwrap());
        assert!(matches!(ini.remove_option("nope", "bar"), Err(ConfigError::NoSection(_))));
        assert!(ini.remove_section("foo"));
        assert!(!ini.remove_section("foo"));
    }
}
