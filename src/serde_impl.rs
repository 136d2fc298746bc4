use serde::ser::{Serialize, SerializeMap, SerializeStruct, Serializer};

use crate::ini::{Location, Section};
use crate::tracking::TrackingParser;

// ============================================================================
// Serialization
// ============================================================================

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Location", 2)?;
        s.serialize_field("file", &self.file)?;
        s.serialize_field("line", &self.line)?;
        s.end()
    }
}

/// Serializes as a provenance report: section → option → `{ value, file, line }`.
///
/// The defaults come first under the defaults section name, when there are any.
/// Each section lists only the options it holds itself. `file` and `line` are
/// `null` for values of unknown origin.
impl Serialize for TrackingParser {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let ini = self.ini();
        let has_defaults = !ini.defaults().is_empty();
        let mut map = serializer.serialize_map(Some(ini.sections().len() + usize::from(has_defaults)))?;
        if has_defaults {
            let name = ini.default_section();
            map.serialize_entry(name, &SectionReport { parser: self, name, options: ini.defaults() })?;
        }
        for name in ini.sections() {
            if let Some(options) = ini.section(name) {
                map.serialize_entry(name, &SectionReport { parser: self, name, options })?;
            }
        }
        map.end()
    }
}

struct SectionReport<'a> {
    parser: &'a TrackingParser,
    name: &'a str,
    options: &'a Section,
}

impl Serialize for SectionReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len()))?;
        for (option, value) in self.options {
            let location = self.parser.locations().get(self.name, option);
            map.serialize_entry(option, &OptionReport { value, location })?;
        }
        map.end()
    }
}

struct OptionReport<'a> {
    value: &'a str,
    location: Option<&'a Location>,
}

impl Serialize for OptionReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Option", 3)?;
        s.serialize_field("value", self.value)?;
        s.serialize_field("file", &self.location.map(|l| l.file.as_str()))?;
        s.serialize_field("line", &self.location.map(|l| l.line))?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ini::LocationPolicy;

    #[test]
    fn location_serializes_as_struct() {
        let l = Location { file: "a.cfg".to_string(), line: 3 };
        assert_eq!(serde_json::to_string(&l).unwrap(), r#"{"file":"a.cfg","line":3}"#);
    }

    #[test]
    fn report_lists_defaults_first_and_own_options_only() {
        let mut cfg = TrackingParser::new();
        cfg.read_string("[foo]\nbar = 1\n[DEFAULT]\nd = x\n", "a.cfg").unwrap();
        cfg.set("foo", "new", "2", LocationPolicy::Erase).unwrap();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "DEFAULT": { "d": { "value": "x", "file": "a.cfg", "line": 4 } },
                "foo": {
                    "bar": { "value": "1", "file": "a.cfg", "line": 2 },
                    "new": { "value": "2", "file": null, "line": null },
                },
            })
        );
    }
}
