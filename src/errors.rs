//! Error type shared by parsing, lookups and mutations.

use thiserror::Error;

/// Errors that can occur when reading or mutating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a source.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested section does not exist.
    #[error("No section: {0:?}")]
    NoSection(String),
    /// The requested option does not exist in the section (nor in the defaults).
    #[error("No option {option:?} in section: {section:?}")]
    NoOption {
        /// Option name as given by the caller.
        option: String,
        /// Section name as given by the caller.
        section: String,
    },
    /// A section was declared twice within one source.
    #[error("While reading from {}: section {section:?} already exists", origin(.source_name, .line))]
    DuplicateSection {
        /// Section name.
        section: String,
        /// Source being read.
        source_name: String,
        /// Line of the second declaration. Sources without lines, like dicts, have none.
        line: Option<usize>,
    },
    /// An option was declared twice within one section of one source.
    #[error("While reading from {}: option {option:?} in section {section:?} already exists", origin(.source_name, .line))]
    DuplicateOption {
        /// Section name.
        section: String,
        /// Folded option name.
        option: String,
        /// Source being read.
        source_name: String,
        /// Line of the second declaration, if the source has lines.
        line: Option<usize>,
    },
    /// An option line appeared before any section header.
    #[error("File contains no section headers.\nfile: {source_name:?}, line: {line}\n{text:?}")]
    MissingSectionHeader {
        /// Source being read.
        source_name: String,
        /// Line of the option.
        line: usize,
        /// The offending line.
        text: String,
    },
    /// One or more lines could not be parsed.
    #[error("Source contains parsing errors: {source_name:?}{}", format_lines(.lines))]
    Parsing {
        /// Source being read.
        source_name: String,
        /// Offending `(line number, line text)` pairs, in input order.
        lines: Vec<(usize, String)>,
    },
    /// `add_section` was called for a section that already exists.
    #[error("Section {0:?} already exists")]
    SectionExists(String),
    /// The section name is reserved (the defaults section).
    #[error("Invalid section name: {0:?}")]
    InvalidSectionName(String),
    /// A location argument was not a valid `(source, line)` pair.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}

fn origin(source_name: &str, line: &Option<usize>) -> String {
    match line {
        Some(line) => format!("{:?} [line {:2}]", source_name, line),
        None => format!("{:?}", source_name),
    }
}

fn format_lines(lines: &[(usize, String)]) -> String {
    lines
        .iter()
        .map(|(n, text)| format!("\n\t[line {:2}]: {:?}", n, text))
        .collect()
}

/// A specialized `Result` type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_messages_name_the_line_only_when_there_is_one() {
        let from_file = ConfigError::DuplicateOption {
            section: "a".to_string(),
            option: "x".to_string(),
            source_name: "a.cfg".to_string(),
            line: Some(3),
        };
        assert_eq!(
            from_file.to_string(),
            r#"While reading from "a.cfg" [line  3]: option "x" in section "a" already exists"#
        );
        let from_dict = ConfigError::DuplicateSection {
            section: "a".to_string(),
            source_name: "<dict>".to_string(),
            line: None,
        };
        assert_eq!(from_dict.to_string(), r#"While reading from "<dict>": section "a" already exists"#);
    }
}
