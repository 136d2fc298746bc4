//! Reads INI text into an [`Ini`].
//!
//! The read loop follows Python's `configparser`: `[section]` headers,
//! `key = value` or `key: value` options, full-line and inline comments, and
//! values continued on deeper-indented lines.
//!
//! Every option the loop stores is reported to an [`AssignObserver`] exactly
//! once, when its key line is parsed. Continuation lines extend the stored value
//! without another report.

use std::collections::HashSet;
use std::io::{self, BufRead, BufReader, Read};

use crate::errors::{ConfigError, ConfigResult};
use crate::ini::{Ini, ParserOptions};

mod ini_grammar;

use self::ini_grammar::grammar;

/// Told about every value assignment a mutation performs.
///
/// Section and option arrive folded the way they are stored, so they can be
/// used as keys directly. The defaults section is reported under its name.
pub trait AssignObserver {
    /// Called after the value of `option` in `section` was stored.
    fn assigned(&mut self, section: &str, option: &str);
}

/// Ignores all assignments.
impl AssignObserver for () {
    fn assigned(&mut self, _section: &str, _option: &str) {}
}

/// Reads INI sources into [`Ini`] values.
///
/// # Examples
///
/// ```rust
/// # use configlines::parser::Parser;
/// let text = "[server]\nhost = example.org\nport: 8080\n";
/// let ini = Parser::new().read_ini(text.as_bytes(), "<string>").unwrap();
/// assert_eq!(ini.get("server", "port").unwrap(), "8080");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    /// Creates a new `Parser`.
    pub fn new() -> Self {
        Parser
    }

    /// Reads one complete source into a fresh [`Ini`] with default options.
    pub fn read_ini<T: Read>(&self, source: T, name: &str) -> ConfigResult<Ini> {
        let mut ini = Ini::default();
        self.read_into(&mut ini, BufReader::new(source), name)?;
        Ok(ini)
    }

    /// Reads one source into an existing [`Ini`], merging with what is there.
    pub fn read_into<T: BufRead>(&self, ini: &mut Ini, reader: T, name: &str) -> ConfigResult<()> {
        self.read_lines(ini, reader.lines(), name, &mut ())
    }

    /// Reads lines of one source into `ini`, reporting each stored option to `observer`.
    ///
    /// Lines come without terminators. Line numbers in errors count from 1.
    /// Lines that are neither headers, options, comments nor continuations are
    /// collected and reported together as [`ConfigError::Parsing`] once the
    /// source is consumed; everything else fails at the offending line.
    pub fn read_lines<I, O>(&self, ini: &mut Ini, lines: I, name: &str, observer: &mut O) -> ConfigResult<()>
    where
        I: IntoIterator<Item = io::Result<String>>,
        O: AssignObserver + ?Sized,
    {
        let options = ini.parser_options().clone();
        let mut state = ReadState::default();
        let result = self.__read_lines(ini, &options, lines, name, observer, &mut state);
        state.flush(ini);
        result?;
        if !state.errors.is_empty() {
            return Err(ConfigError::Parsing {
                source_name: name.to_string(),
                lines: state.errors,
            });
        }
        tracing::debug!(source = name, sections = ini.sections().len(), "parsed source");
        Ok(())
    }

    fn __read_lines<I, O>(
        &self,
        ini: &mut Ini,
        options: &ParserOptions,
        lines: I,
        name: &str,
        observer: &mut O,
        state: &mut ReadState,
    ) -> ConfigResult<()>
    where
        I: IntoIterator<Item = io::Result<String>>,
        O: AssignObserver + ?Sized,
    {
        let mut indent_level = 0;
        for (index, line) in lines.into_iter().enumerate() {
            let line = line?;
            let lineno = index + 1;

            let comment_start = comment_start(options, &line);
            let value = line[..comment_start.unwrap_or(line.len())].trim();
            if value.is_empty() {
                if options.empty_lines_in_values {
                    if comment_start.is_none() {
                        if let Some(pending) = state.pending.as_mut() {
                            pending.lines.push(String::new());
                        }
                    }
                } else {
                    indent_level = usize::MAX;
                }
                continue;
            }

            let cur_indent_level = line.len() - line.trim_start().len();
            if cur_indent_level > indent_level {
                if let Some(pending) = state.pending.as_mut() {
                    pending.lines.push(value.to_string());
                    continue;
                }
            }
            indent_level = cur_indent_level;

            if let Ok(header) = grammar::section_header(value) {
                state.flush(ini);
                if !ini.is_default_section(header) {
                    if options.strict && state.sections_seen.contains(header) {
                        return Err(ConfigError::DuplicateSection {
                            section: header.to_string(),
                            source_name: name.to_string(),
                            line: Some(lineno),
                        });
                    }
                    state.sections_seen.insert(header.to_string());
                    ini.section_or_insert(header);
                }
                state.section = Some(header.to_string());
                continue;
            }

            let Some(section) = state.section.clone() else {
                return Err(ConfigError::MissingSectionHeader {
                    source_name: name.to_string(),
                    line: lineno,
                    text: line.clone(),
                });
            };

            let parsed = grammar::option_line(value, &options.delimiters)
                .ok()
                .map(|(key, raw_value)| (key.trim_end().to_string(), raw_value.trim().to_string()))
                .filter(|(key, _)| !key.is_empty());
            let Some((key, raw_value)) = parsed else {
                state.errors.push((lineno, line));
                continue;
            };

            state.flush(ini);
            let option = options.fold_option(&key);
            let is_new = state.options_seen.insert((section.clone(), option.clone()));
            if options.strict && !is_new {
                return Err(ConfigError::DuplicateOption {
                    section,
                    option,
                    source_name: name.to_string(),
                    line: Some(lineno),
                });
            }
            ini.section_or_insert(&section).insert(option.clone(), raw_value.clone());
            observer.assigned(&section, &option);
            state.pending = Some(PendingValue {
                section,
                option,
                lines: vec![raw_value],
            });
        }
        Ok(())
    }
}

/// Position of the comment in `line`, if it has one.
///
/// A full-line comment starts at 0. An inline comment starts at the earliest
/// inline prefix that begins the line or follows whitespace.
fn comment_start(options: &ParserOptions, line: &str) -> Option<usize> {
    let trimmed = line.trim();
    if options.comment_prefixes.iter().any(|p| trimmed.starts_with(p.as_str())) {
        return Some(0);
    }
    options
        .inline_comment_prefixes
        .iter()
        .filter_map(|prefix| {
            line.match_indices(prefix.as_str())
                .map(|(i, _)| i)
                .find(|&i| i == 0 || line[..i].ends_with(char::is_whitespace))
        })
        .min()
}

/// A value whose continuation lines are still being collected.
#[derive(Debug)]
struct PendingValue {
    section: String,
    option: String,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
struct ReadState {
    section: Option<String>,
    pending: Option<PendingValue>,
    sections_seen: HashSet<String>,
    options_seen: HashSet<(String, String)>,
    errors: Vec<(usize, String)>,
}

impl ReadState {
    /// Stores the joined value of the pending option. Not an assignment: the
    /// option was reported when its key line was read.
    fn flush(&mut self, ini: &mut Ini) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        if pending.lines.len() < 2 {
            return;
        }
        let joined = pending.lines.join("\n");
        if let Some(section) = ini.section_mut(&pending.section) {
            section.insert(pending.option, joined.trim_end().to_string());
        }
    }
}
