//! Parser configuration.

/// Default name of the fallback section.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Folds an option name the way the parser stores it: lower case.
pub fn lowercase_optionxform(option: &str) -> String {
    option.to_lowercase()
}

/// Knobs controlling how sources are parsed and how option names are folded.
///
/// # Examples
///
/// ```rust
/// # use configlines::ini::ParserOptions;
/// let options = ParserOptions::new()
///     .delimiters(&['='])
///     .inline_comment_prefixes(&[";"])
///     .default_section("common");
/// assert_eq!(options.get_default_section(), "common");
/// ```
#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub(crate) delimiters: Vec<char>,
    pub(crate) comment_prefixes: Vec<String>,
    pub(crate) inline_comment_prefixes: Vec<String>,
    pub(crate) strict: bool,
    pub(crate) empty_lines_in_values: bool,
    pub(crate) default_section: String,
    pub(crate) optionxform: fn(&str) -> String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserOptions {
    /// `=` and `:` delimiters, `#` and `;` comments, strict, case-insensitive options.
    pub fn new() -> Self {
        ParserOptions {
            delimiters: vec!['=', ':'],
            comment_prefixes: vec!["#".to_string(), ";".to_string()],
            inline_comment_prefixes: Vec::new(),
            strict: true,
            empty_lines_in_values: true,
            default_section: DEFAULT_SECTION.to_string(),
            optionxform: lowercase_optionxform,
        }
    }

    /// Characters separating an option name from its value.
    pub fn delimiters(mut self, delimiters: &[char]) -> Self {
        self.delimiters = delimiters.to_vec();
        self
    }

    /// Prefixes marking a whole line as a comment.
    pub fn comment_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.comment_prefixes = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Prefixes starting a comment after a value. They must follow whitespace.
    pub fn inline_comment_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.inline_comment_prefixes = prefixes.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Rejects sections and options declared twice in one source.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Keeps blank lines inside multi-line values.
    pub fn empty_lines_in_values(mut self, keep: bool) -> Self {
        self.empty_lines_in_values = keep;
        self
    }

    /// Renames the fallback section.
    pub fn default_section(mut self, name: impl Into<String>) -> Self {
        self.default_section = name.into();
        self
    }

    /// Replaces the option name folding function.
    pub fn optionxform(mut self, optionxform: fn(&str) -> String) -> Self {
        self.optionxform = optionxform;
        self
    }

    /// Name of the fallback section.
    pub fn get_default_section(&self) -> &str {
        &self.default_section
    }

    /// Applies the option name folding function.
    pub fn fold_option(&self, option: &str) -> String {
        (self.optionxform)(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_configparser() {
        let o = ParserOptions::default();
        assert_eq!(o.delimiters, vec!['=', ':']);
        assert_eq!(o.comment_prefixes, vec!["#", ";"]);
        assert!(o.inline_comment_prefixes.is_empty());
        assert!(o.strict);
        assert!(o.empty_lines_in_values);
        assert_eq!(o.get_default_section(), "DEFAULT");
        assert_eq!(o.fold_option("MixedCase"), "mixedcase");
    }

    #[test]
    fn custom_optionxform() {
        let o = ParserOptions::new().optionxform(|s| s.to_string());
        assert_eq!(o.fold_option("MixedCase"), "MixedCase");
    }
}
