//! PEG grammar for classifying INI lines.
//!
//! The read loop strips comments and surrounding whitespace before a line gets
//! here, so both rules see the bare content of a line.

peg::parser!{pub grammar grammar() for str {

/// The last `]` of the line, followed by anything but another `]`.
rule closing_bracket()
	= "]" (!"]" [_])* ![_]

/// `[name]`. The name runs up to the last `]`; text after it is ignored.
pub rule section_header() -> &'input str
	= "[" h:$((!closing_bracket() [_])+) closing_bracket() { h }

rule delimiter(delimiters: &[char])
	= [c if delimiters.contains(&c)]

/// `key <delimiter> value`, split at the first delimiter. Neither side is trimmed.
pub rule option_line(delimiters: &[char]) -> (&'input str, &'input str)
	= k:$((!delimiter(delimiters) [_])*) delimiter(delimiters) v:$([_]*) { (k, v) }

}}
