//! INI configuration parser that remembers where every value came from.
//!
//! Reading a file records, for each option, the source name and the line its
//! key appeared on. The record follows the value through later changes: a
//! later file overriding the option moves it, a programmatic [`TrackingParser::set`]
//! erases, preserves or replaces it as requested, and removing options or
//! sections drops it. Options inherited from the defaults section report the
//! defaults' location.
//!
//! Parsing follows Python's `RawConfigParser`: values are returned as read,
//! with no interpolation of `%(name)s` or `${name}` references.
//!
//! ```rust
//! use configlines::{TrackingParser, LocationPolicy};
//!
//! let mut cfg = TrackingParser::new();
//! cfg.read_string("[DEFAULT]\ntimeout = 30\n[db]\nhost = localhost\n", "app.ini").unwrap();
//!
//! assert_eq!(cfg.get_line("db", "host").unwrap(), Some(4));
//! // inherited from [DEFAULT]
//! assert_eq!(cfg.get_line("db", "timeout").unwrap(), Some(2));
//!
//! cfg.set("db", "host", "db.internal", "override.ini:7".parse::<LocationPolicy>().unwrap()).unwrap();
//! assert_eq!(cfg.get_location("db", "host").unwrap().unwrap().to_string(), "override.ini:7");
//! ```

#![warn(missing_docs)]

pub mod errors;
pub mod ini;
pub mod parser;
mod serde_impl;
mod tracking;
pub mod util;

pub use errors::{ConfigError, ConfigResult};
pub use ini::{Location, LocationPolicy};
pub use tracking::{SectionMut, TrackingParser};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
