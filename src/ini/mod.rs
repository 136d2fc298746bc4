//! Configuration data: values, sections, locations and parser options.

mod key_map;
mod options;
mod ini_data_structure;
mod location;

pub use self::key_map::*;
pub use self::options::*;
pub use self::ini_data_structure::*;
pub use self::location::*;
