//! Central parser registration module
//!
//! When adding a parser for another scan tool, you only need to:
//! 1. Create your parser file (e.g., nmcli_parser.rs)
//! 2. Export it in lib.rs: `pub mod nmcli_parser; pub use nmcli_parser::NmcliParser;`
//! 3. Add it to the `all_parsers()` function below

use crate::base_parser::Parser;
use crate::{AirportParser, IwlistParser};
use tracing::info;

/// Macro to build a parser list without spelling out the boxing
///
/// Usage:
/// ```rust,ignore
/// register_parsers![
///     IwlistParser::with_program("/usr/sbin/iwlist"),
///     AirportParser::new(),
/// ]
/// ```
#[macro_export]
macro_rules! register_parsers {
    ($($parser:expr),* $(,)?) => {
        vec![
            $(Box::new($parser) as Box<dyn $crate::base_parser::Parser>),*
        ]
    };
}

/// Returns a vector of all available parsers, configured with the default
/// tool locations.
pub fn all_parsers() -> Vec<Box<dyn Parser>> {
    info!("Initializing parser collection");

    register_parsers![IwlistParser::new(), AirportParser::new()]
}
