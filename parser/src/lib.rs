// Parser crate for Wi-Fi scan tool output
// One parser per scan tool, selected through the registry or per platform

pub mod types;
pub mod base_parser;
pub mod registry_parser;
pub mod normalize;
pub mod collector;

// Individual parser implementations
pub mod iwlist_parser;
pub mod airport_parser;

mod parsers;

// Re-export main types
pub use types::*;
pub use base_parser::{Parser, FormatHint, Platform, ScanCommand, ScanOutput, detect_format};
pub use registry_parser::ParserRegistry;
pub use collector::{Collector, ScanSource};
pub use parsers::all_parsers;

// Re-export parsers
pub use iwlist_parser::IwlistParser;
pub use airport_parser::AirportParser;
