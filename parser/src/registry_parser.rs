use crate::{Cell, ScanError, base_parser::{Parser, FormatHint, Platform, ScanOutput, detect_format}};
use crate::parsers::all_parsers;
use tracing::{debug, info, warn, error};

/// ParserRegistry - manages available parsers and detects the scan format
///
/// ## Adding a New Parser
///
/// To add a new parser, you only need to modify `parsers.rs`. No changes to this file are required!
pub struct ParserRegistry {
    parsers: Vec<Box<dyn Parser>>,
}

impl ParserRegistry {
    /// Create a new registry with all parsers from the central registry
    pub fn new() -> Self {
        info!("Initializing ParserRegistry");
        let parsers = all_parsers();

        info!("Registered {} parsers: {}",
            parsers.len(),
            parsers.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        );

        Self { parsers }
    }

    /// Register a custom parser
    ///
    /// A parser registered under an existing name replaces it, so callers can
    /// swap in one pointing at a different tool location.
    pub fn register(&mut self, parser: Box<dyn Parser>) {
        info!("Registering custom parser: {}", parser.name());
        debug!("Parser handles platform: {}", parser.platform());
        self.parsers.retain(|p| p.name() != parser.name());
        self.parsers.push(parser);
    }

    /// Get parser by name
    pub fn get_parser(&self, name: &str) -> Option<&dyn Parser> {
        debug!("Looking up parser by name: {}", name);
        let result = self.parsers.iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref());

        if result.is_some() {
            debug!("Found parser: {}", name);
        } else {
            warn!("Parser not found: {}", name);
        }

        result
    }

    /// Get the parser for the scan tool of a platform
    pub fn get_parser_for_platform(&self, platform: Platform) -> Option<&dyn Parser> {
        debug!("Looking up parser for platform: {}", platform);
        let result = self.parsers.iter()
            .find(|p| p.platform() == platform)
            .map(|p| p.as_ref());

        if let Some(parser) = result {
            info!("Selected parser '{}' for platform '{}'", parser.name(), platform);
        } else {
            warn!("No parser found for platform '{}'", platform);
        }

        result
    }

    /// Take the parser for `platform` out of the registry
    pub fn into_parser_for_platform(self, platform: Platform) -> Option<Box<dyn Parser>> {
        self.parsers.into_iter().find(|p| p.platform() == platform)
    }

    /// Auto-detect and parse captured scan output
    pub fn parse_auto(&self, output: &ScanOutput) -> Result<Vec<Cell>, ScanError> {
        info!("Starting auto-detection of scan format");

        let format = detect_format(&output.scan);
        info!("Format hint from content analysis: {:?}", format);

        let parser = match format {
            FormatHint::Iwlist => {
                info!("Using iwlist parser based on format hint");
                self.get_parser("iwlist")
            },
            FormatHint::Airport => {
                info!("Using airport parser based on format hint");
                self.get_parser("airport")
            },
            FormatHint::Unknown => {
                warn!("Format unknown, trying parsers individually");
                self.parsers.iter()
                    .find(|p| {
                        let can_parse = p.can_parse(&output.scan);
                        debug!("Parser '{}' can_parse result: {}", p.name(), can_parse);
                        can_parse
                    })
                    .map(|p| p.as_ref())
            }
        };

        if let Some(parser) = parser {
            info!("Selected parser: {}", parser.name());
            parser.parse(output)
        } else if output.scan.trim().is_empty() {
            info!("Scan output is empty, no cells");
            Ok(Vec::new())
        } else {
            error!("Unable to detect format - no suitable parser found");
            Err(ScanError::UnknownFormat)
        }
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
