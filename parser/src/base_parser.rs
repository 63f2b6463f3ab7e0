use crate::{Cell, ScanError};
use std::fmt;

/// Base trait that every scan output parser implements.
///
/// A parser knows which commands produce its input and how to turn their
/// captured text into cells. Running the commands is left to a
/// [`ScanSource`](crate::ScanSource).
pub trait Parser: Send + Sync {
    /// Returns the name of this parser (e.g., "iwlist", "airport")
    fn name(&self) -> &'static str;

    /// The platform whose scan tool produces this format
    fn platform(&self) -> Platform;

    /// Checks if this parser can handle the given scan text by inspecting content
    fn can_parse(&self, scan: &str) -> bool;

    /// Command that lists the access points visible on `interface`
    fn scan_command(&self, interface: &str) -> ScanCommand;

    /// Command describing the currently associated network, if the format needs one
    fn status_command(&self) -> Option<ScanCommand> {
        None
    }

    fn parse(&self, output: &ScanOutput) -> Result<Vec<Cell>, ScanError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
}

impl Platform {
    /// The platform this binary was compiled for. Anything that isn't macOS
    /// is treated as Linux, since `iwlist` is the only other supported tool.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Linux => f.write_str("linux"),
            Platform::MacOs => f.write_str("macos"),
        }
    }
}

/// An external program invocation whose standard output is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ScanCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ScanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured text handed to [`Parser::parse`]
#[derive(Debug, Clone, Default)]
pub struct ScanOutput {
    pub scan: String,
    pub status: Option<String>,
}

impl ScanOutput {
    pub fn new(scan: impl Into<String>) -> Self {
        Self {
            scan: scan.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// Helper to detect format from content
pub fn detect_format(scan: &str) -> FormatHint {
    if crate::iwlist_parser::has_cell_delimiter(scan) {
        return FormatHint::Iwlist;
    }

    // airport prints a right-aligned column header as its first line
    let header = scan.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    if header.contains("SSID BSSID") {
        return FormatHint::Airport;
    }

    FormatHint::Unknown
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Iwlist,
    Airport,
    Unknown,
}
