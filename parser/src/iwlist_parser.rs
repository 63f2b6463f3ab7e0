use crate::normalize::{normalize_key, split_on_colon, Field};
use crate::{Cell, EncryptionType, Quality, ScanError};
use crate::base_parser::{Parser, Platform, ScanCommand, ScanOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info};

pub const DEFAULT_IWLIST_PATH: &str = "/sbin/iwlist";

static CELL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Cell \d+ - ").expect("cell pattern is valid"));
static QUALITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Quality=(\d+/\d+).*Signal level=(-\d+) dBm").expect("quality pattern is valid")
});

/// iwlist aligns every line after the first in a cell to this column
const BLOCK_MARGIN: usize = 20;
const BITRATE_CONTINUATION: &str = "          ";
const IE_CONTINUATION: &str = "    ";

/// iwlist parser - handles `iwlist <interface> scan` output (Linux)
pub struct IwlistParser {
    program: String,
}

impl IwlistParser {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_IWLIST_PATH)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for IwlistParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for IwlistParser {
    fn name(&self) -> &'static str {
        "iwlist"
    }

    fn platform(&self) -> Platform {
        Platform::Linux
    }

    fn can_parse(&self, scan: &str) -> bool {
        has_cell_delimiter(scan)
    }

    fn scan_command(&self, interface: &str) -> ScanCommand {
        ScanCommand::new(self.program.as_str(), [interface, "scan"])
    }

    fn parse(&self, output: &ScanOutput) -> Result<Vec<Cell>, ScanError> {
        parse_iwlist_output(&output.scan)
    }
}

pub(crate) fn has_cell_delimiter(text: &str) -> bool {
    CELL_RE.is_match(text)
}

/// Split raw iwlist output into per-cell blocks, dropping the header line.
///
/// Text with no `Cell NN - ` delimiter yields no blocks.
pub fn split_cells(text: &str) -> impl Iterator<Item = &str> {
    CELL_RE.split(text).skip(1)
}

pub fn parse_iwlist_output(text: &str) -> Result<Vec<Cell>, ScanError> {
    info!("Starting iwlist parsing ({} bytes)", text.len());

    let cells = split_cells(text)
        .enumerate()
        .map(|(idx, block)| {
            normalize_cell(block).map_err(|e| {
                error!("Failed to parse cell {}: {}", idx + 1, e);
                e
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("iwlist parsing complete: {} cells parsed", cells.len());
    Ok(cells)
}

/// One line of a dedented cell block
#[derive(Debug, PartialEq)]
enum Line<'a> {
    Quality,
    BitRates(&'a str),
    KeyValue { key: String, value: &'a str },
    Skip,
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with("Quality") {
        Line::Quality
    } else if line.starts_with("Bit Rates") {
        Line::BitRates(split_on_colon(line).1)
    } else if line.contains(':') {
        let (key, value) = split_on_colon(line);
        Line::KeyValue {
            key: normalize_key(key),
            value,
        }
    } else {
        Line::Skip
    }
}

/// Turn one cell block (the text following `Cell NN - `) into a [`Cell`].
pub fn normalize_cell(block: &str) -> Result<Cell, ScanError> {
    let dedented = dedent(block);
    let mut lines = dedented.iter().map(String::as_str).peekable();
    let mut cell = Cell::new();

    while let Some(line) = lines.next() {
        match classify(line) {
            Line::Quality => {
                let captures = QUALITY_RE
                    .captures(line)
                    .ok_or_else(|| ScanError::malformed("quality", line))?;
                let signal = captures[2]
                    .parse()
                    .map_err(|_| ScanError::malformed("signal", line))?;
                cell.quality = Some(Quality::Fraction(captures[1].to_string()));
                cell.signal = Some(signal);
            }
            Line::BitRates(value) => {
                let mut values: Vec<String> = value.split("; ").map(str::to_string).collect();

                // rates wrap onto further lines indented past the field column
                while let Some(next) = lines.next_if(|l| l.starts_with(BITRATE_CONTINUATION)) {
                    values.extend(next.trim().split("; ").map(str::to_string));
                }

                cell.bitrates.extend(values);
            }
            Line::KeyValue { key, value } if key == "ie" => {
                if value.contains("Unknown") {
                    debug!("Skipping unknown IE: {}", value);
                    continue;
                }

                let mut group = vec![value];
                while let Some(next) = lines.next_if(|l| l.starts_with(IE_CONTINUATION)) {
                    group.push(next.trim());
                }

                for entry in group {
                    if let Some(kind) = ie_encryption(entry) {
                        cell.encryption_type = Some(kind);
                    }
                }
            }
            Line::KeyValue { key, value } => match Field::from_key(&key) {
                Some(field) => field.apply(&mut cell, value, line)?,
                None => debug!("Ignoring key without a rule: {}", key),
            },
            Line::Skip => {}
        }
    }

    Ok(finish(cell))
}

fn ie_encryption(entry: &str) -> Option<EncryptionType> {
    if entry.contains("802.1x") {
        Some(EncryptionType::Wpa2Eap)
    } else if entry.contains("PSK") {
        Some(EncryptionType::Wpa2Psk)
    } else if entry.contains("WPA2") {
        Some(EncryptionType::Wpa2Unknown)
    } else {
        None
    }
}

/// Keep `encryption_type` in step with `encrypted`. Encrypted cells that
/// advertise no WPA information element are WEP.
fn finish(mut cell: Cell) -> Cell {
    if !cell.encrypted {
        cell.encryption_type = None;
    } else if cell.encryption_type.is_none() {
        cell.encryption_type = Some(EncryptionType::Wep);
    }
    debug!("Parsed {} ({})", cell, cell.address);
    cell
}

/// Re-indent the first line to the block margin and strip the common
/// leading whitespace. Whitespace-only lines become empty.
fn dedent(block: &str) -> Vec<String> {
    let padded = format!("{}{}", " ".repeat(BLOCK_MARGIN), block);
    let indent = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();

    let margin = padded
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(indent)
        .min()
        .unwrap_or(0);

    padded
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                line[margin..].to_string()
            }
        })
        .collect()
}
