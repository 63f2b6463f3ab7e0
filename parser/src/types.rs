use serde::{Deserialize, Serialize};
use std::fmt;

/// One observed access point.
///
/// A `Cell` is built fresh for every `iwlist` block or `airport` line and is
/// never touched again once its parse pass finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub ssid: String,
    pub address: String,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub quality: Option<Quality>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub channel: Option<u32>,
    pub encrypted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_type: Option<EncryptionType>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub bitrates: Vec<String>,
}

impl Cell {
    pub fn new() -> Self {
        Self {
            ssid: String::new(),
            address: String::new(),
            signal: None,
            quality: None,
            frequency: None,
            channel: None,
            encrypted: false,
            encryption_type: None,
            mode: String::new(),
            bitrates: Vec::new(),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cell(ssid={})", self.ssid)
    }
}

/// Link quality as the scan tool reports it.
///
/// `iwlist` prints a fraction such as `70/70` which is kept verbatim;
/// `airport` only yields a signal-to-noise ratio for the associated network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quality {
    Fraction(String),
    Ratio(f64),
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Fraction(fraction) => write!(f, "{}", fraction),
            Quality::Ratio(ratio) => write!(f, "{:.2}", ratio),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionType {
    #[serde(rename = "wep")]
    Wep,
    #[serde(rename = "wpa")]
    Wpa,
    #[serde(rename = "wpa-eap")]
    WpaEap,
    /// WPA2 advertised without a recognisable key management suite.
    #[serde(rename = "wpa2-?")]
    Wpa2Unknown,
    #[serde(rename = "wpa2-psk")]
    Wpa2Psk,
    #[serde(rename = "wpa2-eap")]
    Wpa2Eap,
}

impl EncryptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionType::Wep => "wep",
            EncryptionType::Wpa => "wpa",
            EncryptionType::WpaEap => "wpa-eap",
            EncryptionType::Wpa2Unknown => "wpa2-?",
            EncryptionType::Wpa2Psk => "wpa2-psk",
            EncryptionType::Wpa2Eap => "wpa2-eap",
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Scan source unavailable for `{command}`: {reason}")]
    SourceUnavailable { command: String, reason: String },
    #[error("Malformed {field} in line: {line:?}")]
    MalformedField { field: &'static str, line: String },
    #[error("Noise floor of 0 for {bssid}, cannot compute quality")]
    DivisionByZero { bssid: String },
    #[error("Missing interface status output")]
    MissingStatus,
    #[error("Unable to detect scan output format")]
    UnknownFormat,
}

impl ScanError {
    pub(crate) fn malformed(field: &'static str, line: impl Into<String>) -> Self {
        ScanError::MalformedField {
            field,
            line: line.into(),
        }
    }
}
