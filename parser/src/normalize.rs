//! Key and value normalization for `iwlist` key/value lines.
//!
//! Raw keys are mapped onto a fixed set of [`Field`]s. Keys outside that set
//! are dropped by the caller, so drivers that print extra fields don't break
//! parsing.

use crate::{Cell, ScanError};
use once_cell::sync::Lazy;
use regex::Regex;

static FREQUENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\d.]+ .[Hh]z)").expect("frequency pattern is valid"));

const KEY_TRANSLATIONS: &[(&str, &str)] = &[("encryption key", "encrypted"), ("essid", "ssid")];

/// Cell fields that have a value coercion rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Ssid,
    Frequency,
    Encrypted,
    Channel,
    Address,
    Mode,
}

impl Field {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ssid" => Some(Field::Ssid),
            "frequency" => Some(Field::Frequency),
            "encrypted" => Some(Field::Encrypted),
            "channel" => Some(Field::Channel),
            "address" => Some(Field::Address),
            "mode" => Some(Field::Mode),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Field::Ssid => "ssid",
            Field::Frequency => "frequency",
            Field::Encrypted => "encrypted",
            Field::Channel => "channel",
            Field::Address => "address",
            Field::Mode => "mode",
        }
    }

    /// Coerce `value` and store it on `cell`.
    ///
    /// `line` is only used to describe a failure.
    pub fn apply(&self, cell: &mut Cell, value: &str, line: &str) -> Result<(), ScanError> {
        match self {
            Field::Ssid => cell.ssid = strip_quotes(value).to_string(),
            Field::Frequency => {
                let captures = FREQUENCY_RE
                    .captures(value)
                    .ok_or_else(|| ScanError::malformed(self.name(), line))?;
                cell.frequency = Some(captures[1].to_string());
            }
            Field::Encrypted => cell.encrypted = value == "on",
            Field::Channel => {
                let channel = value
                    .parse()
                    .map_err(|_| ScanError::malformed(self.name(), line))?;
                cell.channel = Some(channel);
            }
            Field::Address => cell.address = value.to_string(),
            Field::Mode => cell.mode = value.to_string(),
        }
        Ok(())
    }
}

/// Lowercase, trim, translate aliases, then drop internal spaces.
pub fn normalize_key(key: &str) -> String {
    let key = key.trim().to_lowercase();
    let key = KEY_TRANSLATIONS
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(key);

    key.replace(' ', "")
}

/// Split at the first colon, trimming both halves.
pub fn split_on_colon(line: &str) -> (&str, &str) {
    match line.split_once(':') {
        Some((key, value)) => (key.trim(), value.trim()),
        None => (line.trim(), ""),
    }
}

/// Removes one `"` from each end, leaving quotes inside the name alone.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}
