use crate::{Cell, EncryptionType, Quality, ScanError};
use crate::base_parser::{Parser, Platform, ScanCommand, ScanOutput};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

pub const DEFAULT_AIRPORT_PATH: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([\dA-F]{2}(?:[-:][\dA-F]{2}){5})").expect("address pattern is valid")
});

/// Width of the right-aligned SSID column
const SSID_COLUMNS: usize = 32;

/// airport parser - handles `airport <interface> scan` output plus the
/// `airport -I` status of the current interface (macOS)
pub struct AirportParser {
    program: String,
}

impl AirportParser {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_AIRPORT_PATH)
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for AirportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for AirportParser {
    fn name(&self) -> &'static str {
        "airport"
    }

    fn platform(&self) -> Platform {
        Platform::MacOs
    }

    fn can_parse(&self, scan: &str) -> bool {
        scan.lines()
            .next()
            .map_or(false, |header| header.contains("SSID BSSID"))
    }

    fn scan_command(&self, interface: &str) -> ScanCommand {
        ScanCommand::new(self.program.as_str(), [interface, "scan"])
    }

    fn status_command(&self) -> Option<ScanCommand> {
        Some(ScanCommand::new(self.program.as_str(), ["-I"]))
    }

    fn parse(&self, output: &ScanOutput) -> Result<Vec<Cell>, ScanError> {
        let status = output.status.as_deref().ok_or(ScanError::MissingStatus)?;
        parse_airport_output(&output.scan, status)
    }
}

/// Parse `airport scan` output against the `airport -I` status blob.
///
/// Only the line whose BSSID matches the associated network gets a bitrate,
/// quality ratio and mode.
pub fn parse_airport_output(scan: &str, status: &str) -> Result<Vec<Cell>, ScanError> {
    info!("Starting airport parsing ({} bytes)", scan.len());

    let current_address = current_address(status)?;
    debug!("Associated BSSID: {}", current_address);

    let mut cells = Vec::new();
    for line in scan.split('\n').skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        cells.push(parse_line(line, current_address, status)?);
    }

    info!("airport parsing complete: {} cells parsed", cells.len());
    Ok(cells)
}

fn current_address(status: &str) -> Result<&str, ScanError> {
    ADDRESS_RE
        .find(status)
        .map(|m| m.as_str())
        .ok_or_else(|| {
            warn!("No BSSID found in interface status");
            ScanError::malformed("address", status.trim())
        })
}

fn parse_line(line: &str, current_address: &str, status: &str) -> Result<Cell, ScanError> {
    let split_at = line
        .char_indices()
        .nth(SSID_COLUMNS)
        .map_or(line.len(), |(idx, _)| idx);
    let (ssid, rest) = line.split_at(split_at);

    // Columns are space padded, so empty tokens keep each field at a fixed index
    let tokens: Vec<&str> = rest.trim().split(' ').collect();

    let bssid = tokens.first().copied().unwrap_or_default();
    let signal: i32 = tokens
        .get(1)
        .and_then(|t| t.trim().parse().ok())
        .ok_or_else(|| ScanError::malformed("signal", line))?;
    let channel: u32 = tokens
        .get(3)
        .and_then(|t| t.trim().split(',').next())
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| ScanError::malformed("channel", line))?;
    let security = tokens.last().copied().unwrap_or_default();

    let mut cell = Cell::new();
    cell.ssid = ssid.trim().to_string();
    cell.address = bssid.to_string();
    cell.signal = Some(signal);
    cell.channel = Some(channel);
    cell.quality = Some(Quality::Ratio(0.0));

    if security != "NONE" {
        cell.encrypted = true;
        cell.encryption_type = security_encryption(security);
    }

    if bssid == current_address {
        let rate: i64 = status_value(status, "lastTxRate")?
            .parse()
            .map_err(|_| ScanError::malformed("lastTxRate", status_line(status, "lastTxRate")))?;
        let noise: i32 = status_value(status, "agrCtlNoise")?
            .parse()
            .map_err(|_| ScanError::malformed("agrCtlNoise", status_line(status, "agrCtlNoise")))?;
        if noise == 0 {
            return Err(ScanError::DivisionByZero {
                bssid: bssid.to_string(),
            });
        }

        cell.bitrates.push(rate.to_string());
        cell.quality = Some(Quality::Ratio(f64::from(signal) / f64::from(noise)));
        cell.mode = status_value(status, "op mode")?.to_string();
        debug!("{} is the associated network", cell);
    }

    Ok(cell)
}

fn security_encryption(security: &str) -> Option<EncryptionType> {
    if security.contains("PSK") {
        Some(EncryptionType::Wpa2Psk)
    } else if security.contains("WPA2") {
        Some(EncryptionType::Wpa2Unknown)
    } else if security.contains("802.1x") {
        Some(EncryptionType::WpaEap)
    } else if security.contains("WPA") {
        Some(EncryptionType::Wpa)
    } else if security.contains("WEP") {
        Some(EncryptionType::Wep)
    } else {
        None
    }
}

/// Text following `<label>: ` up to the end of that line, trimmed.
fn status_value<'a>(status: &'a str, label: &'static str) -> Result<&'a str, ScanError> {
    let marker = format!("{}: ", label);
    status
        .split_once(marker.as_str())
        .map(|(_, rest)| rest.split('\n').next().unwrap_or("").trim())
        .ok_or_else(|| ScanError::malformed(label, status.trim()))
}

fn status_line<'a>(status: &'a str, label: &str) -> &'a str {
    status
        .lines()
        .find(|line| line.contains(label))
        .map_or("", str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_line(ssid: &str, bssid: &str, rssi: i32, channel: &str, security: &str) -> String {
        format!(
            "{:>32} {} {:<4} {:<7} Y  US {}",
            ssid, bssid, rssi, channel, security
        )
    }

    fn sample_scan() -> String {
        [
            "                            SSID BSSID             RSSI CHANNEL HT CC SECURITY (auth/unicast/group)".to_string(),
            scan_line("HomeNetwork", "00:11:22:33:44:55", -52, "6", "WPA2(PSK/AES/AES)"),
            scan_line("CoffeeShop", "66:77:88:99:aa:bb", -71, "11", "NONE"),
            scan_line("Corp", "cc:dd:ee:ff:00:11", -60, "149,+1", "WPA2(802.1x/AES/AES)"),
            scan_line("OldRouter", "22:33:44:55:66:77", -80, "1", "WEP"),
            String::new(),
        ]
        .join("\n")
    }

    const SAMPLE_STATUS: &str = concat!(
        "     agrCtlRSSI: -52\n",
        "     agrExtRSSI: 0\n",
        "    agrCtlNoise: -90\n",
        "    agrExtNoise: 0\n",
        "          state: running\n",
        "        op mode: station \n",
        "     lastTxRate: 144\n",
        "        maxRate: 144\n",
        "lastAssocStatus: 0\n",
        "    802.11 auth: open\n",
        "      link auth: wpa2-psk\n",
        "          BSSID: 00:11:22:33:44:55\n",
        "           SSID: HomeNetwork\n",
        "            MCS: 15\n",
        "        channel: 6\n",
    );

    #[test]
    fn test_parse_scan_lines() {
        let cells = parse_airport_output(&sample_scan(), SAMPLE_STATUS).unwrap();
        assert_eq!(cells.len(), 4);

        let home = &cells[0];
        assert_eq!(home.ssid, "HomeNetwork");
        assert_eq!(home.address, "00:11:22:33:44:55");
        assert_eq!(home.signal, Some(-52));
        assert_eq!(home.channel, Some(6));
        assert!(home.encrypted);
        assert_eq!(home.encryption_type, Some(EncryptionType::Wpa2Psk));
        assert_eq!(home.frequency, None);

        let coffee = &cells[1];
        assert!(!coffee.encrypted);
        assert_eq!(coffee.encryption_type, None);
        assert_eq!(coffee.channel, Some(11));

        let corp = &cells[2];
        assert_eq!(corp.channel, Some(149));
        assert_eq!(corp.encryption_type, Some(EncryptionType::Wpa2Unknown));

        assert_eq!(cells[3].encryption_type, Some(EncryptionType::Wep));
    }

    #[test]
    fn test_associated_network_gets_status_fields() {
        let cells = parse_airport_output(&sample_scan(), SAMPLE_STATUS).unwrap();

        let home = &cells[0];
        assert_eq!(home.bitrates, vec!["144"]);
        assert_eq!(home.mode, "station");
        match home.quality {
            Some(Quality::Ratio(ratio)) => assert!((ratio - (-52.0 / -90.0)).abs() < 1e-9),
            ref other => panic!("unexpected quality {:?}", other),
        }

        let coffee = &cells[1];
        assert!(coffee.bitrates.is_empty());
        assert_eq!(coffee.mode, "");
        assert_eq!(coffee.quality, Some(Quality::Ratio(0.0)));
    }

    #[test]
    fn test_zero_noise_is_division_error() {
        let status = SAMPLE_STATUS.replace("agrCtlNoise: -90", "agrCtlNoise: 0");
        let err = parse_airport_output(&sample_scan(), &status).unwrap_err();
        assert!(matches!(err, ScanError::DivisionByZero { ref bssid } if bssid == "00:11:22:33:44:55"));
    }

    #[test]
    fn test_status_without_address_fails() {
        let err = parse_airport_output(&sample_scan(), "AirPort: Off\n").unwrap_err();
        assert!(matches!(err, ScanError::MalformedField { field: "address", .. }));
    }

    #[test]
    fn test_associated_status_missing_rate() {
        let status = SAMPLE_STATUS.replace("     lastTxRate: 144\n", "");
        let err = parse_airport_output(&sample_scan(), &status).unwrap_err();
        assert!(matches!(err, ScanError::MalformedField { field: "lastTxRate", .. }));
    }

    #[test]
    fn test_associated_status_non_numeric_noise() {
        let status = SAMPLE_STATUS.replace("agrCtlNoise: -90", "agrCtlNoise: abc");
        let err = parse_airport_output(&sample_scan(), &status).unwrap_err();
        assert!(matches!(err, ScanError::MalformedField { field: "agrCtlNoise", ref line } if line.contains("abc")));
    }

    #[test]
    fn test_associated_status_missing_mode() {
        let status = SAMPLE_STATUS.replace("        op mode: station \n", "");
        let err = parse_airport_output(&sample_scan(), &status).unwrap_err();
        assert!(matches!(err, ScanError::MalformedField { field: "op mode", .. }));
    }

    #[test]
    fn test_hyphenated_bssid_matches_associated_network() {
        let scan = format!(
            "header\n{}\n{}\n",
            scan_line("HomeNetwork", "00-11-22-33-44-55", -52, "6", "WPA2(PSK/AES/AES)"),
            scan_line("CoffeeShop", "66-77-88-99-aa-bb", -71, "11", "NONE"),
        );
        let status = SAMPLE_STATUS.replace("BSSID: 00:11:22:33:44:55", "BSSID: 00-11-22-33-44-55");
        let cells = parse_airport_output(&scan, &status).unwrap();

        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].address, "00-11-22-33-44-55");
        assert_eq!(cells[0].bitrates, vec!["144"]);
        assert_eq!(cells[0].mode, "station");
        assert!(cells[1].bitrates.is_empty());
    }

    #[test]
    fn test_non_numeric_signal_fails() {
        let scan = format!(
            "header\n{}",
            scan_line("Broken", "00:11:22:33:44:56", 0, "6", "NONE").replace(" 0    ", " abc  ")
        );
        let err = parse_airport_output(&scan, SAMPLE_STATUS).unwrap_err();
        assert!(matches!(err, ScanError::MalformedField { field: "signal", .. }));
    }

    #[test]
    fn test_security_priority() {
        assert_eq!(security_encryption("WPA(PSK/TKIP/TKIP)"), Some(EncryptionType::Wpa2Psk));
        assert_eq!(security_encryption("WPA2(802.1x/AES/AES)"), Some(EncryptionType::Wpa2Unknown));
        assert_eq!(security_encryption("WPA(802.1x/TKIP/TKIP)"), Some(EncryptionType::WpaEap));
        assert_eq!(security_encryption("WPA(TKIP)"), Some(EncryptionType::Wpa));
        assert_eq!(security_encryption("WEP"), Some(EncryptionType::Wep));
        assert_eq!(security_encryption("OPEN"), None);
    }

    #[test]
    fn test_header_only_scan() {
        let scan = "                            SSID BSSID             RSSI CHANNEL HT CC SECURITY (auth/unicast/group)\n";
        assert!(parse_airport_output(scan, SAMPLE_STATUS).unwrap().is_empty());
    }

    #[test]
    fn test_parser_requires_status() {
        let parser = AirportParser::new();
        let err = parser.parse(&ScanOutput::new(sample_scan())).unwrap_err();
        assert!(matches!(err, ScanError::MissingStatus));

        let cells = parser
            .parse(&ScanOutput::new(sample_scan()).with_status(SAMPLE_STATUS))
            .unwrap();
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn test_parser_commands() {
        let parser = AirportParser::with_program("airport");
        assert_eq!(parser.scan_command("en0").to_string(), "airport en0 scan");
        assert_eq!(parser.status_command().unwrap().to_string(), "airport -I");
        assert!(parser.can_parse(&sample_scan()));
    }
}
