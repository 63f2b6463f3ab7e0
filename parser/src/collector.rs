//! Runs a parser's commands through a [`ScanSource`] and returns the cells.

use crate::base_parser::{Parser, Platform, ScanCommand, ScanOutput};
use crate::registry_parser::ParserRegistry;
use crate::{Cell, ScanError};
use tracing::{debug, info};

/// Supplies the captured standard output of a scan command.
///
/// Process spawning lives outside this crate; closures work too, which is
/// handy for replaying saved output.
pub trait ScanSource {
    fn capture(&self, command: &ScanCommand) -> Result<String, ScanError>;
}

impl<F> ScanSource for F
where
    F: Fn(&ScanCommand) -> Result<String, ScanError>,
{
    fn capture(&self, command: &ScanCommand) -> Result<String, ScanError> {
        self(command)
    }
}

/// Collects cells for one platform.
///
/// The parser is fixed when the collector is built, so the platform is never
/// re-checked between calls.
pub struct Collector<S> {
    parser: Box<dyn Parser>,
    source: S,
}

impl<S: ScanSource> Collector<S> {
    pub fn new(parser: Box<dyn Parser>, source: S) -> Self {
        info!("Collector using parser '{}'", parser.name());
        Self { parser, source }
    }

    /// Collector with the default parser for `platform`
    pub fn for_platform(platform: Platform, source: S) -> Result<Self, ScanError> {
        let parser = ParserRegistry::new()
            .into_parser_for_platform(platform)
            .ok_or(ScanError::UnknownFormat)?;
        Ok(Self::new(parser, source))
    }

    /// Collector for the platform this binary was built for
    pub fn current(source: S) -> Result<Self, ScanError> {
        Self::for_platform(Platform::current(), source)
    }

    pub fn parser(&self) -> &dyn Parser {
        self.parser.as_ref()
    }

    /// Every cell visible on `interface`, in the order the tool printed them
    pub fn all(&self, interface: &str) -> Result<Vec<Cell>, ScanError> {
        let scan_command = self.parser.scan_command(interface);
        debug!("Capturing: {}", scan_command);
        let mut output = ScanOutput::new(self.source.capture(&scan_command)?);

        if let Some(status_command) = self.parser.status_command() {
            debug!("Capturing: {}", status_command);
            output.status = Some(self.source.capture(&status_command)?);
        }

        self.parser.parse(&output)
    }

    /// The cells from [`all`](Self::all) for which `predicate` holds, order kept
    pub fn filter<P>(&self, interface: &str, predicate: P) -> Result<Vec<Cell>, ScanError>
    where
        P: Fn(&Cell) -> bool,
    {
        let cells = self.all(interface)?;
        let total = cells.len();
        let matched: Vec<Cell> = cells.into_iter().filter(|cell| predicate(cell)).collect();
        debug!("Filter kept {} of {} cells", matched.len(), total);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AirportParser, EncryptionType, IwlistParser};
    use std::cell::RefCell;

    const IWLIST_DATA: &str = concat!(
        "wlan0     Scan completed :\n",
        "          Cell 01 - Address: 00:11:22:33:44:55\n",
        "                    ESSID:\"HomeNetwork\"\n",
        "                    Quality=70/70  Signal level=-40 dBm  \n",
        "                    Encryption key:on\n",
        "                    IE: IEEE 802.11i/WPA2 Version 1\n",
        "                        Authentication Suites (1) : PSK\n",
        "          Cell 02 - Address: 66:77:88:99:AA:BB\n",
        "                    ESSID:\"CoffeeShop\"\n",
        "                    Quality=42/70  Signal level=-68 dBm  \n",
        "                    Encryption key:off\n",
        "          Cell 03 - Address: CC:DD:EE:FF:00:11\n",
        "                    ESSID:\"Library\"\n",
        "                    Quality=30/70  Signal level=-80 dBm  \n",
        "                    Encryption key:off\n",
    );

    fn iwlist_source(command: &ScanCommand) -> Result<String, ScanError> {
        assert_eq!(command.args, vec!["wlan0", "scan"]);
        Ok(IWLIST_DATA.to_string())
    }

    type CannedSource = fn(&ScanCommand) -> Result<String, ScanError>;

    fn iwlist_collector() -> Collector<CannedSource> {
        Collector::new(Box::new(IwlistParser::new()), iwlist_source as CannedSource)
    }

    #[test]
    fn test_all_linux() {
        let cells = iwlist_collector().all("wlan0").unwrap();
        let ssids: Vec<&str> = cells.iter().map(|c| c.ssid.as_str()).collect();
        assert_eq!(ssids, vec!["HomeNetwork", "CoffeeShop", "Library"]);
        assert_eq!(cells[0].encryption_type, Some(EncryptionType::Wpa2Psk));
    }

    #[test]
    fn test_filter_is_ordered_subsequence() {
        let collector = iwlist_collector();
        let all = collector.all("wlan0").unwrap();

        let open = collector.filter("wlan0", |c| !c.encrypted).unwrap();
        let ssids: Vec<&str> = open.iter().map(|c| c.ssid.as_str()).collect();
        assert_eq!(ssids, vec!["CoffeeShop", "Library"]);

        assert_eq!(collector.filter("wlan0", |_| true).unwrap(), all);
        assert!(collector.filter("wlan0", |_| false).unwrap().is_empty());
    }

    #[test]
    fn test_macos_captures_scan_and_status() {
        let seen = RefCell::new(Vec::new());
        let scan = format!(
            "{:>32} BSSID             RSSI CHANNEL HT CC SECURITY (auth/unicast/group)\n{:>32} {} {:<4} {:<7} Y  US {}\n",
            "SSID", "HomeNetwork", "00:11:22:33:44:55", -52, "6", "WPA2(PSK/AES/AES)"
        );
        let status = "    agrCtlNoise: -90\n        op mode: station\n     lastTxRate: 144\n          BSSID: 00:11:22:33:44:55\n";

        let source = |command: &ScanCommand| -> Result<String, ScanError> {
            seen.borrow_mut().push(command.to_string());
            if command.args == ["-I"] {
                Ok(status.to_string())
            } else {
                Ok(scan.clone())
            }
        };

        let collector = Collector::new(Box::new(AirportParser::with_program("airport")), source);
        let cells = collector.all("en0").unwrap();

        assert_eq!(*seen.borrow(), vec!["airport en0 scan", "airport -I"]);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].bitrates, vec!["144"]);
        assert_eq!(cells[0].mode, "station");
    }

    #[test]
    fn test_source_failure_propagates() {
        let source = |command: &ScanCommand| -> Result<String, ScanError> {
            Err(ScanError::SourceUnavailable {
                command: command.to_string(),
                reason: "No such file or directory".to_string(),
            })
        };
        let collector = Collector::new(Box::new(IwlistParser::new()), source);
        let err = collector.all("wlan0").unwrap_err();
        assert!(matches!(err, ScanError::SourceUnavailable { ref command, .. } if command == "/sbin/iwlist wlan0 scan"));
    }

    #[test]
    fn test_for_platform_selects_parser() {
        let source = |_: &ScanCommand| -> Result<String, ScanError> { Ok(String::new()) };
        let linux = Collector::for_platform(Platform::Linux, source).unwrap();
        assert_eq!(linux.parser().name(), "iwlist");

        let macos = Collector::for_platform(Platform::MacOs, source).unwrap();
        assert_eq!(macos.parser().name(), "airport");
    }
}
