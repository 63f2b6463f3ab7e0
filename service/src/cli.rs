use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use wifi_parser::airport_parser::DEFAULT_AIRPORT_PATH;
use wifi_parser::iwlist_parser::DEFAULT_IWLIST_PATH;
use wifi_parser::{AirportParser, Cell, IwlistParser, Platform};

/// List nearby Wi-Fi access points
#[derive(Parser, Debug)]
#[command(name = "wifi-scan")]
#[command(version, about = "List nearby Wi-Fi access points from iwlist or airport output")]
pub struct Args {
    /// Wireless interface to scan
    #[arg(short, long, env = "WIFI_SCAN_INTERFACE", default_value = "wlan0")]
    pub interface: String,

    /// Scan tool format to use (defaults to the current platform)
    #[arg(long, value_enum)]
    pub platform: Option<PlatformArg>,

    /// Location of the iwlist binary
    #[arg(long, env = "WIFI_SCAN_IWLIST", default_value = DEFAULT_IWLIST_PATH)]
    pub iwlist_path: String,

    /// Location of the airport binary
    #[arg(long, env = "WIFI_SCAN_AIRPORT", default_value = DEFAULT_AIRPORT_PATH)]
    pub airport_path: String,

    /// Parse saved scan output instead of running the scan tool
    #[arg(long)]
    pub scan_file: Option<PathBuf>,

    /// Saved `airport -I` output to go with --scan-file
    #[arg(long, requires = "scan_file")]
    pub status_file: Option<PathBuf>,

    /// Only show networks with this SSID
    #[arg(long)]
    pub ssid: Option<String>,

    /// Only show encrypted networks
    #[arg(long, conflicts_with = "open")]
    pub encrypted: bool,

    /// Only show open networks
    #[arg(long)]
    pub open: bool,

    /// Only show networks with a signal level of at least this many dBm
    #[arg(long, allow_negative_numbers = true)]
    pub min_signal: Option<i32>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformArg {
    Linux,
    Macos,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Linux => Platform::Linux,
            PlatformArg::Macos => Platform::MacOs,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl Args {
    pub fn platform(&self) -> Platform {
        self.platform.map_or_else(Platform::current, Platform::from)
    }

    /// Parser for the selected platform, pointed at the configured tool
    pub fn parser(&self) -> Box<dyn wifi_parser::Parser> {
        match self.platform() {
            Platform::Linux => Box::new(IwlistParser::with_program(self.iwlist_path.as_str())),
            Platform::MacOs => Box::new(AirportParser::with_program(self.airport_path.as_str())),
        }
    }

    /// Whether `cell` passes every filter flag
    pub fn matches(&self, cell: &Cell) -> bool {
        if let Some(ssid) = &self.ssid {
            if &cell.ssid != ssid {
                return false;
            }
        }
        if self.encrypted && !cell.encrypted {
            return false;
        }
        if self.open && cell.encrypted {
            return false;
        }
        if let Some(min) = self.min_signal {
            return cell.signal.map_or(false, |signal| signal >= min);
        }
        true
    }
}
