use chrono::{DateTime, Utc};
use serde::Serialize;
use wifi_parser::Cell;

/// JSON envelope printed with `--format json`
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub interface: &'a str,
    pub scanned_at: DateTime<Utc>,
    pub count: usize,
    pub cells: &'a [Cell],
}

impl<'a> ScanReport<'a> {
    pub fn new(interface: &'a str, cells: &'a [Cell]) -> Self {
        Self {
            interface,
            scanned_at: Utc::now(),
            count: cells.len(),
            cells,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn render_table(cells: &[Cell]) -> String {
    let ssid_width = cells
        .iter()
        .map(|c| c.ssid.chars().count())
        .max()
        .unwrap_or(0)
        .max("SSID".len());

    let mut out = format!(
        "{:<ssid_width$}  {:<17}  {:>4}  {:>6}  {:>7}  {}\n",
        "SSID", "BSSID", "CH", "SIGNAL", "QUALITY", "SECURITY"
    );

    for cell in cells {
        let channel = cell.channel.map(|c| c.to_string()).unwrap_or_default();
        let signal = cell.signal.map(|s| s.to_string()).unwrap_or_default();
        let quality = cell.quality.as_ref().map(|q| q.to_string()).unwrap_or_default();
        let security = match (cell.encrypted, cell.encryption_type) {
            (false, _) => "open".to_string(),
            (true, Some(kind)) => kind.to_string(),
            (true, None) => "encrypted".to_string(),
        };

        out.push_str(&format!(
            "{:<ssid_width$}  {:<17}  {:>4}  {:>6}  {:>7}  {}\n",
            cell.ssid, cell.address, channel, signal, quality, security
        ));
    }

    out
}
