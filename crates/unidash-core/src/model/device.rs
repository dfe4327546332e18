// ── Device domain type ──

use serde::{Deserialize, Serialize};

use super::mac::MacAddress;

/// A managed network device as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub mac: MacAddress,
    pub name: Option<String>,
    /// Internal id of the owning site.
    pub site: String,
    pub model: Option<String>,
    pub board_revision: Option<i64>,
}

impl Device {
    /// The device name, or its MAC when the controller has none.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.mac.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_device_displays_mac() {
        let d = Device {
            mac: MacAddress::new("aabbccddeeff"),
            name: Some("  ".into()),
            site: "default".into(),
            model: None,
            board_revision: None,
        };
        assert_eq!(d.display_name(), "aa:bb:cc:dd:ee:ff");
    }
}
