// ── API-to-domain type conversions ──
//
// Bridges raw `unidash_api` response types into `unidash_core::model`
// domain types. MACs are normalized here, once, so the search never
// compares controller spellings directly.

use unidash_api::legacy::models::{LegacyDevice, LegacySite};

use crate::model::{Device, MacAddress, Site};

// ── Site ───────────────────────────────────────────────────────────

impl From<LegacySite> for Site {
    fn from(s: LegacySite) -> Self {
        // `desc` is the human-friendly label; `name` is the internal slug (e.g. "default").
        let description = s
            .desc
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| s.name.clone());

        Site {
            id: s.name,
            description,
        }
    }
}

// ── Device ─────────────────────────────────────────────────────────

impl Device {
    /// Convert a `stat/device` entry fetched from `site` (internal name).
    pub fn from_legacy(d: LegacyDevice, site: &str) -> Self {
        Device {
            mac: MacAddress::new(&d.mac),
            name: d.name.filter(|n| !n.is_empty()),
            site: site.to_owned(),
            model: d.model,
            board_revision: d.board_rev,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn legacy_site(name: &str, desc: Option<&str>) -> LegacySite {
        LegacySite {
            id: "abc123".into(),
            name: name.into(),
            desc: desc.map(String::from),
            role: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn legacy_site_uses_desc_as_description() {
        let converted: Site = legacy_site("default", Some("Main Office")).into();
        assert_eq!(converted.id, "default");
        assert_eq!(converted.description, "Main Office");
    }

    #[test]
    fn legacy_site_falls_back_to_name_when_desc_empty() {
        let converted: Site = legacy_site("branch-1", Some("")).into();
        assert_eq!(converted.description, "branch-1");
    }

    #[test]
    fn legacy_device_mac_is_canonical() {
        let raw: LegacyDevice = serde_json::from_value(serde_json::json!({
            "mac": "AA-BB-CC-DD-EE-FF",
            "name": "",
            "board_rev": 17,
        }))
        .unwrap();
        let device = Device::from_legacy(raw, "default");
        assert_eq!(device.mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(device.name, None);
        assert_eq!(device.board_revision, Some(17));
        assert_eq!(device.site, "default");
    }
}
