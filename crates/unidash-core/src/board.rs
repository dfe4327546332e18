// ── Board revision report ──

use crate::model::Device;

/// One line per device, `"{name} - Board Revision: {rev}"`, sorted by name.
/// Devices with no revision, or a zero one, show `N/A`.
pub fn board_revision_report(devices: &[Device]) -> Vec<String> {
    let mut rows: Vec<(&str, Option<i64>)> = devices
        .iter()
        .map(|d| (d.display_name(), d.board_revision))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    rows.into_iter()
        .map(|(name, rev)| match rev {
            Some(rev) if rev != 0 => format!("{name} - Board Revision: {rev}"),
            _ => format!("{name} - Board Revision: N/A"),
        })
        .collect()
}
