//! Local device snapshot.
//!
//! A SQLite copy of every site's device roster, refreshed by
//! [`sync_snapshot`]. The MAC search can run against it instead of the live
//! controller when `search.backend = "snapshot"`.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, params};
use tracing::{debug, info, warn};

use crate::directory::{DeviceDirectory, DirectorySource};
use crate::error::CoreError;
use crate::model::{Device, MacAddress, Site};

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS sites (
    name        TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    synced_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS devices (
    mac       TEXT PRIMARY KEY,
    name      TEXT,
    site_name TEXT NOT NULL,
    model     TEXT,
    board_rev INTEGER
);
CREATE INDEX IF NOT EXISTS idx_devices_site ON devices(site_name);
";

/// SQLite-backed device directory.
#[derive(Clone)]
pub struct SnapshotStore {
    conn: Arc<Mutex<Connection>>,
}

impl SnapshotStore {
    /// Open or create the snapshot database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.as_ref().display(), "opened device snapshot");
        Ok(store)
    }

    /// In-memory snapshot (for testing).
    pub fn open_memory() -> Result<Self, CoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Record `site` and upsert its devices in one transaction.
    pub fn save_site(
        &self,
        site: &Site,
        devices: &[Device],
        synced_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO sites (name, description, synced_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                description = excluded.description,
                synced_at = excluded.synced_at",
            params![site.id, site.description, synced_at.to_rfc3339()],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO devices (mac, name, site_name, model, board_rev)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(mac) DO UPDATE SET
                    name = excluded.name,
                    site_name = excluded.site_name,
                    model = excluded.model,
                    board_rev = excluded.board_rev",
            )?;
            for d in devices {
                stmt.execute(params![
                    d.mac.as_str(),
                    d.name,
                    site.id,
                    d.model,
                    d.board_revision
                ])?;
            }
        }

        tx.commit()?;
        debug!(site = %site.id, devices = devices.len(), "snapshot site saved");
        Ok(())
    }

    /// Every recorded site, ordered by description.
    pub fn sites(&self) -> Result<Vec<Site>, CoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT name, description FROM sites ORDER BY description")?;
        let rows = stmt.query_map([], |row| {
            Ok(Site {
                id: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Devices recorded for the site with internal name `site_id`.
    pub fn devices(&self, site_id: &str) -> Result<Vec<Device>, CoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT mac, name, site_name, model, board_rev FROM devices
             WHERE site_name = ?1 ORDER BY mac",
        )?;
        let rows = stmt.query_map(params![site_id], |row| {
            Ok(Device {
                mac: MacAddress::new(row.get::<_, String>(0)?),
                name: row.get(1)?,
                site: row.get(2)?,
                model: row.get(3)?,
                board_revision: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn device_count(&self) -> Result<usize, CoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM devices", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

#[async_trait]
impl DeviceDirectory for SnapshotStore {
    async fn list_sites(&self) -> Result<Vec<Site>, CoreError> {
        self.sites()
    }

    async fn list_devices(&self, site: &Site) -> Result<Vec<Device>, CoreError> {
        self.devices(&site.id)
    }
}

#[async_trait]
impl DirectorySource for SnapshotStore {
    async fn open(&self) -> Result<Arc<dyn DeviceDirectory>, CoreError> {
        Ok(Arc::new(self.clone()))
    }
}

// ── Sync ─────────────────────────────────────────────────────────────

/// Progress notifications from [`sync_snapshot`].
#[derive(Debug, Clone, Copy)]
pub enum SyncStep<'a> {
    Started { total: usize },
    /// `saved` is `None` when the site's roster could not be fetched.
    Site { site: &'a Site, saved: Option<usize> },
}

/// Outcome of one snapshot sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub sites: usize,
    pub devices: usize,
    /// Descriptions of sites whose roster fetch failed.
    pub failed_sites: Vec<String>,
}

/// Copy every site's device roster from `directory` into `store`.
///
/// Sites are walked one at a time in description order. A failed roster
/// fetch is logged and recorded in the report; only a failed site listing
/// or a storage error aborts the sync.
pub async fn sync_snapshot(
    directory: &dyn DeviceDirectory,
    store: &SnapshotStore,
    mut on_step: impl FnMut(SyncStep<'_>) + Send,
) -> Result<SyncReport, CoreError> {
    let mut sites = directory.list_sites().await?;
    sites.sort_by(|a, b| a.description.cmp(&b.description));
    on_step(SyncStep::Started { total: sites.len() });

    let mut report = SyncReport::default();
    for site in &sites {
        match directory.list_devices(site).await {
            Ok(devices) => {
                store.save_site(site, &devices, Utc::now())?;
                report.sites += 1;
                report.devices += devices.len();
                on_step(SyncStep::Site {
                    site,
                    saved: Some(devices.len()),
                });
            }
            Err(e) => {
                warn!(site = %site.description, error = %e, "failed to fetch devices, skipping site");
                report.failed_sites.push(site.description.clone());
                on_step(SyncStep::Site { site, saved: None });
            }
        }
    }

    info!(
        sites = report.sites,
        devices = report.devices,
        failed = report.failed_sites.len(),
        "snapshot sync complete"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn device(mac: &str, name: &str, site: &str, rev: Option<i64>) -> Device {
        Device {
            mac: MacAddress::new(mac),
            name: Some(name.into()),
            site: site.into(),
            model: Some("U6LR".into()),
            board_revision: rev,
        }
    }

    struct FakeDirectory {
        sites: Vec<Site>,
        broken: &'static str,
    }

    #[async_trait]
    impl DeviceDirectory for FakeDirectory {
        async fn list_sites(&self) -> Result<Vec<Site>, CoreError> {
            Ok(self.sites.clone())
        }

        async fn list_devices(&self, site: &Site) -> Result<Vec<Device>, CoreError> {
            if site.id == self.broken {
                return Err(CoreError::Api {
                    message: "HTTP 500".into(),
                    status: Some(500),
                });
            }
            Ok(vec![device(
                &format!("aa:bb:cc:00:00:{:02x}", site.id.len()),
                &format!("AP-{}", site.id),
                &site.id,
                Some(3),
            )])
        }
    }

    #[test]
    fn save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(dir.path().join("devices.db")).unwrap();
        let site = Site::new("default", "Main Office");

        store
            .save_site(
                &site,
                &[
                    device("AA:BB:CC:00:00:02", "Switch", "default", None),
                    device("aa:bb:cc:00:00:01", "AP", "default", Some(19)),
                ],
                Utc::now(),
            )
            .unwrap();

        assert_eq!(store.sites().unwrap(), vec![site]);
        let devices = store.devices("default").unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].mac.as_str(), "aa:bb:cc:00:00:01");
        assert_eq!(devices[0].board_revision, Some(19));
        assert_eq!(devices[1].board_revision, None);
    }

    #[test]
    fn device_moving_sites_is_upserted() {
        let store = SnapshotStore::open_memory().unwrap();
        let a = Site::new("a", "Alpha");
        let b = Site::new("b", "Beta");
        store
            .save_site(&a, &[device("aa:bb:cc:00:00:01", "AP", "a", None)], Utc::now())
            .unwrap();
        store
            .save_site(&b, &[device("aa:bb:cc:00:00:01", "AP-moved", "b", None)], Utc::now())
            .unwrap();

        assert!(store.devices("a").unwrap().is_empty());
        assert_eq!(store.devices("b").unwrap()[0].name.as_deref(), Some("AP-moved"));
        assert_eq!(store.device_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn sync_skips_failed_sites() {
        let directory = FakeDirectory {
            sites: vec![
                Site::new("zeta", "Zeta Warehouse"),
                Site::new("hq", "Alpha HQ"),
                Site::new("lab", "Lab"),
            ],
            broken: "lab",
        };
        let store = SnapshotStore::open_memory().unwrap();
        let mut visited = Vec::new();

        let report = sync_snapshot(&directory, &store, |step| {
            if let SyncStep::Site { site, .. } = step {
                visited.push(site.description.clone());
            }
        })
        .await
        .unwrap();

        assert_eq!(visited, vec!["Alpha HQ", "Lab", "Zeta Warehouse"]);
        assert_eq!(report.sites, 2);
        assert_eq!(report.devices, 2);
        assert_eq!(report.failed_sites, vec!["Lab".to_string()]);
        assert_eq!(
            store
                .sites()
                .unwrap()
                .into_iter()
                .map(|s| s.id)
                .collect::<Vec<_>>(),
            vec!["hq", "zeta"]
        );
    }
}
