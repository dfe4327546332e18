// ── Fan-out MAC search ──
//
// Splits the site list in two and scans both halves at once: the first
// half front to back, the second half back to front. Both scans share one
// `SearchJob`; every state change and the event describing it happen under
// the same lock, so the stream order is the state order.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::config::SearchOptions;
use crate::directory::DeviceDirectory;
use crate::model::{Device, MacAddress, Site};

// ── Events ───────────────────────────────────────────────────────────

/// One line of the search progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchEvent {
    /// A site was checked without a match.
    Progress {
        checked: usize,
        total: usize,
        percent: u8,
    },
    /// The target was found. Terminal.
    #[serde(rename_all = "camelCase")]
    Found {
        /// Site description.
        site: String,
        site_id: String,
        /// Device display name.
        device: String,
        mac: MacAddress,
        checked: usize,
        total: usize,
    },
    /// Every site was checked (or the deadline hit) without a match. Terminal.
    #[serde(rename_all = "camelCase")]
    Done {
        found: bool,
        checked: usize,
        total: usize,
        timed_out: bool,
    },
}

impl SearchEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Progress { .. })
    }
}

/// Integer percentage of sites checked; 100 when there is nothing to check.
pub fn percent(checked: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    u8::try_from(checked.min(total) * 100 / total).unwrap_or(100)
}

// ── Event stream ─────────────────────────────────────────────────────

/// Events of one running search. Dropping it cancels the scans.
pub struct SearchStream {
    inner: UnboundedReceiverStream<SearchEvent>,
    _cancel_on_drop: Option<DropGuard>,
}

impl SearchStream {
    fn new(rx: mpsc::UnboundedReceiver<SearchEvent>, cancel: Option<CancellationToken>) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(rx),
            _cancel_on_drop: cancel.map(CancellationToken::drop_guard),
        }
    }
}

impl Stream for SearchStream {
    type Item = SearchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

// ── Shared job state ─────────────────────────────────────────────────

struct JobState {
    checked: usize,
    found: bool,
    /// Taken when the terminal event is sent, which closes the stream.
    events: Option<mpsc::UnboundedSender<SearchEvent>>,
}

struct SearchJob {
    target: MacAddress,
    total: usize,
    state: Mutex<JobState>,
    cancel: CancellationToken,
}

impl SearchJob {
    /// Whether a scan may start another site fetch.
    fn is_active(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        let state = self.state.lock();
        !state.found && state.events.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn record_miss(&self) {
        let mut state = self.state.lock();
        if state.found {
            return;
        }
        let Some(tx) = state.events.clone() else {
            return;
        };
        state.checked = (state.checked + 1).min(self.total);
        // A closed channel means the client left; the scans notice on their next check.
        let _ = tx.send(SearchEvent::Progress {
            checked: state.checked,
            total: self.total,
            percent: percent(state.checked, self.total),
        });
    }

    /// Claim the match. Only the first caller wins.
    fn record_match(&self, site: &Site, device: &Device) -> bool {
        let mut state = self.state.lock();
        if state.found {
            return false;
        }
        let Some(tx) = state.events.take() else {
            return false;
        };
        state.found = true;
        state.checked = (state.checked + 1).min(self.total);
        let _ = tx.send(SearchEvent::Found {
            site: site.description.clone(),
            site_id: site.id.clone(),
            device: device.display_name().to_owned(),
            mac: device.mac.clone(),
            checked: state.checked,
            total: self.total,
        });
        self.cancel.cancel();
        true
    }

    /// Emit `Done` unless a terminal event already went out.
    fn finish(&self, timed_out: bool) {
        let mut state = self.state.lock();
        let Some(tx) = state.events.take() else {
            return;
        };
        let _ = tx.send(SearchEvent::Done {
            found: false,
            checked: state.checked,
            total: self.total,
            timed_out,
        });
        self.cancel.cancel();
    }
}

// ── Entry point ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Reverse,
}

/// Search `sites` for `target`, streaming progress as sites are checked.
///
/// Must be called from within a tokio runtime. The stream ends after its
/// terminal event (`Found` or `Done`).
pub fn search_for_mac(
    directory: Arc<dyn DeviceDirectory>,
    sites: Vec<Site>,
    target: MacAddress,
    options: SearchOptions,
) -> SearchStream {
    let (tx, rx) = mpsc::unbounded_channel();
    let total = sites.len();

    if total == 0 {
        debug!(mac = %target, "no sites to search");
        let _ = tx.send(SearchEvent::Done {
            found: false,
            checked: 0,
            total: 0,
            timed_out: false,
        });
        tokio::spawn(async move { directory.release().await });
        return SearchStream::new(rx, None);
    }

    let cancel = CancellationToken::new();
    let job = Arc::new(SearchJob {
        target,
        total,
        state: Mutex::new(JobState {
            checked: 0,
            found: false,
            events: Some(tx),
        }),
        cancel: cancel.clone(),
    });

    let mid = total.div_ceil(2);
    let mut forward = sites;
    let mut reverse = forward.split_off(mid);
    reverse.reverse();
    debug!(
        mac = %job.target,
        total,
        forward = forward.len(),
        reverse = reverse.len(),
        "starting fan-out search"
    );

    let fwd = tokio::spawn(scan(
        Arc::clone(&job),
        Arc::clone(&directory),
        forward,
        options.site_timeout,
        Direction::Forward,
    ));
    let rev = tokio::spawn(scan(
        Arc::clone(&job),
        Arc::clone(&directory),
        reverse,
        options.site_timeout,
        Direction::Reverse,
    ));
    tokio::spawn(supervise(job, directory, vec![fwd, rev], options.deadline));

    SearchStream::new(rx, Some(cancel))
}

async fn scan(
    job: Arc<SearchJob>,
    directory: Arc<dyn DeviceDirectory>,
    sites: Vec<Site>,
    site_timeout: Duration,
    direction: Direction,
) {
    for site in sites {
        if !job.is_active() {
            debug!(?direction, "scan stopped");
            return;
        }

        let devices = match tokio::time::timeout(site_timeout, directory.list_devices(&site)).await
        {
            Ok(Ok(devices)) => devices,
            Ok(Err(e)) => {
                warn!(site = %site.id, error = %e, "device roster fetch failed, counting site as checked");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    site = %site.id,
                    timeout_secs = site_timeout.as_secs(),
                    "device roster fetch timed out, counting site as checked"
                );
                Vec::new()
            }
        };

        match devices.iter().find(|d| d.mac == job.target) {
            Some(device) => {
                if job.record_match(&site, device) {
                    info!(mac = %job.target, site = %site.id, ?direction, "device found");
                }
                return;
            }
            None => job.record_miss(),
        }
    }
    debug!(?direction, "scan exhausted its half");
}

/// Wait for both scans (or the deadline), emit the terminal event, then
/// release the directory.
async fn supervise(
    job: Arc<SearchJob>,
    directory: Arc<dyn DeviceDirectory>,
    mut scans: Vec<JoinHandle<()>>,
    deadline: Duration,
) {
    let joined = tokio::time::timeout(deadline, join_all(scans.iter_mut())).await;

    match joined {
        Ok(results) => {
            for result in results {
                if let Err(e) = result {
                    warn!(error = %e, "scan task ended abnormally");
                }
            }
            job.finish(false);
        }
        Err(_) => {
            for scan in &scans {
                scan.abort();
            }
            warn!(
                mac = %job.target,
                deadline_secs = deadline.as_secs(),
                "search deadline exceeded"
            );
            job.finish(true);
        }
    }
    directory.release().await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn percent_handles_empty_and_rounds_down() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn event_wire_format() {
        let progress = serde_json::to_value(SearchEvent::Progress {
            checked: 2,
            total: 4,
            percent: 50,
        })
        .unwrap();
        assert_eq!(
            progress,
            serde_json::json!({"type": "progress", "checked": 2, "total": 4, "percent": 50})
        );

        let found = serde_json::to_value(SearchEvent::Found {
            site: "Main Office".into(),
            site_id: "default".into(),
            device: "AP-Lobby".into(),
            mac: MacAddress::new("AABBCCDDEEFF"),
            checked: 3,
            total: 4,
        })
        .unwrap();
        assert_eq!(found["type"], "found");
        assert_eq!(found["siteId"], "default");
        assert_eq!(found["mac"], "aa:bb:cc:dd:ee:ff");

        let done = serde_json::to_value(SearchEvent::Done {
            found: false,
            checked: 4,
            total: 4,
            timed_out: true,
        })
        .unwrap();
        assert_eq!(
            done,
            serde_json::json!({"type": "done", "found": false, "checked": 4, "total": 4, "timedOut": true})
        );
    }

    #[test]
    fn only_first_match_is_recorded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let job = SearchJob {
            target: MacAddress::new("aa:bb:cc:dd:ee:ff"),
            total: 2,
            state: Mutex::new(JobState {
                checked: 0,
                found: false,
                events: Some(tx),
            }),
            cancel: CancellationToken::new(),
        };
        let site = Site::new("default", "Main");
        let device = Device {
            mac: job.target.clone(),
            name: None,
            site: "default".into(),
            model: None,
            board_revision: None,
        };

        assert!(job.record_match(&site, &device));
        assert!(!job.record_match(&site, &device));
        job.record_miss();
        job.finish(false);

        assert!(matches!(rx.try_recv().unwrap(), SearchEvent::Found { .. }));
        assert!(rx.try_recv().is_err());
        assert!(job.cancel.is_cancelled());
    }
}
