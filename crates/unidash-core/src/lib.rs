//! Business logic between `unidash-api` and the dashboard server.
//!
//! - **[`ControllerSession`]**: one authenticated controller session per
//!   request. Lists sites and device rosters, renders board-revision
//!   reports and provisions VLANs.
//!
//! - **[`DeviceDirectory`]** / **[`DirectorySource`]**: the read interface the
//!   MAC search runs against. Backed either live by a controller session or
//!   by the local [`SnapshotStore`].
//!
//! - **[`search_for_mac`]**: two-direction fan-out search over a site list
//!   that streams [`SearchEvent`]s and stops at the first match.
//!
//! - **[`AccessList`]**: static source-address allowlist (single addresses
//!   and CIDR blocks) gating every inbound request.

pub mod access;
pub mod board;
pub mod config;
pub mod convert;
pub mod directory;
pub mod error;
pub mod model;
pub mod search;
pub mod session;
pub mod snapshot;
pub mod vlan;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{AccessList, AllowRule};
pub use board::board_revision_report;
pub use config::{ControllerConfig, DirectoryBackend, SearchOptions, TlsVerification};
pub use directory::{DeviceDirectory, DirectorySource, LiveSource};
pub use error::CoreError;
pub use model::{Device, MacAddress, MacParseError, Site};
pub use search::{SearchEvent, SearchStream, search_for_mac};
pub use session::ControllerSession;
pub use snapshot::{SnapshotStore, SyncReport, SyncStep, sync_snapshot};
pub use vlan::{ProvisionedVlan, VlanPlan, VlanRequest};
