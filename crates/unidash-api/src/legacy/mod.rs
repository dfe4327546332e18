// Legacy API client modules
//
// Hand-written client for the UniFi controller's legacy (non-OpenAPI) endpoints
// wrapped in the standard `{ meta: { rc, msg }, data: [...] }` envelope.
// Unlike a single-site client, every site-scoped call takes the site name,
// so one authenticated session can walk the whole site roster.

pub mod auth;
pub mod client;
pub mod devices;
pub mod models;
pub mod networks;
pub mod sites;
pub mod wlans;

pub use client::LegacyClient;
