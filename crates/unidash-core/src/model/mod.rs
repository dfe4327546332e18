// ── Domain model ──

pub mod device;
pub mod mac;
pub mod site;

pub use device::Device;
pub use mac::{MacAddress, MacParseError};
pub use site::Site;
