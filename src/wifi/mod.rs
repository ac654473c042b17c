//! Wi-Fi connectivity.
//!
//! Credentials are compile-time only (see [`crate::config`]); there is no
//! provisioning flow and nothing is persisted. The connection lives for a
//! single wake cycle and is torn down before deep sleep.

#[cfg(feature = "esp32")]
mod connection;

#[cfg(feature = "esp32")]
pub use connection::{WifiError, WifiManager};
