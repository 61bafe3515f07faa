use thiserror::Error;

use crate::bus::BusError;

/// The primary error type for the `grove-multi-switch` library.
///
/// Every failure is local to the operation that produced it; the session
/// stays usable and the caller decides whether to retry or re-probe.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchError {
    /// An operation was requested before the device identity was established.
    #[error("device has not been probed yet, call init() first")]
    NotProbed,

    /// Probing exhausted its attempts without seeing the expected vendor id.
    #[error("unsupported or absent device (identity {id:#010x})")]
    UnsupportedDevice { id: u32 },

    /// The bus layer reported a transmission failure.
    #[error("transport error: {0}")]
    Transport(#[from] BusError),

    /// A read transaction completed but the device supplied no bytes.
    #[error("device returned no data")]
    NoData,
}
