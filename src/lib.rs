//! Driver for the Grove 5-Way Tactile switch and the Grove 6-Position DIP
//! switch, which share one I2C slave firmware.
//!
//! The driver probes the device identity over a borrowed I2C bus, reads the
//! firmware version and polls button/switch events, transparently working
//! around the level-change defect of firmware v0.1. See
//! [`GroveMultiSwitch`] for the session API and [`bus::SwitchBus`] for the
//! transport contract.

pub mod bus;
pub mod device;
pub mod error;
pub mod event;
pub mod protocol;

pub use bus::{BusError, HalBus, SwitchBus};
pub use device::GroveMultiSwitch;
pub use error::SwitchError;
pub use event::{BTN_EV_HAS_EVENT, BTN_EV_NO_EVENT, ButtonEvent, ButtonFlags};
pub use protocol::{DeviceId, FirmwareVersion, Opcode};
