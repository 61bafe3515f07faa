//! Wire-level protocol definitions for the Grove multi-switch firmware.
//!
//! Both the 5-Way Tactile switch and the 6-Position DIP switch run the same
//! slave firmware and speak a minimal register convention: the master writes
//! a single opcode byte, then clocks out a fixed-size response. The opcode
//! table below was taken from the vendor firmware; only a subset returns
//! data, the rest are fire-and-forget mode switches.

use std::fmt;

use num_enum::IntoPrimitive;

/// Factory-default I2C address of the device.
pub const DEFAULT_I2C_ADDR: u8 = 0x03;

/// Vendor id reported in the high 16 bits of the identity register.
pub const VENDOR_ID: u16 = 0x2886;

/// Product id of the Grove 5-Way Tactile switch.
pub const PID_5_WAY_TACTILE: u16 = 0x0002;

/// Product id of the Grove 6-Position DIP switch.
pub const PID_6_POS_DIP: u16 = 0x0003;

/// Size of the identity register response (vendor id + product id).
pub const DEVICE_ID_SIZE: usize = 4;

/// Size of the fixed-layout ASCII version response, e.g. `SW  V0.1..`.
pub const VERSION_SIZE: usize = 10;

/// Offsets of the major/minor digit characters inside the version response.
pub const VERSION_MAJOR_OFFSET: usize = 6;
pub const VERSION_MINOR_OFFSET: usize = 8;

/// Size of the event mask that precedes the per-button status bytes.
pub const EVENT_HEADER_SIZE: usize = 4;

/// Maximum number of button/switch slots in an event response.
pub const BUTTON_MAX: usize = 6;

/// Identity read attempts before the device is declared absent.
pub const PROBE_ATTEMPTS: usize = 4;

/// Firmware versions at or below this value need the driver-side
/// level-change recomputation, see [`crate::event::recompute_level_changes`].
pub const SHIM_VERSION_MAX: u32 = 1;

/// Command opcodes understood by the switch firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive)]
#[repr(u8)]
pub enum Opcode {
    /// Read the 4-byte vendor/product identity.
    GetDeviceId = 0x00,
    /// Read the event mask and per-button status bytes.
    GetEvent = 0x01,
    /// Report single/double click, long press (tactile) or level changes (DIP).
    EventDetectMode = 0x02,
    /// Report raw press / switch-on status only.
    BlockDetectMode = 0x03,
    /// Let the device sleep between transactions.
    AutoSleepOn = 0xB2,
    /// Keep the device awake (firmware default).
    AutoSleepOff = 0xB3,
    /// Change the device I2C address; one payload byte follows.
    SetAddress = 0xC0,
    /// Restore the factory-default I2C address.
    ResetAddress = 0xC1,
    /// Drive the TX/RX pins in test mode.
    TestTxRxOn = 0xE0,
    TestTxRxOff = 0xE1,
    /// Read the 10-byte firmware version string.
    GetVersion = 0xE2,
    /// Read the 4-byte unique chip id.
    GetDeviceUid = 0xF1,
}

/// The 32-bit identity value returned by [`Opcode::GetDeviceId`].
///
/// Zero means the device has not been probed (or is absent); a valid
/// identity carries [`VENDOR_ID`] in the high half and the product id in
/// the low half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceId(u32);

impl DeviceId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn vendor_id(self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn product_id(self) -> u16 {
        self.0 as u16
    }

    /// Whether the vendor field identifies the multi-switch family.
    pub fn is_multi_switch(self) -> bool {
        self.vendor_id() == VENDOR_ID
    }

    /// Number of buttons/switches for this identity, 0 when the device is
    /// absent or not a known product.
    pub fn switch_count(self) -> u32 {
        if !self.is_multi_switch() {
            return 0;
        }
        match self.product_id() {
            PID_5_WAY_TACTILE => 5,
            PID_6_POS_DIP => 6,
            _ => 0,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}:{:#06x}", self.vendor_id(), self.product_id())
    }
}

/// Raw firmware version response plus its parsed numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    /// The fixed-layout ASCII buffer exactly as the device returned it.
    pub raw: [u8; VERSION_SIZE],
}

impl FirmwareVersion {
    /// Combined `major * 10 + minor` value used to gate workarounds.
    pub fn value(&self) -> u32 {
        parse_version(&self.raw)
    }
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.raw.iter().filter(|b| b.is_ascii_graphic() || **b == b' ') {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// Parse the two significant digits out of a version response.
///
/// The layout is fixed (`SW  VM.m..`): the major digit sits at offset 6 and
/// the minor digit at offset 8. Non-digit bytes produce values well above
/// any real firmware revision, which keeps the v0.1 workaround disabled on
/// garbage input.
pub fn parse_version(raw: &[u8; VERSION_SIZE]) -> u32 {
    let major = u32::from(raw[VERSION_MAJOR_OFFSET].wrapping_sub(b'0'));
    let minor = u32::from(raw[VERSION_MINOR_OFFSET].wrapping_sub(b'0'));
    major * 10 + minor
}
