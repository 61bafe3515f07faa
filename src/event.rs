//! Button/switch event representation and the level-change workaround.

use bitflags::bitflags;

use crate::protocol::{BUTTON_MAX, EVENT_HEADER_SIZE};

/// Event mask value when nothing happened since the last poll.
pub const BTN_EV_NO_EVENT: u32 = 0;

/// Bit set in the event mask when at least one button slot carries an event.
pub const BTN_EV_HAS_EVENT: u32 = 0x8000_0000;

bitflags! {
    /// Per-button status bits reported by the firmware.
    ///
    /// `RAW_STATUS` is live level state (0 = pressed / switch on, active
    /// low on the hardware); the remaining bits are only produced in event
    /// detect mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ButtonFlags: u8 {
        const RAW_STATUS    = 1 << 0;
        const SINGLE_CLICK  = 1 << 1;
        const DOUBLE_CLICK  = 1 << 2;
        const LONG_PRESS    = 1 << 3;
        const LEVEL_CHANGED = 1 << 4;
    }
}

/// One event register response: a 32-bit mask plus one status byte per
/// button slot. Slots beyond the probed switch count stay zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEvent {
    pub event: u32,
    pub buttons: [u8; BUTTON_MAX],
}

impl ButtonEvent {
    /// Parse a wire response: little-endian mask followed by up to
    /// [`BUTTON_MAX`] status bytes. Short responses leave the tail zeroed.
    pub fn from_wire(bytes: &[u8]) -> Self {
        let mut mask = [0u8; EVENT_HEADER_SIZE];
        let head = bytes.len().min(EVENT_HEADER_SIZE);
        mask[..head].copy_from_slice(&bytes[..head]);

        let mut buttons = [0u8; BUTTON_MAX];
        let tail = &bytes[head..];
        let n = tail.len().min(BUTTON_MAX);
        buttons[..n].copy_from_slice(&tail[..n]);

        Self {
            event: u32::from_le_bytes(mask),
            buttons,
        }
    }

    pub fn has_event(&self) -> bool {
        self.event & BTN_EV_HAS_EVENT != 0
    }

    /// Status flags of one button slot. Unknown bits are preserved.
    pub fn button(&self, index: usize) -> ButtonFlags {
        ButtonFlags::from_bits_retain(self.buttons[index])
    }
}

/// Recompute `LEVEL_CHANGED` from raw status deltas.
///
/// Firmware v0.1 drops its own `LEVEL_CHANGED` flag when the event register
/// is polled at high frequency, so for that revision the driver ignores the
/// device-reported bit entirely: clear it on every slot, then set it (and
/// `HAS_EVENT` on the mask) wherever `RAW_STATUS` differs from the previous
/// poll. Pure over its inputs so it can be tested without a bus.
pub fn recompute_level_changes(mut current: ButtonEvent, previous: &ButtonEvent) -> ButtonEvent {
    for i in 0..BUTTON_MAX {
        current.buttons[i] &= !ButtonFlags::LEVEL_CHANGED.bits();
        if (current.buttons[i] ^ previous.buttons[i]) & ButtonFlags::RAW_STATUS.bits() != 0 {
            current.buttons[i] |= ButtonFlags::LEVEL_CHANGED.bits();
            current.event |= BTN_EV_HAS_EVENT;
        }
    }
    current
}
