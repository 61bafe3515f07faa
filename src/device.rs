//! The `GroveMultiSwitch` session object.

use tracing::{debug, info, trace, warn};

use crate::bus::SwitchBus;
use crate::error::SwitchError;
use crate::event::{self, ButtonEvent};
use crate::protocol::{
    BUTTON_MAX, DEFAULT_I2C_ADDR, DEVICE_ID_SIZE, DeviceId, EVENT_HEADER_SIZE, FirmwareVersion,
    Opcode, PROBE_ATTEMPTS, SHIM_VERSION_MAX, VERSION_SIZE, parse_version,
};

/// Driver session for one Grove 5-Way Tactile or 6-Position DIP switch.
///
/// The session owns a bus handle and the state established by [`init`]:
/// device identity, switch count and firmware version. Every accessor other
/// than probing refuses to touch the bus until the identity is known.
///
/// Not safe for concurrent use; the target environment is a single blocking
/// control loop.
///
/// [`init`]: GroveMultiSwitch::init
pub struct GroveMultiSwitch<B> {
    bus: B,
    addr: u8,
    dev_id: DeviceId,
    btn_cnt: u32,
    version: u32,
    /// Snapshot of the last event returned to the caller, kept for the
    /// firmware v0.1 level-change recomputation. `None` until the first
    /// successful event read.
    prev_event: Option<ButtonEvent>,
    last_error: i32,
}

impl<B: SwitchBus> GroveMultiSwitch<B> {
    /// Bind a session to the factory-default device address.
    pub fn new(bus: B) -> Self {
        Self::with_address(bus, DEFAULT_I2C_ADDR)
    }

    /// Tear the session down and give the bus handle back.
    pub fn release(self) -> B {
        self.bus
    }

    /// Bind a session to a specific device address.
    pub fn with_address(bus: B, addr: u8) -> Self {
        Self {
            bus,
            addr,
            dev_id: DeviceId::default(),
            btn_cnt: 0,
            version: 0,
            prev_event: None,
            last_error: 0,
        }
    }

    /// Probe the device, read its firmware version and compute the switch
    /// count. Succeeds iff a supported product answered.
    pub fn init(&mut self) -> Result<(), SwitchError> {
        self.probe()?;
        // Best effort: a session without a parsed version still works, the
        // v0.1 workaround then stays active.
        if let Err(err) = self.firmware_version() {
            warn!(%err, "could not read firmware version");
        }
        self.btn_cnt = self.dev_id.switch_count();
        if self.btn_cnt == 0 {
            return Err(SwitchError::UnsupportedDevice { id: self.dev_id.raw() });
        }
        debug!(buttons = self.btn_cnt, "switch interface ready");
        Ok(())
    }

    /// Establish the device identity, retrying with framing realignment.
    ///
    /// The slave's internal read pointer can drift out of step with the
    /// master. When the identity response does not carry the expected
    /// vendor id, one stray byte is consumed to shift the alignment before
    /// the next attempt. Exactly one byte per retry, matching the observed
    /// recovery behavior of the firmware.
    pub fn probe(&mut self) -> Result<DeviceId, SwitchError> {
        let mut id = DeviceId::default();
        for attempt in 1..=PROBE_ATTEMPTS {
            let mut raw = [0u8; DEVICE_ID_SIZE];
            id = match self.read_reg(Opcode::GetDeviceId, &mut raw) {
                Ok(n) if n > 0 => DeviceId::new(u32::from_le_bytes(raw)),
                _ => DeviceId::default(),
            };

            if id.is_multi_switch() {
                self.dev_id = id;
                info!(%id, attempt, "identified multi-switch device");
                return Ok(id);
            }

            debug!(%id, attempt, "vendor id mismatch, realigning slave read pointer");
            let mut stray = [0u8; 1];
            let _ = self.read_dev(&mut stray);
        }

        // Keep whatever the last attempt produced for diagnostics.
        self.dev_id = id;
        Err(SwitchError::UnsupportedDevice { id: id.raw() })
    }

    /// Identity established by the last probe; zero raw value means the
    /// device was never seen.
    pub fn device_id(&self) -> DeviceId {
        self.dev_id
    }

    /// Number of buttons/switches, 0 until a supported device was probed.
    pub fn switch_count(&self) -> u32 {
        self.btn_cnt
    }

    /// The address this session talks to.
    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Retarget the session after the device moved to a new address, see
    /// [`set_device_address`](GroveMultiSwitch::set_device_address).
    pub fn set_address(&mut self, addr: u8) {
        self.addr = addr;
    }

    /// Parsed `major * 10 + minor` firmware version, 0 if never read.
    pub fn version_value(&self) -> u32 {
        self.version
    }

    /// Result of the last transport transaction, errno-style: byte count on
    /// success, negated bus status on failure. Diagnostic only.
    pub fn last_error(&self) -> i32 {
        self.last_error
    }

    /// Read and parse the firmware version string.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, SwitchError> {
        self.ensure_probed()?;
        let mut raw = [0u8; VERSION_SIZE];
        let n = self.read_reg(Opcode::GetVersion, &mut raw)?;
        if n == 0 {
            return Err(SwitchError::NoData);
        }
        self.version = parse_version(&raw);
        trace!(version = self.version, "parsed firmware version");
        Ok(FirmwareVersion { raw })
    }

    /// Tell the device to listen on a new I2C address.
    ///
    /// The device re-addresses itself immediately on a successful write; it
    /// does not answer on the old address afterwards, so no verification
    /// read is attempted. The session keeps talking to its current address
    /// until the caller follows up with
    /// [`set_address`](GroveMultiSwitch::set_address). Transport failures
    /// are recorded in [`last_error`](GroveMultiSwitch::last_error) only.
    pub fn set_device_address(&mut self, addr: u8) -> Result<(), SwitchError> {
        self.ensure_probed()?;
        let _ = self.write_dev(&[Opcode::SetAddress.into(), addr]);
        Ok(())
    }

    /// Restore the factory-default device address.
    pub fn reset_device_address(&mut self) -> Result<(), SwitchError> {
        self.command(Opcode::ResetAddress)
    }

    /// Select event detect mode (clicks, long presses, level changes) or
    /// block detect mode (raw status only).
    pub fn set_event_mode(&mut self, enable: bool) -> Result<(), SwitchError> {
        self.command(if enable {
            Opcode::EventDetectMode
        } else {
            Opcode::BlockDetectMode
        })
    }

    /// Enable or disable the firmware auto-sleep mode (off by default).
    pub fn set_auto_sleep(&mut self, enable: bool) -> Result<(), SwitchError> {
        self.command(if enable {
            Opcode::AutoSleepOn
        } else {
            Opcode::AutoSleepOff
        })
    }

    /// Enable or disable the TX/RX pin test mode.
    pub fn set_tx_rx_test(&mut self, enable: bool) -> Result<(), SwitchError> {
        self.command(if enable {
            Opcode::TestTxRxOn
        } else {
            Opcode::TestTxRxOff
        })
    }

    /// Read the unique chip id.
    pub fn device_uid(&mut self) -> Result<u32, SwitchError> {
        self.ensure_probed()?;
        let mut raw = [0u8; 4];
        let n = self.read_reg(Opcode::GetDeviceUid, &mut raw)?;
        if n == 0 {
            return Err(SwitchError::NoData);
        }
        Ok(u32::from_le_bytes(raw))
    }

    /// Poll the event register.
    ///
    /// Firmware newer than v0.1 is trusted as-is. For v0.1 (and for
    /// sessions where the version read failed) the device's unreliable
    /// `LEVEL_CHANGED` flag is recomputed from raw status deltas against
    /// the previous poll; the first poll seeds the baseline and reports no
    /// change. The snapshot is updated on every successful poll regardless
    /// of which path was taken, so a session never mixes stale baselines
    /// across firmware revisions.
    pub fn event(&mut self) -> Result<ButtonEvent, SwitchError> {
        self.ensure_probed()?;
        let len = EVENT_HEADER_SIZE + self.btn_cnt as usize;
        let mut raw = [0u8; EVENT_HEADER_SIZE + BUTTON_MAX];
        let n = self.read_reg(Opcode::GetEvent, &mut raw[..len])?;
        if n == 0 {
            return Err(SwitchError::NoData);
        }

        let current = ButtonEvent::from_wire(&raw[..len]);
        let current = if self.version > SHIM_VERSION_MAX {
            current
        } else {
            let previous = self.prev_event.unwrap_or(current);
            event::recompute_level_changes(current, &previous)
        };

        self.prev_event = Some(current);
        Ok(current)
    }

    fn ensure_probed(&self) -> Result<(), SwitchError> {
        if self.dev_id.raw() == 0 {
            return Err(SwitchError::NotProbed);
        }
        Ok(())
    }

    /// Single-opcode command with the standard probed-identity gate.
    fn command(&mut self, op: Opcode) -> Result<(), SwitchError> {
        self.ensure_probed()?;
        self.write_dev(&[op.into()])?;
        Ok(())
    }

    /// One addressed write transaction. Returns the byte count written.
    fn write_dev(&mut self, bytes: &[u8]) -> Result<usize, SwitchError> {
        match self.bus.write_to(self.addr, bytes) {
            Ok(()) => {
                self.last_error = bytes.len() as i32;
                Ok(bytes.len())
            }
            Err(err) => {
                self.last_error = -err.code;
                Err(err.into())
            }
        }
    }

    /// Request `buf.len()` bytes and copy what arrived. The slave may
    /// supply more than requested; the surplus is discarded here so the
    /// next transaction starts aligned. Returns the bytes copied, not
    /// counting the surplus.
    fn read_dev(&mut self, buf: &mut [u8]) -> Result<usize, SwitchError> {
        let supplied = match self.bus.request_from(self.addr, buf.len()) {
            Ok(supplied) => supplied,
            Err(err) => {
                self.last_error = -err.code;
                return Err(err.into());
            }
        };

        let n = supplied.len().min(buf.len());
        buf[..n].copy_from_slice(&supplied[..n]);
        if supplied.len() > buf.len() {
            trace!(surplus = supplied.len() - buf.len(), "discarding surplus bytes from slave");
        }
        self.last_error = n as i32;
        Ok(n)
    }

    /// Register read convention: one opcode byte out, `buf.len()` bytes in.
    /// A failed opcode write short-circuits without touching the bus again.
    fn read_reg(&mut self, op: Opcode, buf: &mut [u8]) -> Result<usize, SwitchError> {
        self.write_dev(&[op.into()])?;
        self.read_dev(buf)
    }
}
