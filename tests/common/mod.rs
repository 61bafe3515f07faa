//! Common test utilities: a scripted mock bus and response builders.

// Shared across multiple test files; not every item is used in every file.
#![allow(dead_code)]

use std::collections::VecDeque;

use grove_multi_switch::GroveMultiSwitch;
use grove_multi_switch::bus::{BusError, SwitchBus};
use grove_multi_switch::protocol::{DEFAULT_I2C_ADDR, VERSION_SIZE};

/// One scripted bus transaction.
#[derive(Debug, Clone)]
pub enum BusOp {
    /// Expect a write of exactly these bytes; answer with the given result.
    Write {
        bytes: Vec<u8>,
        result: Result<(), i32>,
    },
    /// Expect a request for exactly `requested` bytes; supply the payload
    /// (which may be shorter or longer than requested) or fail.
    Read {
        requested: usize,
        result: Result<Vec<u8>, i32>,
    },
}

/// Mock bus that replays a script and panics on any deviation.
pub struct MockBus {
    addr: u8,
    ops: VecDeque<BusOp>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::with_address(DEFAULT_I2C_ADDR)
    }

    pub fn with_address(addr: u8) -> Self {
        Self {
            addr,
            ops: VecDeque::new(),
        }
    }

    pub fn expect_write(&mut self, bytes: &[u8]) -> &mut Self {
        self.ops.push_back(BusOp::Write {
            bytes: bytes.to_vec(),
            result: Ok(()),
        });
        self
    }

    pub fn expect_write_err(&mut self, bytes: &[u8], code: i32) -> &mut Self {
        self.ops.push_back(BusOp::Write {
            bytes: bytes.to_vec(),
            result: Err(code),
        });
        self
    }

    pub fn expect_read(&mut self, requested: usize, supply: &[u8]) -> &mut Self {
        self.ops.push_back(BusOp::Read {
            requested,
            result: Ok(supply.to_vec()),
        });
        self
    }

    pub fn expect_read_err(&mut self, requested: usize, code: i32) -> &mut Self {
        self.ops.push_back(BusOp::Read {
            requested,
            result: Err(code),
        });
        self
    }

    pub fn remaining(&self) -> usize {
        self.ops.len()
    }
}

impl SwitchBus for MockBus {
    fn write_to(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        assert_eq!(addr, self.addr, "write to unexpected address");
        match self.ops.pop_front() {
            Some(BusOp::Write { bytes: expect, result }) => {
                assert_eq!(bytes, expect.as_slice(), "unexpected write payload");
                result.map_err(|code| BusError { code })
            }
            other => panic!("unexpected write {bytes:02x?}, script had {other:?}"),
        }
    }

    fn request_from(&mut self, addr: u8, len: usize) -> Result<Vec<u8>, BusError> {
        assert_eq!(addr, self.addr, "read from unexpected address");
        match self.ops.pop_front() {
            Some(BusOp::Read { requested, result }) => {
                assert_eq!(len, requested, "unexpected read length");
                result.map_err(|code| BusError { code })
            }
            other => panic!("unexpected read of {len} bytes, script had {other:?}"),
        }
    }
}

/// Little-endian identity response for a vendor/product pair.
pub fn id_bytes(vid: u16, pid: u16) -> [u8; 4] {
    ((u32::from(vid) << 16) | u32::from(pid)).to_le_bytes()
}

/// Fixed-layout version response with the significant digits at offsets
/// 6 and 8, the way the firmware formats it.
pub fn version_bytes(major: u8, minor: u8) -> Vec<u8> {
    let mut out = b"SW   V . .".to_vec();
    assert_eq!(out.len(), VERSION_SIZE);
    out[6] = b'0' + major;
    out[8] = b'0' + minor;
    out
}

/// Event register response: little-endian mask plus per-slot status bytes.
pub fn event_bytes(mask: u32, buttons: &[u8]) -> Vec<u8> {
    let mut out = mask.to_le_bytes().to_vec();
    out.extend_from_slice(buttons);
    out
}

/// Script a clean first-attempt probe plus version read on the mock.
pub fn script_init(bus: &mut MockBus, pid: u16, major: u8, minor: u8) {
    bus.expect_write(&[0x00])
        .expect_read(4, &id_bytes(0x2886, pid))
        .expect_write(&[0xE2])
        .expect_read(10, &version_bytes(major, minor));
}

/// A fully initialized device session backed by a scripted mock.
pub fn probed_device(pid: u16, major: u8, minor: u8) -> GroveMultiSwitch<MockBus> {
    let mut bus = MockBus::new();
    script_init(&mut bus, pid, major, minor);
    let mut device = GroveMultiSwitch::new(bus);
    device.init().expect("scripted init must succeed");
    device
}

/// Opt-in tracing output for debugging failing tests.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
