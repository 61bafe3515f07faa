//! Transport seam between the driver and the I2C bus.
//!
//! The switch firmware has no true addressed register model: the slave keeps
//! an internal read pointer that free-runs independently of the master's
//! framing, so a read may clock out more bytes than the master asked for.
//! [`SwitchBus`] exposes that reality instead of hiding it: a request
//! returns everything the slave supplied and the driver is responsible for
//! discarding any surplus so the next transaction starts aligned.

use thiserror::Error;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c, NoAcknowledgeSource};

/// Transmission failure reported by the bus layer.
///
/// `code` is the Wire-style status byte: 2 = address NACK, 3 = data NACK,
/// 4 = other bus error, 5 = timeout. It is kept raw so the session can
/// mirror it into its errno-style diagnostic field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("bus transmission failed with status {code}")]
pub struct BusError {
    pub code: i32,
}

/// Blocking master-side I2C primitives used by the driver.
///
/// Implementations perform one bus transaction per call and never retry;
/// recovery policy lives in the driver.
pub trait SwitchBus {
    /// Write `bytes` to `addr` in a single transaction.
    fn write_to(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Request `len` bytes from `addr` and return whatever the slave
    /// actually supplied, which may be fewer or more bytes than requested.
    fn request_from(&mut self, addr: u8, len: usize) -> Result<Vec<u8>, BusError>;
}

/// Adapter running the [`SwitchBus`] contract over any
/// [`embedded_hal::i2c::I2c`] implementation.
///
/// An embedded-hal bus fills the read buffer exactly, so the over-supply
/// path of the contract never triggers through this adapter.
pub struct HalBus<I> {
    i2c: I,
}

impl<I> HalBus<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Give the wrapped bus back to the caller.
    pub fn release(self) -> I {
        self.i2c
    }
}

impl<I: I2c> SwitchBus for HalBus<I> {
    fn write_to(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.i2c
            .write(addr, bytes)
            .map_err(|e| BusError { code: status_code(e.kind()) })
    }

    fn request_from(&mut self, addr: u8, len: usize) -> Result<Vec<u8>, BusError> {
        let mut buf = vec![0u8; len];
        self.i2c
            .read(addr, &mut buf)
            .map_err(|e| BusError { code: status_code(e.kind()) })?;
        Ok(buf)
    }
}

/// Map an embedded-hal error kind onto the Wire status code convention.
fn status_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => 2,
        ErrorKind::NoAcknowledge(_) => 3,
        _ => 4,
    }
}
