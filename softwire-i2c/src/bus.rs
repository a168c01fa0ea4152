//! Transaction API: locked access to the protocol engine

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embedded_hal::delay::DelayNs;
use softwire_hal::gpio::FlexPin;
use softwire_hal::i2c::{I2cBus, I2cConfig};

use crate::addr::Addr;
use crate::engine::Engine;
use crate::error::Error;

/// Bit-banged I2C master over two direction-switched lines
///
/// Transactions are serialized by an internal bus lock: at most one
/// executes at a time, and a second caller blocks until the first
/// (including its stop condition) completes. The raw mutex type `M` is
/// the integrator's choice; `CriticalSectionRawMutex` additionally keeps
/// a transaction from being preempted mid-waveform, which avoids
/// pathological slave timeouts on tightly scheduled systems.
///
/// Every transaction that issues a start condition matches it with
/// exactly one stop condition on every exit path, so the bus is never
/// left driven after a failure.
pub struct SoftI2c<M: RawMutex, SCL, SDA, D> {
    inner: Mutex<M, RefCell<Engine<SCL, SDA, D>>>,
}

impl<M, SCL, SDA, D, E> SoftI2c<M, SCL, SDA, D>
where
    M: RawMutex,
    SCL: FlexPin<Error = E>,
    SDA: FlexPin<Error = E>,
    D: DelayNs,
{
    /// Create a master over the given clock and data lines
    ///
    /// Both lines are configured as pulled-up inputs so the bus idles
    /// high. Pins may be passed by value or as `&mut` borrows; the
    /// master holds them for its whole lifetime either way.
    pub fn new(scl: SCL, sda: SDA, delay: D, config: I2cConfig) -> Result<Self, Error<E>> {
        let engine = Engine::bind(scl, sda, delay, config)?;
        Ok(Self {
            inner: Mutex::new(RefCell::new(engine)),
        })
    }

    /// Standard transaction: optional address phase, write phase, read
    /// phase
    ///
    /// With [`Addr::Device`], the address byte carries the read flag
    /// when `write` is empty (a read-only transaction) and the write
    /// flag otherwise. [`Addr::Skip`] sends the payload with no address
    /// framing. `read.len()` determines how many bytes are read.
    ///
    /// On error the read buffer may be partially filled; its contents
    /// are only defined when the call succeeds. No retries are made.
    pub fn tx(&self, addr: Addr, write: &[u8], read: &mut [u8]) -> Result<(), Error<E>> {
        // Validate before touching the wire at all.
        let read_only = write.is_empty();
        let addr_byte = addr.encode(read_only).map_err(Error::AddressOutOfRange)?;
        self.inner.lock(|cell| {
            let mut engine = cell.borrow_mut();
            let body = Self::tx_body(&mut engine, addr_byte, write, read);
            // Stop runs on every exit path so the bus is never left
            // driven; the body's error wins if both fail.
            let stop = engine.stop();
            body.and(stop)
        })
    }

    fn tx_body(
        engine: &mut Engine<SCL, SDA, D>,
        addr_byte: Option<u8>,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<E>> {
        engine.start()?;
        if let Some(byte) = addr_byte {
            if !engine.write_byte(byte)? {
                return Err(Error::Nack);
            }
        }
        for &byte in write {
            if !engine.write_byte(byte)? {
                return Err(Error::Nack);
            }
        }
        for slot in read.iter_mut() {
            *slot = engine.read_byte()?;
        }
        Ok(())
    }

    /// Register read with a repeated start
    ///
    /// Sequence: a start/stop wake pulse (some slaves, battery gauges in
    /// particular, sleep between polls and miss the first start), then
    /// start, address in write direction, the `write` bytes (typically
    /// one register selector), a second start with no stop in between,
    /// address in read direction, then `read.len()` bytes.
    pub fn read_repeated_start(
        &self,
        addr: Addr,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<E>> {
        let write_addr = addr.encode(false).map_err(Error::AddressOutOfRange)?;
        let read_addr = addr.encode(true).map_err(Error::AddressOutOfRange)?;
        self.inner.lock(|cell| {
            let mut engine = cell.borrow_mut();
            let body = Self::register_read_body(&mut engine, write_addr, read_addr, write, read);
            let stop = engine.stop();
            body.and(stop)
        })
    }

    fn register_read_body(
        engine: &mut Engine<SCL, SDA, D>,
        write_addr: Option<u8>,
        read_addr: Option<u8>,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Error<E>> {
        engine.wake_pulse()?;
        engine.start()?;
        if let Some(byte) = write_addr {
            if !engine.write_byte(byte)? {
                return Err(Error::Nack);
            }
        }
        for &byte in write {
            if !engine.write_byte(byte)? {
                return Err(Error::Nack);
            }
        }

        // The repeated start: a fresh start condition with no stop
        // before it, switching the bus to read direction.
        engine.start()?;
        if let Some(byte) = read_addr {
            if !engine.write_byte(byte)? {
                return Err(Error::Nack);
            }
        }
        for slot in read.iter_mut() {
            *slot = engine.read_byte()?;
        }
        Ok(())
    }

    /// Reconfigure the bus frequency
    ///
    /// Takes the bus lock, so a transaction already in flight finishes
    /// at its original speed.
    pub fn set_speed(&self, frequency_hz: u32) -> Result<(), Error<E>> {
        self.inner.lock(|cell| {
            cell.borrow_mut().set_speed(frequency_hz);
            Ok(())
        })
    }

    /// Read-only access to the two line handles, for diagnostics
    pub fn with_pins<R>(&self, f: impl FnOnce(&SCL, &SDA) -> R) -> R {
        self.inner.lock(|cell| {
            let engine = cell.borrow();
            f(engine.scl_pin(), engine.sda_pin())
        })
    }
}

impl<M, SCL, SDA, D, E> I2cBus for SoftI2c<M, SCL, SDA, D>
where
    M: RawMutex,
    SCL: FlexPin<Error = E>,
    SDA: FlexPin<Error = E>,
    D: DelayNs,
    E: fmt::Debug,
{
    type Error = Error<E>;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.tx(Addr::Device(address), data, &mut [])
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.tx(Addr::Device(address), &[], buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.read_repeated_start(Addr::Device(address), write_data, read_buf)
    }
}
