//! Bit-banged I2C master
//!
//! Implements the I2C master protocol entirely in software on two
//! [`FlexPin`](softwire_hal::gpio::FlexPin) lines, for boards where no
//! hardware controller is available (or none is free). Open-drain
//! signaling is emulated by direction switching: a line is released by
//! reconfiguring it as a pulled-up input and driven low as an output, so
//! the master never fights a slave for the wire.
//!
//! Protocol reference: NXP UM10204 (I2C-bus specification and user
//! manual).
//!
//! # Features
//!
//! - Single-master point-to-point transfers at an arbitrary frequency
//! - Clock stretching honored during the acknowledge clock
//! - Repeated-start register reads ([`SoftI2c::read_repeated_start`])
//! - [`Addr::Skip`] sends raw bytes with no address framing
//! - Transactions serialized by an internal bus lock; the raw mutex type
//!   is chosen by the integrator (`CriticalSectionRawMutex` on firmware
//!   targets also keeps a transaction from being preempted mid-waveform)
//!
//! # Limitations
//!
//! - Single master only: no arbitration, no bus sensing before start
//! - 7-bit addressing only
//! - Read bytes are always acknowledged, including the last one; the
//!   stop condition that follows ends the transfer, which well-behaved
//!   slaves tolerate (see [`SoftI2c::tx`])
//!
//! # Example
//!
//! ```ignore
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use softwire_hal::i2c::I2cConfig;
//! use softwire_i2c::{Addr, SoftI2c};
//!
//! let bus: SoftI2c<CriticalSectionRawMutex, _, _, _> =
//!     SoftI2c::new(scl, sda, delay, I2cConfig::with_frequency(10_000))?;
//!
//! // Read one register from a battery gauge at 0x0B
//! let mut rsoc = [0u8; 1];
//! bus.read_repeated_start(Addr::Device(0x0B), &[0x0D], &mut rsoc)?;
//! ```

#![no_std]
#![deny(unsafe_code)]

mod addr;
mod bus;
mod engine;
mod error;
mod line;

pub use addr::Addr;
pub use bus::SoftI2c;
pub use error::Error;
