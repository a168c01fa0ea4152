//! Softwire Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that the Softwire
//! protocol engines are written against. Chip-specific HALs (RP2040,
//! STM32, host simulators, ...) implement these traits; the engines stay
//! portable.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Device drivers (gauges, sensors, ...)  │
//! └─────────────────────────────────────────┘
//!                     │ i2c::I2cBus
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Protocol engines (softwire-i2c, ...)   │
//! └─────────────────────────────────────────┘
//!                     │ gpio::FlexPin
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Chip HAL / simulator (softwire-sim)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::FlexPin`] - direction-switchable digital pin
//! - [`i2c::I2cBus`] - portable I2C master operations

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use gpio::{Edge, FlexPin, Level, Pull};
pub use i2c::{I2cBus, I2cConfig};
