//! Host-side simulation of a two-wire open-drain bus
//!
//! Models the electrical behavior the Softwire engines depend on: each
//! line is the wired-AND of the master's and the slave's drive, with a
//! pull-up raising a fully released line. A register-model slave decodes
//! start/stop conditions and bit edges exactly as a hardware device
//! would, so the engines can be tested on the host down to individual
//! transitions.
//!
//! Everything here runs synchronously in the calling thread: the slave
//! reacts inside the master's own pin operations, and
//! [`SimDelay`] records waits instead of sleeping, so a full transaction
//! takes microseconds of wall time.

#![deny(unsafe_code)]

mod delay;
mod slave;
mod wire;

pub use delay::SimDelay;
pub use slave::{AckPolicy, SimSlave};
pub use wire::{SimBus, SimPin, SimPinError};
