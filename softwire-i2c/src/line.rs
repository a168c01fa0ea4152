//! Open-drain emulation for a single bus line

use softwire_hal::gpio::{Edge, FlexPin, Level, Pull};

/// One bus line driven open-drain by direction switching
///
/// The line is never driven high. Releasing switches it to a pulled-up
/// input so the external pull-up (or an idle slave) raises it; that
/// avoids a wired-high clash when a slave drives the wire at the same
/// time. Both operations write an absolute pin configuration, so
/// repeating one is a no-op in effect.
pub(crate) struct OpenDrainLine<P> {
    pin: P,
}

impl<P: FlexPin> OpenDrainLine<P> {
    /// Take over a line and leave it released (idle high)
    ///
    /// The bus spec calls for idling high (UM10204 section 3.1.1).
    pub fn bind(mut pin: P) -> Result<Self, P::Error> {
        pin.set_input(Pull::Up, Edge::None)?;
        Ok(Self { pin })
    }

    /// Release the line: input with pull-up, external pull raises it
    pub fn release(&mut self) -> Result<(), P::Error> {
        self.pin.set_input(Pull::Up, Edge::None)
    }

    /// Drive the line low
    pub fn pull_low(&mut self) -> Result<(), P::Error> {
        self.pin.set_output(Level::Low)
    }

    /// Set the line to a logic level, open-drain style
    pub fn set(&mut self, level: Level) -> Result<(), P::Error> {
        match level {
            Level::High => self.release(),
            Level::Low => self.pull_low(),
        }
    }

    /// Read the current level of the wire
    pub fn sample(&mut self) -> Result<Level, P::Error> {
        self.pin.read()
    }

    /// The underlying pin handle, for diagnostics
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
