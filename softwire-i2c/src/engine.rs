//! Bus state machine: start/stop conditions and byte-level I/O
//!
//! Every waveform here follows NXP UM10204. Data must be stable while
//! the clock is high (section 3.1.3); start and stop are the two
//! permitted exceptions (section 3.1.4).

use embedded_hal::delay::DelayNs;
use softwire_hal::gpio::{FlexPin, Level};
use softwire_hal::i2c::I2cConfig;

use crate::error::Error;
use crate::line::OpenDrainLine;

/// Half-cycle duration for a target bus frequency
pub(crate) const fn half_cycle_ns(frequency_hz: u32) -> u32 {
    let hz = if frequency_hz == 0 { 1 } else { frequency_hz };
    500_000_000 / hz
}

/// The protocol engine: two open-drain lines, a delay source and the
/// half-cycle duration derived from the configured frequency
///
/// All methods assume exclusive access; serialization is the caller's
/// job (see [`SoftI2c`](crate::SoftI2c)).
pub(crate) struct Engine<SCL, SDA, D> {
    scl: OpenDrainLine<SCL>,
    sda: OpenDrainLine<SDA>,
    delay: D,
    half_cycle_ns: u32,
    stretch_poll_ns: Option<u32>,
}

impl<SCL, SDA, D, E> Engine<SCL, SDA, D>
where
    SCL: FlexPin<Error = E>,
    SDA: FlexPin<Error = E>,
    D: DelayNs,
{
    /// Take over both lines and leave the bus idle (both released high)
    pub fn bind(scl: SCL, sda: SDA, delay: D, config: I2cConfig) -> Result<Self, Error<E>> {
        let scl = OpenDrainLine::bind(scl).map_err(Error::Pin)?;
        let sda = OpenDrainLine::bind(sda).map_err(Error::Pin)?;
        Ok(Self {
            scl,
            sda,
            delay,
            half_cycle_ns: half_cycle_ns(config.frequency),
            stretch_poll_ns: config.stretch_poll_ns,
        })
    }

    /// Recompute the half-cycle for a new target frequency
    pub fn set_speed(&mut self, frequency_hz: u32) {
        self.half_cycle_ns = half_cycle_ns(frequency_hz);
    }

    pub fn scl_pin(&self) -> &SCL {
        self.scl.pin()
    }

    pub fn sda_pin(&self) -> &SDA {
        self.sda.pin()
    }

    fn wait(&mut self) {
        self.delay.delay_ns(self.half_cycle_ns);
    }

    /// Start condition: SDA falls while SCL is high
    ///
    /// Ends with SCL and SDA low.
    pub fn start(&mut self) -> Result<(), Error<E>> {
        // Must begin with both lines high. In multi-master mode we would
        // have to sense SDA here first; single master, so no sensing.
        self.sda.release().map_err(Error::Pin)?;
        self.scl.release().map_err(Error::Pin)?;
        self.wait();

        self.sda.pull_low().map_err(Error::Pin)?;
        self.wait();
        self.scl.pull_low().map_err(Error::Pin)?;
        Ok(())
    }

    /// Stop condition: SDA rises while SCL is high
    ///
    /// Expects SCL low; ends with both lines released high. The highs
    /// come from releasing the lines, never from driving them.
    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.scl.pull_low().map_err(Error::Pin)?;
        self.wait();
        self.scl.release().map_err(Error::Pin)?;
        self.wait();
        self.sda.release().map_err(Error::Pin)?;
        self.wait();
        Ok(())
    }

    /// Start/stop pulse with no data, used to wake a sleeping slave
    pub fn wake_pulse(&mut self) -> Result<(), Error<E>> {
        self.start()?;
        self.wait();
        self.stop()?;
        self.wait();
        Ok(())
    }

    /// Write 8 bits MSB-first, then sample the acknowledge bit
    ///
    /// Expects SCL low. Ends with SCL low and SDA released. Honors a
    /// slave stretching the clock during the acknowledge window.
    pub fn write_byte(&mut self, byte: u8) -> Result<bool, Error<E>> {
        self.wait();

        for bit in (0..8).rev() {
            let level = Level::from(byte & (1 << bit) != 0);
            self.sda.set(level).map_err(Error::Pin)?;
            self.wait();
            self.scl.release().map_err(Error::Pin)?;
            self.wait();
            self.scl.pull_low().map_err(Error::Pin)?;
        }

        // 9th clock is the acknowledge (UM10204 section 3.1.6). Hand
        // SDA to the slave and let it pull the line low.
        self.wait();
        self.scl.release().map_err(Error::Pin)?;
        self.sda.release().map_err(Error::Pin)?;

        // The slave may hold SCL low until it is ready (clock stretch).
        let poll_ns = self.stretch_poll_ns.unwrap_or(self.half_cycle_ns);
        while self.scl.sample().map_err(Error::Pin)? == Level::Low {
            self.delay.delay_ns(poll_ns);
        }

        let ack = self.sda.sample().map_err(Error::Pin)? == Level::Low;

        self.wait();
        self.scl.pull_low().map_err(Error::Pin)?;
        self.wait();
        Ok(ack)
    }

    /// Read 8 bits MSB-first, then force the acknowledge bit low
    ///
    /// Expects SCL low. Ends with SDA driven low and SCL released.
    ///
    /// The acknowledge is always sent, so the slave never sees the
    /// terminating NACK a strict multi-byte read would end with; the
    /// stop condition that follows signals the end of the transfer
    /// instead.
    pub fn read_byte(&mut self) -> Result<u8, Error<E>> {
        let mut byte = 0u8;

        self.sda.release().map_err(Error::Pin)?;

        for bit in (0..8).rev() {
            self.wait();
            self.scl.release().map_err(Error::Pin)?;
            self.wait();
            if self.sda.sample().map_err(Error::Pin)? == Level::High {
                byte |= 1 << bit;
            }
            self.scl.pull_low().map_err(Error::Pin)?;
        }

        self.wait();
        self.sda.pull_low().map_err(Error::Pin)?;
        self.scl.release().map_err(Error::Pin)?;
        self.wait();

        Ok(byte)
    }
}
