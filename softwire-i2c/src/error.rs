//! Transaction error types

use core::fmt;

/// Error from a bus transaction
///
/// Generic over the pin error of the underlying [`FlexPin`]
/// (softwire_hal::gpio::FlexPin) implementation; pin failures are
/// propagated unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Address does not fit in 7 bits (10-bit addressing is unsupported)
    AddressOutOfRange(u8),
    /// A written byte (address byte included) was not acknowledged
    Nack,
    /// The underlying pin operation failed
    Pin(E),
}

impl<E: fmt::Debug> embedded_hal::i2c::Error for Error<E> {
    fn kind(&self) -> embedded_hal::i2c::ErrorKind {
        use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
        match self {
            Error::Nack => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            Error::AddressOutOfRange(_) | Error::Pin(_) => ErrorKind::Other,
        }
    }
}
