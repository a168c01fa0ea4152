//! Slave addressing

/// Target of a transaction
///
/// [`Addr::Skip`] omits the address phase entirely: the payload bytes go
/// out with no framing. Useful when experimenting with non-standard
/// devices that speak the electrical protocol but not the addressing
/// scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Addr {
    /// 7-bit device address (`0x00..=0x7F`)
    Device(u8),
    /// Send no address byte
    Skip,
}

impl Addr {
    /// Largest encodable device address
    pub const MAX: u8 = 0x7F;

    /// Encode the address byte for the wire, or `None` for [`Addr::Skip`]
    ///
    /// The 7-bit address is shifted left one bit and the read/write flag
    /// goes in the low bit (UM10204 section 3.1.10). Addresses above
    /// [`Addr::MAX`] are rejected with the offending value.
    pub(crate) fn encode(self, read: bool) -> Result<Option<u8>, u8> {
        match self {
            Addr::Skip => Ok(None),
            Addr::Device(a) if a > Self::MAX => Err(a),
            Addr::Device(a) => Ok(Some(a << 1 | read as u8)),
        }
    }
}

impl From<u8> for Addr {
    fn from(address: u8) -> Self {
        Addr::Device(address)
    }
}
