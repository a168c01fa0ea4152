//! GPIO pin abstractions
//!
//! Provides the direction-switchable pin capability that software bus
//! engines need to emulate open-drain signaling on push-pull hardware.

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level == Level::High
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Pull resistor configuration for an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No internal pull resistor
    None,
    /// Internal pull-up enabled
    Up,
    /// Internal pull-down enabled
    Down,
}

/// Edge detection configuration for an input
///
/// Bus engines that poll the line level pass [`Edge::None`]; the variants
/// exist so interrupt-driven implementations can share the same trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// No edge detection
    None,
    /// Detect low-to-high transitions
    Rising,
    /// Detect high-to-low transitions
    Falling,
    /// Detect both transitions
    Both,
}

/// Digital pin whose direction can be switched at runtime
///
/// This is the capability a bit-banged open-drain bus needs: a line is
/// "released" by switching it to a pulled-up input (the external pull-up
/// raises it) and "driven" by switching it to an output. Implementations
/// must apply each call as an absolute configuration, so repeating a call
/// with the same arguments is a no-op in effect.
pub trait FlexPin {
    /// Error type for pin operations
    type Error;

    /// Configure the pin as an input with the given pull and edge detection
    fn set_input(&mut self, pull: Pull, edge: Edge) -> Result<(), Self::Error>;

    /// Configure the pin as an output driving the given level
    fn set_output(&mut self, level: Level) -> Result<(), Self::Error>;

    /// Read the current level of the line
    fn read(&mut self) -> Result<Level, Self::Error>;
}

// Forwarding impl so a bus master can borrow its lines for the duration
// of its lifetime instead of taking them by value.
impl<T: FlexPin + ?Sized> FlexPin for &mut T {
    type Error = T::Error;

    fn set_input(&mut self, pull: Pull, edge: Edge) -> Result<(), Self::Error> {
        (**self).set_input(pull, edge)
    }

    fn set_output(&mut self, level: Level) -> Result<(), Self::Error> {
        (**self).set_output(level)
    }

    fn read(&mut self) -> Result<Level, Self::Error> {
        (**self).read()
    }
}
