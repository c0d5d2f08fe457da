//! Bus transport used to talk to the controller.
//!
//! The driver only needs to claim the bus at a given clock, shift bytes out and
//! release it again. HALs that can reconfigure their SPI peripheral per
//! transaction implement [`DisplayBus`] directly; everything else can be
//! wrapped in [`ExclusiveSpi`].

use core::fmt;

use embedded_hal::blocking::spi;
use embedded_hal::spi::{Mode, Phase, Polarity, MODE_0};

/// Default SPI clock, the fastest the GC9A01 is specified for.
pub const DEFAULT_FREQUENCY: u32 = 60_000_000;

/// Order in which the bits of each byte are shifted out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}

/// Clock settings applied whenever a transaction opens.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    pub mode: Mode,
    pub bit_order: BitOrder,
}

// `Mode` has no `Debug` impl in embedded-hal 0.2
impl fmt::Debug for SpiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let polarity = match self.mode.polarity {
            Polarity::IdleLow => "IdleLow",
            Polarity::IdleHigh => "IdleHigh",
        };
        let phase = match self.mode.phase {
            Phase::CaptureOnFirstTransition => "CaptureOnFirstTransition",
            Phase::CaptureOnSecondTransition => "CaptureOnSecondTransition",
        };
        f.debug_struct("SpiConfig")
            .field("frequency", &self.frequency)
            .field("polarity", &polarity)
            .field("phase", &phase)
            .field("bit_order", &self.bit_order)
            .finish()
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        SpiConfig {
            frequency: DEFAULT_FREQUENCY,
            mode: MODE_0,
            bit_order: BitOrder::MsbFirst,
        }
    }
}

/// Byte oriented, clocked transport to the display.
pub trait DisplayBus {
    type Error;

    /// One-time bring-up of the peripheral, called from `begin`.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Claims the bus with the given clock settings.
    fn open(&mut self, config: &SpiConfig) -> Result<(), Self::Error>;

    /// Releases the bus.
    fn close(&mut self) -> Result<(), Self::Error>;

    /// Blocks until every byte has been shifted out.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: DisplayBus + ?Sized> DisplayBus for &mut T {
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn open(&mut self, config: &SpiConfig) -> Result<(), Self::Error> {
        T::open(self, config)
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        T::close(self)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write(self, bytes)
    }
}

/// Adapter for an SPI peripheral the display owns on its own.
///
/// The clock of an `embedded-hal` SPI peripheral is fixed when the HAL builds
/// it, so opening and closing are no-ops here.
pub struct ExclusiveSpi<SPI> {
    spi: SPI,
}

impl<SPI> ExclusiveSpi<SPI>
where
    SPI: spi::Write<u8>,
{
    pub fn new(spi: SPI) -> Self {
        ExclusiveSpi { spi }
    }

    /// Gives back the wrapped peripheral.
    pub fn into_inner(self) -> SPI {
        self.spi
    }
}

impl<SPI> DisplayBus for ExclusiveSpi<SPI>
where
    SPI: spi::Write<u8>,
{
    type Error = SPI::Error;

    fn open(&mut self, _config: &SpiConfig) -> Result<(), Self::Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(bytes)
    }
}
