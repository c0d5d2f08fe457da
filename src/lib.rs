#![cfg_attr(not(test), no_std)]

//! This crate provides a GC9A01 driver to connect to round 240x240 TFT displays.
//!
//! Drawing goes through the [`Graphics`] trait: public calls clip against the
//! rotated canvas and the driver turns the result into address window and
//! pixel data traffic. The last programmed window is cached, so consecutive
//! operations on the same rows or columns skip the corresponding command.

pub mod bus;
pub mod gfx;
pub mod init;
pub mod instruction;

#[cfg(test)]
mod test_spy;

use crate::bus::{DisplayBus, SpiConfig};
use crate::gfx::Canvas;
use crate::init::INIT_SEQUENCE;
use crate::instruction::Instruction;

pub use crate::bus::{BitOrder, ExclusiveSpi};
pub use crate::gfx::{Graphics, Rect};

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::spi::Mode;
use log::{debug, trace};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Panel width in pixels.
pub const WIDTH: i16 = 240;
/// Panel height in pixels.
pub const HEIGHT: i16 = 240;

/// Pixels per bus write when streaming colors.
const CHUNK_PIXELS: usize = 64;
const CHUNK_BYTES: usize = CHUNK_PIXELS * 2;

/// Forces the next address window to be written.
const UNSET: (u16, u16) = (0xFFFF, 0xFFFF);

// Memory Access Control bits
const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;
const MADCTL_BGR: u8 = 0x08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<BusE> {
    Bus(BusE),
    /// Driving one of the control pins failed
    Pin,
}

/// Display rotation, clockwise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, FromPrimitive)]
pub enum Rotation {
    #[default]
    Deg0 = 0,
    Deg90 = 1,
    Deg180 = 2,
    Deg270 = 3,
}

impl Rotation {
    /// Memory Access Control value for this rotation. The panel is wired BGR.
    pub fn madctl(self) -> u8 {
        match self {
            Rotation::Deg0 => MADCTL_BGR | MADCTL_MX | MADCTL_MY,
            Rotation::Deg90 => MADCTL_BGR | MADCTL_MV | MADCTL_MY,
            Rotation::Deg180 => MADCTL_BGR,
            Rotation::Deg270 => MADCTL_BGR | MADCTL_MV | MADCTL_MX,
        }
    }
}

/// Bus and orientation settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub spi: SpiConfig,
    /// Rotation applied by `begin`, taken modulo 4
    pub rotation: u8,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    pub fn frequency(mut self, hz: u32) -> Self {
        self.spi.frequency = hz;
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.spi.mode = mode;
        self
    }

    pub fn bit_order(mut self, bit_order: BitOrder) -> Self {
        self.spi.bit_order = bit_order;
        self
    }

    pub fn rotation(mut self, rotation: u8) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Stand-in for a reset or backlight pin that is not connected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl OutputPin for NoPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// GC9A01 driver to connect to round TFT displays.
pub struct Gc9a01<BUS, DC, CS, RST = NoPin, BL = NoPin>
where
    BUS: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    bus: BUS,

    /// Data/command pin.
    dc: DC,

    /// Chip select pin
    cs: CS,

    /// Reset pin. Without one, `begin` falls back to a software reset.
    rst: Option<RST>,

    /// Backlight pin
    bl: Option<BL>,

    config: Config,
    canvas: Canvas,

    /// Open transaction brackets. The bus is claimed while this is non-zero.
    depth: usize,

    /// Last column and row ranges sent to the controller
    columns: (u16, u16),
    rows: (u16, u16),

    /// Global image offset
    col_start: u16,
    row_start: u16,

    madctl: u8,
    backlight_level: u8,
}

impl<BUS, DC, CS, RST, BL> Gc9a01<BUS, DC, CS, RST, BL>
where
    BUS: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    /// Creates a new driver instance. Nothing is sent until [`Gc9a01::begin`].
    pub fn new(bus: BUS, dc: DC, cs: CS, rst: Option<RST>, bl: Option<BL>, config: Config) -> Self {
        let mut canvas = Canvas::new(WIDTH, HEIGHT);
        canvas.set_rotation(config.rotation);

        Gc9a01 {
            bus,
            dc,
            cs,
            rst,
            bl,
            config,
            canvas,
            depth: 0,
            columns: UNSET,
            rows: UNSET,
            col_start: 0,
            row_start: 0,
            madctl: MADCTL_BGR,
            backlight_level: u8::MAX,
        }
    }

    /// Brings the panel up: idles the control lines, resets the controller,
    /// replays the init sequence and applies the current rotation.
    ///
    /// A non-zero `speed` replaces the configured clock frequency. The clock
    /// settings only take effect on buses that apply them in
    /// [`DisplayBus::open`]; [`ExclusiveSpi`] keeps whatever clock the HAL
    /// configured, so there `speed`, `Config::mode` and `Config::bit_order`
    /// are informational.
    pub fn begin<DELAY>(&mut self, speed: u32, delay: &mut DELAY) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        if speed > 0 {
            self.config.spi.frequency = speed;
        }
        debug!("gc9a01: begin at {} Hz", self.config.spi.frequency);

        self.cs.set_high().map_err(|_| Error::Pin)?;
        if let Some(rst) = self.rst.as_mut() {
            rst.set_high().map_err(|_| Error::Pin)?;
        }
        if let Some(bl) = self.bl.as_mut() {
            bl.set_low().map_err(|_| Error::Pin)?;
        }
        self.bus.init().map_err(Error::Bus)?;

        self.hardware_reset(delay)?;

        let rotation = self.canvas.rotation();
        self.transaction(|display| {
            display.run_init_sequence(delay)?;
            display.set_rotation(rotation)
        })?;

        if self.bl.is_some() {
            self.set_backlight(true)?;
        }
        Ok(())
    }

    /// Pulses the reset pin, or issues a software reset when there is none.
    pub fn hardware_reset<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        if let Some(rst) = self.rst.as_mut() {
            debug!("gc9a01: hardware reset");
            rst.set_high().map_err(|_| Error::Pin)?;
            delay.delay_ms(10);
            rst.set_low().map_err(|_| Error::Pin)?;
            delay.delay_ms(20);
            rst.set_high().map_err(|_| Error::Pin)?;
            // Minimum settle time after reset
            delay.delay_ms(120);
            return Ok(());
        }

        debug!("gc9a01: no reset pin, software reset");
        self.write_command_delayed(Instruction::SWRESET, &[], delay, 150)
    }

    fn run_init_sequence<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        for step in INIT_SEQUENCE {
            self.send_command(step.command(), step.params())?;
            if step.delay_ms() > 0 {
                delay.delay_ms(step.delay_ms());
            }
        }
        Ok(())
    }

    pub fn write_command(&mut self, command: Instruction, params: &[u8]) -> Result<(), Error<BUS::Error>> {
        self.send_command(command as u8, params)
    }

    /// Sends a command, then blocks for `ms` milliseconds.
    pub fn write_command_delayed<DELAY>(
        &mut self,
        command: Instruction,
        params: &[u8],
        delay: &mut DELAY,
        ms: u8,
    ) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        self.send_command(command as u8, params)?;
        if ms > 0 {
            delay.delay_ms(ms);
        }
        Ok(())
    }

    /// Writes a command byte and its parameters. The data/command line is
    /// left in data mode, ready for pixel data.
    fn send_command(&mut self, command: u8, params: &[u8]) -> Result<(), Error<BUS::Error>> {
        match Instruction::from_u8(command) {
            Some(instruction) => trace!("gc9a01: {:?} +{} bytes", instruction, params.len()),
            None => trace!("gc9a01: {:#04x} +{} bytes", command, params.len()),
        }

        self.transaction(|display| {
            display.dc.set_low().map_err(|_| Error::Pin)?;
            display.bus.write(&[command]).map_err(Error::Bus)?;
            display.dc.set_high().map_err(|_| Error::Pin)?;
            if !params.is_empty() {
                display.bus.write(params).map_err(Error::Bus)?;
            }
            Ok(())
        })
    }

    fn start_data(&mut self) -> Result<(), Error<BUS::Error>> {
        self.dc.set_high().map_err(|_| Error::Pin)
    }

    /// Selects the region subsequent pixel data is written into and starts a
    /// memory write.
    ///
    /// Column and row ranges are only sent when they differ from the ones
    /// already programmed.
    pub fn set_address_window(&mut self, x: u16, y: u16, w: u16, h: u16) -> Result<(), Error<BUS::Error>> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        let x0 = x.wrapping_add(self.col_start);
        let y0 = y.wrapping_add(self.row_start);
        let columns = (x0, x0.wrapping_add(w - 1));
        let rows = (y0, y0.wrapping_add(h - 1));

        self.transaction(|display| {
            if display.columns != columns {
                display.send_command(Instruction::CASET as u8, &encode_range(columns))?;
                display.columns = columns;
            }
            if display.rows != rows {
                display.send_command(Instruction::RASET as u8, &encode_range(rows))?;
                display.rows = rows;
            }
            display.send_command(Instruction::RAMWR as u8, &[])
        })
    }

    /// Forgets the programmed address window.
    fn invalidate_window(&mut self) {
        self.columns = UNSET;
        self.rows = UNSET;
    }

    /// Streams `count` pixels of one color into the current window.
    fn write_color_repeated(&mut self, color: u16, count: u32) -> Result<(), Error<BUS::Error>> {
        if count == 0 {
            return Ok(());
        }
        let mut buffer = [0u8; CHUNK_BYTES];
        for pixel in buffer.chunks_exact_mut(2) {
            pixel.copy_from_slice(&color.to_be_bytes());
        }

        self.transaction(|display| {
            display.start_data()?;
            let mut remaining = count;
            while remaining > 0 {
                let batch = remaining.min(CHUNK_PIXELS as u32) as usize;
                display.bus.write(&buffer[..batch * 2]).map_err(Error::Bus)?;
                remaining -= batch as u32;
            }
            Ok(())
        })
    }

    /// Writes pixel colors sequentially into the current drawing window.
    ///
    /// The window must have been set with [`Gc9a01::set_address_window`];
    /// nothing is checked against the canvas.
    pub fn write_pixels_iter<P>(&mut self, colors: P) -> Result<(), Error<BUS::Error>>
    where
        P: IntoIterator<Item = u16>,
    {
        let mut colors = colors.into_iter().peekable();
        if colors.peek().is_none() {
            return Ok(());
        }
        let mut buffer = [0u8; CHUNK_BYTES];

        self.transaction(|display| {
            display.start_data()?;
            loop {
                let mut len = 0;
                for (slot, color) in buffer.chunks_exact_mut(2).zip(&mut colors) {
                    slot.copy_from_slice(&color.to_be_bytes());
                    len += 2;
                }
                if len == 0 {
                    break;
                }
                display.bus.write(&buffer[..len]).map_err(Error::Bus)?;
                if len < CHUNK_BYTES {
                    break;
                }
            }
            Ok(())
        })
    }

    pub fn invert_display(&mut self, invert: bool) -> Result<(), Error<BUS::Error>> {
        if invert {
            self.write_command(Instruction::INVON, &[])
        } else {
            self.write_command(Instruction::INVOFF, &[])
        }
    }

    pub fn display_on(&mut self, on: bool) -> Result<(), Error<BUS::Error>> {
        if on {
            self.write_command(Instruction::DISPON, &[])
        } else {
            self.write_command(Instruction::DISPOFF, &[])
        }
    }

    pub fn sleep_in<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        self.write_command_delayed(Instruction::SLPIN, &[], delay, 120)
    }

    pub fn sleep_out<DELAY>(&mut self, delay: &mut DELAY) -> Result<(), Error<BUS::Error>>
    where
        DELAY: DelayMs<u8>,
    {
        self.write_command_delayed(Instruction::SLPOUT, &[], delay, 120)
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), Error<BUS::Error>> {
        self.set_backlight_level(if on { u8::MAX } else { 0 })
    }

    /// The pin is switched, not dimmed: any non-zero level turns it on. The
    /// level itself is only remembered.
    pub fn set_backlight_level(&mut self, level: u8) -> Result<(), Error<BUS::Error>> {
        let Some(bl) = self.bl.as_mut() else {
            return Ok(());
        };
        if level > 0 {
            bl.set_high().map_err(|_| Error::Pin)?;
        } else {
            bl.set_low().map_err(|_| Error::Pin)?;
        }
        self.backlight_level = level;
        debug!("gc9a01: backlight {}", level);
        Ok(())
    }

    pub fn backlight_level(&self) -> u8 {
        self.backlight_level
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Releases the bus and pins.
    pub fn release(self) -> (BUS, DC, CS, Option<RST>, Option<BL>) {
        (self.bus, self.dc, self.cs, self.rst, self.bl)
    }
}

impl<BUS, DC, CS, RST, BL> Graphics for Gc9a01<BUS, DC, CS, RST, BL>
where
    BUS: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    type Error = Error<BUS::Error>;

    fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    fn start_write(&mut self) -> Result<(), Error<BUS::Error>> {
        if self.depth == 0 {
            self.bus.open(&self.config.spi).map_err(Error::Bus)?;
            if self.cs.set_low().is_err() {
                // Not claimed after all
                let _ = self.bus.close();
                return Err(Error::Pin);
            }
        }
        self.depth += 1;
        Ok(())
    }

    fn end_write(&mut self) -> Result<(), Error<BUS::Error>> {
        match self.depth {
            0 => Ok(()),
            1 => {
                self.depth = 0;
                let cs = self.cs.set_high().map_err(|_| Error::Pin);
                let close = self.bus.close().map_err(Error::Bus);
                cs.and(close)
            }
            _ => {
                self.depth -= 1;
                Ok(())
            }
        }
    }

    fn write_pixel(&mut self, x: i16, y: i16, color: u16) -> Result<(), Error<BUS::Error>> {
        if !self.canvas.contains(x, y) {
            return Ok(());
        }
        self.transaction(|display| {
            display.set_address_window(x as u16, y as u16, 1, 1)?;
            display.start_data()?;
            display.bus.write(&color.to_be_bytes()).map_err(Error::Bus)
        })
    }

    // Lines use the default, which lands in the windowed fill below.

    fn write_fill_rect(
        &mut self,
        x: i16,
        y: i16,
        w: i16,
        h: i16,
        color: u16,
    ) -> Result<(), Error<BUS::Error>> {
        if w <= 0 || h <= 0 || x < 0 || y < 0 {
            return Ok(());
        }
        let (w, h) = (w as u16, h as u16);
        self.transaction(|display| {
            display.set_address_window(x as u16, y as u16, w, h)?;
            display.write_color_repeated(color, u32::from(w) * u32::from(h))
        })
    }

    /// Streams `colors` into the window set beforehand with
    /// [`Gc9a01::set_address_window`].
    fn write_pixels(&mut self, colors: &[u16]) -> Result<(), Error<BUS::Error>> {
        self.write_pixels_iter(colors.iter().copied())
    }

    fn set_rotation(&mut self, r: u8) -> Result<(), Error<BUS::Error>> {
        self.canvas.set_rotation(r);
        let rotation = Rotation::from_u8(self.canvas.rotation()).unwrap_or_default();
        self.madctl = rotation.madctl();
        self.col_start = 0;
        self.row_start = 0;
        self.invalidate_window();
        debug!("gc9a01: rotation {:?}, madctl {:#04x}", rotation, self.madctl);

        let madctl = self.madctl;
        self.send_command(Instruction::MADCTL as u8, &[madctl])
    }
}

fn encode_range((start, end): (u16, u16)) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}

#[cfg(feature = "graphics")]
use embedded_graphics::{
    draw_target::DrawTarget,
    pixelcolor::{
        raw::{RawData, RawU16},
        Rgb565,
    },
    prelude::*,
    primitives::{ContainsPoint, PointsIter, Rectangle},
};

#[cfg(feature = "graphics")]
fn raw_color(color: Rgb565) -> u16 {
    RawU16::from(color).into_inner()
}

/// Converts an on-canvas rectangle, `None` when it is empty.
#[cfg(feature = "graphics")]
fn to_rect(area: &Rectangle) -> Option<Rect> {
    if area.size.width == 0 || area.size.height == 0 {
        return None;
    }
    Some(Rect::new(
        i16::try_from(area.top_left.x).ok()?,
        i16::try_from(area.top_left.y).ok()?,
        i16::try_from(area.size.width).ok()?,
        i16::try_from(area.size.height).ok()?,
    ))
}

#[cfg(feature = "graphics")]
impl<BUS, DC, CS, RST, BL> DrawTarget for Gc9a01<BUS, DC, CS, RST, BL>
where
    BUS: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    type Error = Error<BUS::Error>;
    type Color = Rgb565;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Error<BUS::Error>>
    where
        I: IntoIterator<Item = Pixel<Rgb565>>,
    {
        self.transaction(|display| {
            for Pixel(coord, color) in pixels.into_iter() {
                // Only draw pixels that would be on screen
                if let (Ok(x), Ok(y)) = (i16::try_from(coord.x), i16::try_from(coord.y)) {
                    display.write_pixel(x, y, raw_color(color))?;
                }
            }
            Ok(())
        })
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Error<BUS::Error>>
    where
        I: IntoIterator<Item = Rgb565>,
    {
        let drawable_area = area.intersection(&self.bounding_box());
        let Some(rect) = to_rect(&drawable_area) else {
            return Ok(());
        };

        // Colors cover the whole area; keep the ones landing on the canvas
        let count = rect.w as usize * rect.h as usize;
        let colors = area
            .points()
            .zip(colors)
            .filter(|(point, _)| drawable_area.contains(*point))
            .map(|(_, color)| raw_color(color))
            .take(count);
        self.transaction(|display| {
            display.set_address_window(rect.x as u16, rect.y as u16, rect.w as u16, rect.h as u16)?;
            display.write_pixels_iter(colors)
        })
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Rgb565) -> Result<(), Error<BUS::Error>> {
        let drawable_area = area.intersection(&self.bounding_box());
        match to_rect(&drawable_area) {
            Some(r) => self.fill_rect(r.x, r.y, r.w, r.h, raw_color(color)),
            None => Ok(()),
        }
    }

    fn clear(&mut self, color: Rgb565) -> Result<(), Error<BUS::Error>> {
        self.fill_screen(raw_color(color))
    }
}

#[cfg(feature = "graphics")]
impl<BUS, DC, CS, RST, BL> OriginDimensions for Gc9a01<BUS, DC, CS, RST, BL>
where
    BUS: DisplayBus,
    DC: OutputPin,
    CS: OutputPin,
    RST: OutputPin,
    BL: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.canvas.width() as u32, self.canvas.height() as u32)
    }
}
