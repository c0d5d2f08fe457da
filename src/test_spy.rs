//! Recording bus, pins and delay sharing a single event log, so tests can
//! inspect the exact traffic a driver call produced.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::digital::v2::OutputPin;

use crate::bus::{DisplayBus, SpiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Dc,
    Cs,
    Rst,
    Bl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Init,
    Open(u32),
    Close,
    /// Byte written while the data/command line was low
    Cmd(u8),
    /// One bus write while the data/command line was high
    Data(Vec<u8>),
    Level(Line, bool),
    Delay(u8),
}

#[derive(Default)]
struct Log {
    sent: Vec<Sent>,
    dc_high: bool,
}

#[derive(Clone, Default)]
pub struct Spy {
    log: Rc<RefCell<Log>>,
}

impl Spy {
    pub fn new() -> Self {
        Spy::default()
    }

    pub fn bus(&self) -> SpyBus {
        SpyBus { log: self.log.clone() }
    }

    pub fn pin(&self, line: Line) -> SpyPin {
        SpyPin {
            line,
            log: self.log.clone(),
        }
    }

    pub fn delay(&self) -> SpyDelay {
        SpyDelay { log: self.log.clone() }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.log.borrow().sent.clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().sent.clear();
    }

    pub fn commands(&self) -> Vec<u8> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Cmd(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Data writes that followed the last memory write command.
    pub fn pixel_chunks(&self) -> Vec<Vec<u8>> {
        let sent = self.sent();
        let start = sent
            .iter()
            .rposition(|s| *s == Sent::Cmd(0x2C))
            .map_or(0, |i| i + 1);
        sent[start..]
            .iter()
            .filter_map(|s| match s {
                Sent::Data(d) => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    /// Parameter bytes sent right after the given command.
    pub fn params_of(&self, cmd: u8) -> Vec<Vec<u8>> {
        let sent = self.sent();
        sent.windows(2)
            .filter_map(|w| match (&w[0], &w[1]) {
                (Sent::Cmd(c), Sent::Data(d)) if *c == cmd => Some(d.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &Sent) -> usize {
        self.sent().iter().filter(|s| *s == event).count()
    }

    pub fn delays(&self) -> Vec<u8> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Delay(ms) => Some(ms),
                _ => None,
            })
            .collect()
    }
}

pub struct SpyBus {
    log: Rc<RefCell<Log>>,
}

impl DisplayBus for SpyBus {
    type Error = Infallible;

    fn init(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().sent.push(Sent::Init);
        Ok(())
    }

    fn open(&mut self, config: &SpiConfig) -> Result<(), Infallible> {
        self.log.borrow_mut().sent.push(Sent::Open(config.frequency));
        Ok(())
    }

    fn close(&mut self) -> Result<(), Infallible> {
        self.log.borrow_mut().sent.push(Sent::Close);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Infallible> {
        let mut log = self.log.borrow_mut();
        if log.dc_high {
            log.sent.push(Sent::Data(bytes.to_vec()));
        } else {
            log.sent.extend(bytes.iter().map(|&b| Sent::Cmd(b)));
        }
        Ok(())
    }
}

pub struct SpyPin {
    line: Line,
    log: Rc<RefCell<Log>>,
}

impl SpyPin {
    fn set(&mut self, high: bool) {
        let mut log = self.log.borrow_mut();
        if self.line == Line::Dc {
            log.dc_high = high;
        } else {
            log.sent.push(Sent::Level(self.line, high));
        }
    }
}

impl OutputPin for SpyPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.set(true);
        Ok(())
    }
}

pub struct SpyDelay {
    log: Rc<RefCell<Log>>,
}

impl DelayMs<u8> for SpyDelay {
    fn delay_ms(&mut self, ms: u8) {
        self.log.borrow_mut().sent.push(Sent::Delay(ms));
    }
}
