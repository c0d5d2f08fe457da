//! Power-on register sequence for GC9A01 round panels.
//!
//! Most of the registers written here are undocumented vendor settings. The
//! sequence is replayed verbatim, in order, once per `begin`.

use crate::instruction::Instruction;

/// One entry of an initialization sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    /// Command without parameters
    Command(u8),
    /// Command followed by parameter bytes
    Data(u8, &'static [u8]),
    /// Command and parameters, then a blocking wait in milliseconds
    Delayed(u8, &'static [u8], u8),
}

impl InitStep {
    pub const fn command(&self) -> u8 {
        match *self {
            InitStep::Command(cmd) | InitStep::Data(cmd, _) | InitStep::Delayed(cmd, _, _) => cmd,
        }
    }

    pub const fn params(&self) -> &'static [u8] {
        match *self {
            InitStep::Command(_) => &[],
            InitStep::Data(_, params) | InitStep::Delayed(_, params, _) => params,
        }
    }

    pub const fn delay_ms(&self) -> u8 {
        match *self {
            InitStep::Delayed(_, _, ms) => ms,
            _ => 0,
        }
    }
}

use Instruction::*;

pub static INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Data(INREGEN2 as u8, &[0x14]),
    InitStep::Data(0xEB, &[0x14]),
    InitStep::Command(INREGEN1 as u8),
    InitStep::Command(INREGEN2 as u8),
    InitStep::Data(0xEB, &[0x0A]),
    InitStep::Data(0x84, &[0x40]),
    InitStep::Data(0x85, &[0xFF]),
    InitStep::Data(0x86, &[0xFF]),
    InitStep::Data(0x87, &[0xFF]),
    InitStep::Data(0x88, &[0x0A]),
    InitStep::Data(0x89, &[0x21]),
    InitStep::Data(0x8A, &[0x00]),
    InitStep::Data(0x8B, &[0x80]),
    InitStep::Data(0x8C, &[0x01]),
    InitStep::Data(0x8D, &[0x01]),
    InitStep::Data(0x8E, &[0xFF]),
    InitStep::Data(0x8F, &[0xFF]),
    InitStep::Data(DFUNCTR as u8, &[0x00, 0x20]),
    // 16 bits per pixel
    InitStep::Data(COLMOD as u8, &[0x05]),
    InitStep::Data(PWCRIT as u8, &[0x08, 0x08, 0x08, 0x08]),
    InitStep::Data(0xBD, &[0x06]),
    InitStep::Data(0xBC, &[0x00]),
    InitStep::Data(0xFF, &[0x60, 0x01, 0x04]),
    // Vreg1a / Vreg1b / Vreg2a voltage
    InitStep::Data(PWCTR2 as u8, &[0x13]),
    InitStep::Data(PWCTR3 as u8, &[0x13]),
    InitStep::Data(PWCTR4 as u8, &[0x22]),
    InitStep::Data(0xBE, &[0x11]),
    InitStep::Data(0xE1, &[0x10, 0x0E]),
    InitStep::Data(0xDF, &[0x21, 0x0C, 0x02]),
    InitStep::Data(GAMMA1 as u8, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    InitStep::Data(GAMMA2 as u8, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    InitStep::Data(GAMMA3 as u8, &[0x45, 0x09, 0x08, 0x08, 0x26, 0x2A]),
    InitStep::Data(GAMMA4 as u8, &[0x43, 0x70, 0x72, 0x36, 0x37, 0x6F]),
    InitStep::Data(0xED, &[0x1B, 0x0B]),
    InitStep::Data(0xAE, &[0x77]),
    InitStep::Data(0xCD, &[0x63]),
    InitStep::Data(
        GATEEQ as u8,
        &[0x07, 0x07, 0x04, 0x0E, 0x0F, 0x09, 0x07, 0x08, 0x03],
    ),
    InitStep::Data(FRAMERATE as u8, &[0x34]),
    InitStep::Data(
        GATECTRL as u8,
        &[
            0x18, 0x0D, 0x71, 0xED, 0x70, 0x70, 0x18, 0x0F, 0x71, 0xEF, 0x70, 0x70,
        ],
    ),
    InitStep::Data(
        SRCCTRL as u8,
        &[
            0x18, 0x11, 0x71, 0xF1, 0x70, 0x70, 0x18, 0x13, 0x71, 0xF3, 0x70, 0x70,
        ],
    ),
    InitStep::Data(
        PANELTIM as u8,
        &[0x28, 0x29, 0xF1, 0x01, 0xF1, 0x00, 0x07],
    ),
    InitStep::Data(
        GSTIM1 as u8,
        &[0x3C, 0x00, 0xCD, 0x67, 0x45, 0x45, 0x10, 0x00, 0x00, 0x00],
    ),
    InitStep::Data(
        GSTIM2 as u8,
        &[0x00, 0x3C, 0x00, 0x00, 0x00, 0x01, 0x54, 0x10, 0x32, 0x98],
    ),
    InitStep::Data(SRCEQ as u8, &[0x10, 0x85, 0x80, 0x00, 0x00, 0x4E, 0x00]),
    InitStep::Data(INVTIM as u8, &[0x3E, 0x07]),
    InitStep::Command(TEON as u8),
    // The panel shows correct colours with inversion enabled
    InitStep::Command(INVON as u8),
    InitStep::Delayed(SLPOUT as u8, &[], 120),
    InitStep::Delayed(DISPON as u8, &[], 20),
];
