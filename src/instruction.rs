use num_derive::FromPrimitive;

/// GC9A01 instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    NOP = 0x00,
    /// Software Reset
    SWRESET = 0x01,
    /// Read Display ID
    RDDID = 0x04,
    /// Read Display Status
    RDDST = 0x09,
    /// Sleep In
    SLPIN = 0x10,
    /// Sleep Out
    SLPOUT = 0x11,
    /// Partial Mode On
    PTLON = 0x12,
    /// Normal Display Mode On
    NORON = 0x13,
    /// Display Inversion Off
    INVOFF = 0x20,
    /// Display Inversion On
    INVON = 0x21,
    /// Display Off
    DISPOFF = 0x28,
    /// Display On
    DISPON = 0x29,
    /// Column Address Set
    CASET = 0x2A,
    /// Row Address Set
    RASET = 0x2B,
    /// Memory Write
    RAMWR = 0x2C,
    /// Partial Area
    PTLAR = 0x30,
    /// Vertical Scrolling Definition
    VSCRDEF = 0x33,
    /// Tearing Effect Line Off
    TEOFF = 0x34,
    /// Tearing Effect Line On
    TEON = 0x35,
    /// Memory Access Control
    MADCTL = 0x36,
    /// Vertical Scrolling Start Address
    VSCSAD = 0x37,
    /// Idle Mode Off
    IDMOFF = 0x38,
    /// Idle Mode On
    IDMON = 0x39,
    /// Pixel Format Set
    COLMOD = 0x3A,
    /// Write Memory Continue
    WRMEMC = 0x3C,
    /// Set Tear Scanline
    TESCAN = 0x44,
    /// Get Scanline
    GSCAN = 0x45,
    /// Write Display Brightness
    WRDISBV = 0x51,
    /// Write CTRL Display
    WRCTRLD = 0x53,

    /// Gate Control (Undocumented)
    GATECTRL = 0x62,
    /// Source Control (Undocumented)
    SRCCTRL = 0x63,
    /// Panel Timing (Undocumented)
    PANELTIM = 0x64,
    /// Gate Scan Timing 1 (Undocumented)
    GSTIM1 = 0x66,
    /// Gate Scan Timing 2 (Undocumented)
    GSTIM2 = 0x67,
    /// Gate Equalization (Undocumented)
    GATEEQ = 0x70,
    /// Source Equalization (Undocumented)
    SRCEQ = 0x74,
    /// Power Criterion Control (Undocumented)
    PWCRIT = 0x90,
    /// Inversion Timing (Undocumented)
    INVTIM = 0x98,
    /// Power Control 7
    PWCTR7 = 0xA7,
    /// RGB Interface Signal Control
    RGBCTRL = 0xB0,
    /// Blanking Porch Control
    PORCTRL = 0xB5,
    /// Display Function Control
    DFUNCTR = 0xB6,
    /// Tearing Effect Control
    TEWC = 0xBA,
    /// Power Control 1
    PWCTR1 = 0xC1,
    /// Power Control 2
    PWCTR2 = 0xC3,
    /// Power Control 3
    PWCTR3 = 0xC4,
    /// Power Control 4
    PWCTR4 = 0xC9,
    /// Read ID1
    RDID1 = 0xDA,
    /// Read ID2
    RDID2 = 0xDB,
    /// Read ID3
    RDID3 = 0xDC,
    /// Frame Rate
    FRAMERATE = 0xE8,
    /// SPI 2 Data Control
    SPI2DATA = 0xE9,
    /// Inter Register Enable 2
    INREGEN2 = 0xEF,
    /// Set Gamma 1
    GAMMA1 = 0xF0,
    /// Set Gamma 2
    GAMMA2 = 0xF1,
    /// Set Gamma 3
    GAMMA3 = 0xF2,
    /// Set Gamma 4
    GAMMA4 = 0xF3,
    /// Interface Control
    IFCTRL = 0xF6,
    /// Inter Register Enable 1
    INREGEN1 = 0xFE,
}
