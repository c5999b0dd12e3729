//! Physical header layout and per-pin state slots.
//!
//! The 40-pin header is modelled as 22 rows: a decorative top and bottom edge
//! plus 20 rows holding an odd (left) and even (right) pin each.

use crate::error::{PinoutError, Result};
use serde::Serialize;
use std::borrow::Cow;

/// Number of user-facing GPIO lines routed to the header.
pub const GPIO_COUNT: usize = 28;

/// Placeholder shown when a debug value could not be read.
pub const UNKNOWN: &str = "--";

/// A labelled column of the diagram.
///
/// The order matches the per-pin field order used for highlight matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Pins,
    Gpio,
    I2c,
    Spi,
    Consumer,
    AltFunc,
    Mode,
    Drive,
    Pull,
    State,
}

impl Field {
    /// Every field, in per-pin order.
    pub const ALL: [Field; 10] = [
        Field::Pins,
        Field::Gpio,
        Field::I2c,
        Field::Spi,
        Field::Consumer,
        Field::AltFunc,
        Field::Mode,
        Field::Drive,
        Field::Pull,
        Field::State,
    ];

    /// Interface labels a user may ask for by name.
    pub const INTERFACES: [Field; 2] = [Field::I2c, Field::Spi];

    /// Debug columns, in display order.
    pub const DEBUG: [Field; 6] = [
        Field::Consumer,
        Field::AltFunc,
        Field::Mode,
        Field::Drive,
        Field::Pull,
        Field::State,
    ];

    /// Column name as accepted on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Field::Pins => "pins",
            Field::Gpio => "gpio",
            Field::I2c => "i2c",
            Field::Spi => "spi",
            Field::Consumer => "consumer",
            Field::AltFunc => "alt_func",
            Field::Mode => "mode",
            Field::Drive => "drive",
            Field::Pull => "pull",
            Field::State => "state",
        }
    }

    /// Resolve a user supplied interface label.
    ///
    /// `pins` and `gpio` are reserved and controlled by flags instead.
    pub fn interface(label: &str) -> Result<Field> {
        Field::INTERFACES
            .into_iter()
            .find(|field| field.name() == label)
            .ok_or_else(|| PinoutError::InvalidLabel(label.to_string()))
    }
}

/// Electrical category of a physical pin, used for GPIO column styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinCategory {
    Ground,
    Power,
    /// ID EEPROM pins reserved for HAT detection
    Reserved,
    Gpio,
}

impl PinCategory {
    /// Classify a physical pin number. Rows without a pin count as GPIO.
    pub fn of(pin: Option<u8>) -> Self {
        match pin {
            Some(6 | 9 | 14 | 20 | 25 | 30 | 34 | 39) => PinCategory::Ground,
            Some(1 | 2 | 4 | 17) => PinCategory::Power,
            Some(27 | 28) => PinCategory::Reserved,
            _ => PinCategory::Gpio,
        }
    }
}

/// What a header position is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinFunction {
    Gpio(u8),
    Power3v3,
    Power5v,
    Ground,
    /// Decorative rows above and below the header
    None,
}

impl PinFunction {
    /// GPIO line index, if this position carries one.
    pub fn gpio_index(self) -> Option<usize> {
        match self {
            PinFunction::Gpio(n) => Some(usize::from(n)),
            _ => None,
        }
    }

    pub fn label(self) -> Cow<'static, str> {
        match self {
            PinFunction::Gpio(n) => Cow::Owned(format!("GPIO {n}")),
            PinFunction::Power3v3 => Cow::Borrowed("3v3"),
            PinFunction::Power5v => Cow::Borrowed("5v"),
            PinFunction::Ground => Cow::Borrowed("Ground"),
            PinFunction::None => Cow::Borrowed(""),
        }
    }
}

/// Debug state of one GPIO line as reported by the pin query tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DebugState {
    /// Process or driver currently holding the line
    pub consumer: String,
    /// Alternate function name, only set in an `aN` mode
    pub alt_func: String,
    pub mode: String,
    pub drive: String,
    pub pull: String,
    /// Logical level: `hi`, `lo` or `--`
    pub state: String,
}

impl DebugState {
    /// State used for every line when the query tool is missing.
    pub fn unknown() -> Self {
        Self {
            consumer: UNKNOWN.to_string(),
            alt_func: UNKNOWN.to_string(),
            mode: UNKNOWN.to_string(),
            drive: UNKNOWN.to_string(),
            pull: UNKNOWN.to_string(),
            state: UNKNOWN.to_string(),
        }
    }

    pub fn is_high(&self) -> bool {
        self.state == "hi"
    }
}

/// One side of a header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pin {
    /// Physical pin number, absent on decorative rows
    pub number: Option<u8>,
    pub function: PinFunction,
    pub i2c: &'static str,
    pub spi: &'static str,
    pub debug: DebugState,
}

impl Pin {
    const fn new(
        number: Option<u8>,
        function: PinFunction,
        i2c: &'static str,
        spi: &'static str,
    ) -> Self {
        Self {
            number,
            function,
            i2c,
            spi,
            debug: DebugState {
                consumer: String::new(),
                alt_func: String::new(),
                mode: String::new(),
                drive: String::new(),
                pull: String::new(),
                state: String::new(),
            },
        }
    }

    pub fn category(&self) -> PinCategory {
        PinCategory::of(self.number)
    }

    /// Raw text of a field, as displayed and as matched by `--find`.
    pub fn field_text(&self, field: Field) -> Cow<'_, str> {
        match field {
            Field::Pins => match self.number {
                Some(n) => Cow::Owned(n.to_string()),
                None => Cow::Borrowed(""),
            },
            Field::Gpio => self.function.label(),
            Field::I2c => Cow::Borrowed(self.i2c),
            Field::Spi => Cow::Borrowed(self.spi),
            Field::Consumer => Cow::Borrowed(&self.debug.consumer),
            Field::AltFunc => Cow::Borrowed(&self.debug.alt_func),
            Field::Mode => Cow::Borrowed(&self.debug.mode),
            Field::Drive => Cow::Borrowed(&self.debug.drive),
            Field::Pull => Cow::Borrowed(&self.debug.pull),
            Field::State => Cow::Borrowed(&self.debug.state),
        }
    }
}

/// A physical header row: left pin, connector glyph, right pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderRow {
    pub left: Pin,
    pub glyph: &'static str,
    pub right: Pin,
}

impl HeaderRow {
    pub fn pins_mut(&mut self) -> [&mut Pin; 2] {
        [&mut self.left, &mut self.right]
    }
}

const fn edge(glyph: &'static str) -> HeaderRow {
    HeaderRow {
        left: Pin::new(None, PinFunction::None, "", ""),
        glyph,
        right: Pin::new(None, PinFunction::None, "", ""),
    }
}

const fn row(left: Pin, right: Pin) -> HeaderRow {
    let glyph = match left.number {
        Some(1) => "┃▣ ◎┃",
        _ => "┃◎ ◎┃",
    };
    HeaderRow { left, glyph, right }
}

const fn gpio(number: u8, line: u8, i2c: &'static str, spi: &'static str) -> Pin {
    Pin::new(Some(number), PinFunction::Gpio(line), i2c, spi)
}

const fn fixed(number: u8, function: PinFunction) -> Pin {
    Pin::new(Some(number), function, "", "")
}

use PinFunction::{Ground, Power3v3, Power5v};

/// The ordered rows of the Raspberry Pi 40-pin header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinTable {
    rows: Vec<HeaderRow>,
}

impl PinTable {
    /// Build the standard 40-pin layout with empty debug state.
    pub fn raspberry_pi() -> Self {
        let rows = vec![
            edge("┏━━━┓"),
            row(fixed(1, Power3v3), fixed(2, Power5v)),
            row(gpio(3, 2, "I2C1 SDA", ""), fixed(4, Power5v)),
            row(gpio(5, 3, "I2C1 SCL", ""), fixed(6, Ground)),
            row(gpio(7, 4, "", ""), gpio(8, 14, "", "")),
            row(fixed(9, Ground), gpio(10, 15, "", "")),
            row(gpio(11, 17, "", "SPI1 CE1"), gpio(12, 18, "", "SPI1 CE0")),
            row(gpio(13, 27, "", ""), fixed(14, Ground)),
            row(gpio(15, 22, "", ""), gpio(16, 23, "", "")),
            row(fixed(17, Power3v3), gpio(18, 24, "", "")),
            row(gpio(19, 10, "", "SPI0 MOSI"), fixed(20, Ground)),
            row(gpio(21, 9, "", "SPI0 MISO"), gpio(22, 25, "", "")),
            row(gpio(23, 11, "", "SPI0 SCLK"), gpio(24, 8, "", "SPI0 CE0")),
            row(fixed(25, Ground), gpio(26, 7, "", "SPI0 CE1")),
            row(gpio(27, 0, "EEPROM SDA", ""), gpio(28, 1, "EEPROM SCL", "")),
            row(gpio(29, 5, "", ""), fixed(30, Ground)),
            row(gpio(31, 6, "", ""), gpio(32, 12, "", "")),
            row(gpio(33, 13, "", ""), fixed(34, Ground)),
            row(gpio(35, 19, "", "SPI1 MISO"), gpio(36, 16, "", "SPI1 CE2")),
            row(gpio(37, 26, "", ""), gpio(38, 20, "", "SPI1 MOSI")),
            row(fixed(39, Ground), gpio(40, 21, "", "SPI1 SCLK")),
            edge("┗━━━┛"),
        ];
        Self { rows }
    }

    pub fn rows(&self) -> &[HeaderRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [HeaderRow] {
        &mut self.rows
    }

    /// Iterate over every pin, left side first within each row.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.rows.iter().flat_map(|row| [&row.left, &row.right])
    }

    /// Find a pin by its physical number.
    pub fn pin(&self, number: u8) -> Option<&Pin> {
        self.pins().find(|pin| pin.number == Some(number))
    }
}

impl Default for PinTable {
    fn default() -> Self {
        Self::raspberry_pi()
    }
}
