//! Colour theme for the diagram.

use crate::pins::{Field, PinCategory};
use crossterm::style::{Attribute, Color, ContentStyle};

const fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: (hex >> 16) as u8,
        g: (hex >> 8) as u8,
        b: hex as u8,
    }
}

fn fg(color: Color) -> ContentStyle {
    ContentStyle {
        foreground_color: Some(color),
        ..ContentStyle::default()
    }
}

fn fg_on(foreground: Color, background: Color) -> ContentStyle {
    ContentStyle {
        foreground_color: Some(foreground),
        background_color: Some(background),
        ..ContentStyle::default()
    }
}

/// Styles for every column, pin category and panel element.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub gpio: ContentStyle,
    pub pins: ContentStyle,
    pub spi: ContentStyle,
    pub i2c: ContentStyle,
    /// Shared by all six debug columns
    pub debug: ContentStyle,
    pub panel: ContentStyle,
    pub panel_light: ContentStyle,
    pub diagram: ContentStyle,
    pub power: ContentStyle,
    pub ground: ContentStyle,
    pub reserved: ContentStyle,
    /// A field matching the search pattern
    pub highlight: ContentStyle,
    /// Background for a GPIO label whose row matched in a hidden column
    pub highlight_row: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::solarized()
    }
}

impl Theme {
    /// The default Solarized-derived palette.
    pub fn solarized() -> Self {
        let mut highlight = fg_on(rgb(0xdc322f), Color::White);
        highlight.attributes.set(Attribute::Bold);

        Self {
            gpio: fg(rgb(0x859900)),
            pins: fg(rgb(0x333333)),
            spi: fg(rgb(0xd33682)),
            i2c: fg(rgb(0x268bd2)),
            debug: fg(rgb(0x989898)),
            panel: fg_on(rgb(0xffffff), rgb(0x000000)),
            panel_light: fg_on(rgb(0x000000), rgb(0xfdf6e3)),
            diagram: fg(rgb(0x555555)),
            power: fg(rgb(0xdc322f)),
            ground: fg(rgb(0x005b66)),
            reserved: fg(rgb(0xdf8f8e)),
            highlight,
            highlight_row: rgb(0x444444),
        }
    }

    /// Default style of a column.
    pub fn column(&self, field: Field) -> ContentStyle {
        match field {
            Field::Pins => self.pins,
            Field::Gpio => self.gpio,
            Field::I2c => self.i2c,
            Field::Spi => self.spi,
            Field::Consumer
            | Field::AltFunc
            | Field::Mode
            | Field::Drive
            | Field::Pull
            | Field::State => self.debug,
        }
    }

    /// Style of a GPIO column label for a pin category.
    pub fn category(&self, category: PinCategory) -> ContentStyle {
        match category {
            PinCategory::Ground => self.ground,
            PinCategory::Power => self.power,
            PinCategory::Reserved => self.reserved,
            PinCategory::Gpio => self.gpio,
        }
    }

    /// Category style on the emphasised row background.
    pub fn row_highlight(&self, category: PinCategory) -> ContentStyle {
        let mut style = self.category(category);
        style.background_color = Some(self.highlight_row);
        style.attributes.set(Attribute::Bold);
        style
    }

    pub fn panel(&self, light_mode: bool) -> ContentStyle {
        if light_mode {
            self.panel_light
        } else {
            self.panel
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb() {
        assert_eq!(rgb(0x859900), Color::Rgb { r: 0x85, g: 0x99, b: 0x00 });
    }

    #[test]
    fn test_row_highlight_keeps_category_colour() {
        let theme = Theme::default();
        let style = theme.row_highlight(PinCategory::Ground);
        assert_eq!(style.foreground_color, theme.ground.foreground_color);
        assert_eq!(style.background_color, Some(rgb(0x444444)));
        assert!(style.attributes.has(Attribute::Bold));
    }

    #[test]
    fn test_debug_columns_share_style() {
        let theme = Theme::default();
        for field in Field::DEBUG {
            assert_eq!(theme.column(field), theme.debug);
        }
        assert_ne!(theme.panel(true), theme.panel(false));
    }
}
