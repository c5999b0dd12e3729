//! Diagram composition: pin table + configuration -> styled grid.
//!
//! Composition is pure. The same table, configuration and theme always give
//! the same [`Frame`], and the table is only borrowed immutably.

use crate::pins::{Field, HeaderRow, Pin, PinTable};
use crate::render::config::DisplayConfig;
use crate::render::theme::Theme;
use crossterm::style::ContentStyle;

pub const TITLE: &str = "Raspberry Pi Pinout";
pub const FOOTER: [&str; 2] = ["@gadgetoid", "https://pinout.xyz"];
pub const EXIT_HINT: &str = "Ctrl+C to exit!";

/// Positions within a header glyph that represent the two pins.
const LEFT_PIN_GLYPH: usize = 1;
const RIGHT_PIN_GLYPH: usize = 3;

/// A run of text with a single style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: ContentStyle,
}

/// One grid cell, made of one or more spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub spans: Vec<Span>,
}

impl Cell {
    pub fn styled(text: impl Into<String>, style: ContentStyle) -> Self {
        Self {
            spans: vec![Span {
                text: text.into(),
                style,
            }],
        }
    }

    /// Unstyled text of the cell.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Display width in terminal columns.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.chars().count()).sum()
    }

    /// Style of the cell's content, ignoring separator padding.
    pub fn style(&self) -> ContentStyle {
        self.spans
            .iter()
            .find(|span| !span.text.trim().is_empty())
            .or(self.spans.first())
            .map(|span| span.style)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A fully composed diagram, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub title: &'static str,
    pub panel_style: ContentStyle,
    pub columns: Vec<Align>,
    pub rows: Vec<Vec<Cell>>,
    pub footer: Vec<String>,
}

impl Frame {
    /// Index of the header glyph column.
    pub fn diagram_column(&self) -> usize {
        self.columns.len() / 2
    }
}

/// Compose the diagram for `table` under `config`.
pub fn compose(table: &PinTable, config: &DisplayConfig, theme: &Theme) -> Frame {
    let fields = config.visible_fields();

    let mut columns: Vec<Align> = fields
        .iter()
        .map(|field| match field {
            Field::Gpio | Field::Pins => Align::Right,
            _ => Align::Left,
        })
        .collect();
    columns.push(Align::Left);
    columns.extend(fields.iter().map(|_| Align::Left));

    let rows = table
        .rows()
        .iter()
        .map(|row| compose_row(row, &fields, config, theme))
        .collect();

    let mut footer: Vec<String> = FOOTER.iter().map(|line| line.to_string()).collect();
    if config.live {
        footer.push(EXIT_HINT.to_string());
    }

    Frame {
        title: TITLE,
        panel_style: theme.panel(config.light_mode),
        columns,
        rows,
        footer,
    }
}

fn compose_row(row: &HeaderRow, fields: &[Field], config: &DisplayConfig, theme: &Theme) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(fields.len() * 2 + 1);

    for mut cell in compose_pin(&row.left, fields, config, theme) {
        cell.spans.push(separator());
        cells.push(cell);
    }

    cells.push(glyph_cell(row, theme));

    let mut right = compose_pin(&row.right, fields, config, theme);
    right.reverse();
    for mut cell in right {
        cell.spans.insert(0, separator());
        cells.push(cell);
    }

    cells
}

/// Gap between columns, drawn in the panel style.
fn separator() -> Span {
    Span {
        text: " ".to_string(),
        style: ContentStyle::default(),
    }
}

/// Styled cells for the visible fields of one pin, in `fields` order.
fn compose_pin(pin: &Pin, fields: &[Field], config: &DisplayConfig, theme: &Theme) -> Vec<Cell> {
    let matches = |field: Field| config.highlights(&pin.field_text(field));
    let hidden_match = Field::ALL
        .into_iter()
        .any(|field| !fields.contains(&field) && matches(field));

    fields
        .iter()
        .map(|&field| {
            let text = pin.field_text(field).into_owned();
            let style = if matches(field) {
                theme.highlight
            } else if field == Field::Gpio {
                if hidden_match {
                    theme.row_highlight(pin.category())
                } else {
                    theme.category(pin.category())
                }
            } else {
                theme.column(field)
            };
            Cell::styled(text, style)
        })
        .collect()
}

/// The connector glyph, with each pin lit when its line reads high.
fn glyph_cell(row: &HeaderRow, theme: &Theme) -> Cell {
    let mut spans = vec![Span {
        text: " ".to_string(),
        style: theme.diagram,
    }];

    for (position, ch) in row.glyph.chars().enumerate() {
        let lit = (position == LEFT_PIN_GLYPH && row.left.debug.is_high())
            || (position == RIGHT_PIN_GLYPH && row.right.debug.is_high());
        let style = if lit { theme.power } else { theme.diagram };

        match spans.last_mut() {
            Some(span) if span.style == style => span.text.push(ch),
            _ => spans.push(Span {
                text: ch.to_string(),
                style,
            }),
        }
    }

    Cell { spans }
}
