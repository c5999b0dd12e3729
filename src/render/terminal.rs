//! Drawing composed frames to a terminal.

use crate::error::Result;
use crate::render::compose::{Align, Cell, Frame};
use crossterm::cursor::{Hide, MoveToPreviousLine, Show};
use crossterm::style::{ContentStyle, Print};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;

lazy_static! {
    static ref ANSI_ESCAPE: Regex =
        Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("escape pattern is a valid regex");
}

/// Turns a [`Frame`] into printable lines inside a rounded, titled panel.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    /// Create a renderer; `color: false` emits plain text with the same layout.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, frame: &Frame) -> Vec<String> {
        let widths = column_widths(frame);
        let grid_width: usize = widths.iter().sum();
        let title = format!(" {} ", frame.title);
        let inner = frame
            .footer
            .iter()
            .map(|line| line.chars().count())
            .chain([grid_width, title.chars().count()])
            .max()
            .unwrap_or(0);
        let panel = frame.panel_style;

        let mut lines = Vec::with_capacity(frame.rows.len() + frame.footer.len() + 2);

        let rule = inner + 2 - title.chars().count();
        lines.push(format!(
            "{}{}{}",
            self.paint(&format!("╭{}", "─".repeat(rule / 2)), panel),
            self.paint(&title, panel),
            self.paint(&format!("{}╮", "─".repeat(rule - rule / 2)), panel),
        ));

        for row in &frame.rows {
            let mut line = String::new();
            for (column, cell) in row.iter().enumerate() {
                let width = widths.get(column).copied().unwrap_or(0);
                let pad = " ".repeat(width.saturating_sub(cell.width()));
                match frame.columns.get(column) {
                    Some(Align::Right) => {
                        line.push_str(&self.paint(&pad, panel));
                        line.push_str(&self.paint_cell(cell, panel));
                    }
                    _ => {
                        line.push_str(&self.paint_cell(cell, panel));
                        line.push_str(&self.paint(&pad, panel));
                    }
                }
            }
            lines.push(self.boxed(line, grid_width, inner, panel));
        }

        for text in &frame.footer {
            lines.push(self.boxed(self.paint(text, panel), text.chars().count(), inner, panel));
        }

        lines.push(self.paint(&format!("╰{}╯", "─".repeat(inner + 2)), panel));
        lines
    }

    fn boxed(&self, content: String, width: usize, inner: usize, panel: ContentStyle) -> String {
        let trailing = " ".repeat(inner.saturating_sub(width) + 1);
        format!(
            "{}{}{}",
            self.paint("│ ", panel),
            content,
            self.paint(&format!("{trailing}│"), panel)
        )
    }

    fn paint_cell(&self, cell: &Cell, panel: ContentStyle) -> String {
        cell.spans
            .iter()
            .map(|span| self.paint(&span.text, layer(panel, span.style)))
            .collect()
    }

    fn paint(&self, text: &str, style: ContentStyle) -> String {
        if self.color && !text.is_empty() {
            style.apply(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn column_widths(frame: &Frame) -> Vec<usize> {
    let mut widths = vec![0; frame.columns.len()];
    for row in &frame.rows {
        for (column, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(column) {
                *width = (*width).max(cell.width());
            }
        }
    }
    widths
}

/// Draw `over` on top of `base`: unset colours fall through, attributes add up.
fn layer(base: ContentStyle, over: ContentStyle) -> ContentStyle {
    let mut attributes = base.attributes;
    attributes.extend(over.attributes);
    ContentStyle {
        foreground_color: over.foreground_color.or(base.foreground_color),
        background_color: over.background_color.or(base.background_color),
        underline_color: over.underline_color.or(base.underline_color),
        attributes,
    }
}

/// Write a frame once, for static output.
pub fn print_frame<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Terminal rows taken by `line` once wrapped at `columns`.
fn wrapped_rows(line: &str, columns: Option<u16>) -> usize {
    let width = ANSI_ESCAPE.replace_all(line, "").chars().count();
    match columns {
        Some(columns) if columns > 0 => width.div_ceil(usize::from(columns)).max(1),
        _ => 1,
    }
}

/// In-place redraw of the most recent frame.
///
/// The cursor is hidden while the view exists and restored on drop. Lines
/// wider than the terminal are counted as the rows they wrap onto.
pub struct LiveView<W: Write> {
    out: W,
    height: usize,
    columns: Option<u16>,
}

impl<W: Write> LiveView<W> {
    /// Create a view that reads the terminal width before every draw.
    pub fn new(out: W) -> Result<Self> {
        Self::open(out, None)
    }

    /// Create a view for a terminal of fixed width.
    pub fn with_columns(out: W, columns: u16) -> Result<Self> {
        Self::open(out, Some(columns))
    }

    fn open(mut out: W, columns: Option<u16>) -> Result<Self> {
        execute!(out, Hide)?;
        Ok(Self {
            out,
            height: 0,
            columns,
        })
    }

    /// Replace the previously drawn frame with `lines`.
    pub fn draw(&mut self, lines: &[String]) -> Result<()> {
        if self.height > 0 {
            let up = u16::try_from(self.height).unwrap_or(u16::MAX);
            queue!(self.out, MoveToPreviousLine(up))?;
        }
        queue!(self.out, Clear(ClearType::FromCursorDown))?;
        for line in lines {
            queue!(self.out, Print(line), Print("\n"))?;
        }
        self.out.flush()?;

        let columns = self
            .columns
            .or_else(|| terminal::size().ok().map(|(columns, _)| columns));
        self.height = lines.iter().map(|line| wrapped_rows(line, columns)).sum();
        Ok(())
    }

    /// Number of terminal rows currently on screen.
    pub fn height(&self) -> usize {
        self.height
    }
}

impl<W: Write> Drop for LiveView<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, Show);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::PinTable;
    use crate::render::{compose, DisplayConfig, Theme};

    fn plain_lines(config: &DisplayConfig) -> Vec<String> {
        let frame = compose(&PinTable::raspberry_pi(), config, &Theme::default());
        Renderer::new(false).render(&frame)
    }

    #[test]
    fn test_plain_render_is_boxed() {
        let lines = plain_lines(&DisplayConfig::default());

        // Border, 22 header rows, 2 footer lines, border.
        assert_eq!(lines.len(), 26);
        assert!(lines[0].starts_with('╭'));
        assert!(lines[0].contains(" Raspberry Pi Pinout "));
        assert!(lines[25].starts_with('╰'));

        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
    }

    #[test]
    fn test_plain_render_alignment() {
        let lines = plain_lines(&DisplayConfig::default());
        let row = &lines[2];
        // GPIO labels are right aligned against the header glyph.
        assert!(row.contains("3v3  ┃▣ ◎┃ 5v"), "{row}");
        assert!(lines[3].contains("GPIO 2  ┃◎ ◎┃ 5v"), "{}", lines[3]);
        assert!(lines[24].contains("https://pinout.xyz"));
    }

    #[test]
    fn test_colour_render_emits_escapes() {
        let frame = compose(&PinTable::raspberry_pi(), &DisplayConfig::default(), &Theme::default());
        let lines = Renderer::new(true).render(&frame);
        assert!(lines[1].contains('\u{1b}'));
    }

    #[test]
    fn test_layer() {
        let theme = Theme::default();
        let styled = layer(theme.panel, theme.gpio);
        assert_eq!(styled.foreground_color, theme.gpio.foreground_color);
        assert_eq!(styled.background_color, theme.panel.background_color);
    }

    #[test]
    fn test_live_view_redraws_in_place() {
        let mut buffer = Vec::new();
        {
            let mut view = LiveView::new(&mut buffer).unwrap();
            view.draw(&["one".to_string(), "two".to_string()]).unwrap();
            view.draw(&["three".to_string()]).unwrap();
            assert_eq!(view.height(), 1);
        }
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("one\ntwo\n"));
        // Moves up two lines before the second frame.
        assert!(output.contains("\u{1b}[2F"));
        assert!(output.ends_with("\u{1b}[?25h"));
    }

    #[test]
    fn test_live_view_counts_wrapped_rows() {
        let mut buffer = Vec::new();
        {
            let mut view = LiveView::with_columns(&mut buffer, 10).unwrap();
            view.draw(&["x".repeat(25), "short".to_string(), String::new()]).unwrap();
            assert_eq!(view.height(), 5);
            view.draw(&["done".to_string()]).unwrap();
        }
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\u{1b}[5F"));
    }

    #[test]
    fn test_wrapped_rows_ignore_escapes() {
        let frame = compose(&PinTable::raspberry_pi(), &DisplayConfig::default(), &Theme::default());
        let coloured = Renderer::new(true).render(&frame);
        let plain = Renderer::new(false).render(&frame);
        let width = plain[1].chars().count();

        let exact = u16::try_from(width).unwrap();
        assert_eq!(wrapped_rows(&coloured[1], Some(exact)), 1);
        assert_eq!(wrapped_rows(&coloured[1], Some(exact - 1)), 2);
        assert_eq!(wrapped_rows(&coloured[1], None), 1);
    }
}
