//! Shared styling for human-readable tables.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

const RESET: &str = "\x1b[0m";
const BOLD_CYAN: &str = "\x1b[1;36m";
const GREY: &str = "\x1b[90m";

/// Named colors used across report sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Warn,
    Bad,
    Info,
    Plain,
}

impl Tone {
    fn color(&self) -> Option<Color> {
        match self {
            Tone::Good => Some(Color::Green),
            Tone::Warn => Some(Color::Yellow),
            Tone::Bad => Some(Color::Red),
            Tone::Info => Some(Color::Cyan),
            Tone::Plain => None,
        }
    }

    fn ansi(&self) -> Option<&'static str> {
        match self {
            Tone::Good => Some("\x1b[32m"),
            Tone::Warn => Some("\x1b[33m"),
            Tone::Bad => Some("\x1b[1;31m"),
            Tone::Info => Some("\x1b[36m"),
            Tone::Plain => None,
        }
    }
}

/// Color-aware helpers for titles, headings and table construction.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    use_color: bool,
    width: u16,
}

impl Palette {
    pub fn new(use_color: bool, width: u16) -> Self {
        Self { use_color, width }
    }

    pub fn title(&self, text: &str) -> String {
        self.paint(BOLD_CYAN, text)
    }

    pub fn heading(&self, text: &str) -> String {
        self.paint(BOLD_CYAN, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(GREY, text)
    }

    pub fn tone(&self, tone: Tone, text: &str) -> String {
        match tone.ansi() {
            Some(code) => self.paint(code, text),
            None => text.to_string(),
        }
    }

    /// A cell colored by tone when color is enabled.
    pub fn cell(&self, text: impl ToString, tone: Tone) -> Cell {
        let cell = Cell::new(text);
        match (self.use_color, tone.color()) {
            (true, Some(color)) => cell.fg(color),
            _ => cell,
        }
    }

    /// A bordered table with the shared preset and width.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_width(self.width);

        if self.use_color {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }
        table
    }

    /// A table with a bold header row.
    pub fn table_with_header(&self, header: &[&str]) -> Table {
        let mut table = self.table();
        let cells: Vec<Cell> = header
            .iter()
            .map(|h| {
                let cell = Cell::new(h).set_alignment(CellAlignment::Center);
                if self.use_color {
                    cell.add_attribute(Attribute::Bold).fg(Color::Cyan)
                } else {
                    cell
                }
            })
            .collect();
        table.set_header(cells);
        table
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_color {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}

/// Center-align every column after the first.
pub fn center_columns_after_first(table: &mut Table) {
    let count = table.column_count();
    for index in 1..count {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Center);
        }
    }
}

/// Truncate from the left so that at most `max` characters remain, marking the cut with `...`.
pub fn truncate_left(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max || max <= 3 {
        return text.to_string();
    }
    let keep = max - 3;
    let tail: String = text.chars().skip(count - keep).collect();
    format!("...{}", tail)
}
