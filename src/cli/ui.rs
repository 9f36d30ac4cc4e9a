use crate::core::synthesis::{Confidence, Signal};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    Warning,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right-aligned numeric cell.
pub fn number_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "—".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("—")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Creates a cell for the performance delta with color coding.
pub fn delta_cell(delta: i32) -> Cell {
    let text = format!("{delta:+}");
    let cell = Cell::new(text).set_alignment(CellAlignment::Right);
    match delta {
        d if d > 0 => cell.fg(Color::Red),
        d if d < 0 => cell.fg(Color::Green),
        _ => cell.fg(Color::DarkGrey),
    }
}

/// Buy signals read green, sell signals red.
pub fn signal_cell(signal: Signal) -> Cell {
    let cell = Cell::new(signal.to_string());
    match signal {
        Signal::Buy => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        Signal::Sell => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Signal::Heating => cell.fg(Color::Yellow),
        Signal::Cooling => cell.fg(Color::Blue),
        Signal::Neutral => cell.fg(Color::DarkGrey),
    }
}

pub fn verdict_cell(label: String, confidence: Confidence) -> Cell {
    let cell = Cell::new(label);
    match confidence {
        Confidence::High => cell.add_attribute(Attribute::Bold),
        Confidence::Medium => cell,
        Confidence::Low => cell.fg(Color::DarkGrey),
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb
}
