//! Fixed-width table renderer
//!
//! Renders a [`QueryTable`] the way the console has always shown results:
//! right-justified cells in columns sized to their widest content. Right
//! alignment is a deliberate choice for numeric-heavy catalog data, not a
//! default anyone should flip quietly.

use super::exec::QueryTable;

/// Fixed padding added to every column on top of its widest content.
const COLUMN_PADDING: usize = 2;

/// Per-column width: the wider of the header and any cell, plus padding.
/// Widths are measured in chars, which is as close to display width as a
/// plain console needs.
fn column_widths(table: &QueryTable) -> Vec<usize> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cells = table.rows.iter().map(|row| row[i].chars().count());
            let widest = cells.max().unwrap_or(0).max(name.chars().count());
            widest + COLUMN_PADDING
        })
        .collect()
}

/// Renders the table: a rule of `-`, the header, a rule, the rows, and a
/// closing rule. Every line is right-justified into the computed widths.
pub fn render_table(table: &QueryTable) -> String {
    let widths = column_widths(table);
    let rule = "-".repeat(widths.iter().sum());

    let mut lines = Vec::with_capacity(table.rows.len() + 4);
    lines.push(rule.clone());
    lines.push(format_row(&table.columns, &widths));
    lines.push(rule.clone());
    for row in &table.rows {
        lines.push(format_row(row, &widths));
    }
    lines.push(rule);

    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat(' ').take(pad));
        line.push_str(cell);
    }
    line
}
