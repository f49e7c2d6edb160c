//! Display primitives for CLI output formatting.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Section heading for a store block.
pub fn section(title: &str) -> String {
    format!("{}", console::style(title).bold().underlined())
}

/// Render a table with a heading, or a placeholder when empty.
pub fn render_section(title: &str, table: Table, total: usize) -> String {
    if total == 0 {
        return format!("{}\n  (empty)", section(title));
    }
    format!("{}\n{table}", section(title))
}
