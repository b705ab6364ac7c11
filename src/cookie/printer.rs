use super::jar::CookieJar;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Table};

/// Render a cached jar as a table, one cookie per row.
pub fn render_jar(key: &str, jar: &CookieJar) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![format!("Cookie ({})", key), "Value".to_string()]);

    for (name, value) in jar.iter() {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).add_attribute(Attribute::Dim),
        ]);
    }

    table.to_string()
}
