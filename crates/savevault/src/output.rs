//! Rendering the save list

use std::io::Write;

use comfy_table::{
    modifiers::UTF8_SOLID_INNER_BORDERS, presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, Table,
};
use uuid::Uuid;

use crate::entry::SaveEntry;

const SELECTED_MARKER: &str = "*";

/// One row per entry, numbered from 1. The selected row is marked with `*`.
pub fn write_table<W: Write>(
    out: &mut W,
    entries: &[SaveEntry],
    selected: Option<Uuid>,
) -> std::io::Result<()> {
    if entries.is_empty() {
        writeln!(out, "No saves yet.")?;
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_header(vec!["", "#", "NAME", "CREATED", "ID"]);

    for (index, entry) in entries.iter().enumerate() {
        let marker = if Some(entry.id) == selected {
            SELECTED_MARKER
        } else {
            ""
        };

        table.add_row(vec![
            Cell::new(marker),
            Cell::new(index + 1).set_alignment(CellAlignment::Right),
            Cell::new(&entry.name),
            Cell::new(&entry.created_at),
            Cell::new(entry.id),
        ]);
    }

    writeln!(out, "{table}")
}

pub fn write_json<W: Write>(out: &mut W, entries: &[SaveEntry]) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, entries)?;
    writeln!(out)?;

    Ok(())
}
