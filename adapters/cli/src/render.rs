//! Plain-text rendering of generated maps.

use night_shift_core::{CellCoord, TileKind, TileMap};

fn glyph(kind: TileKind) -> char {
    match kind {
        TileKind::Grass => '.',
        TileKind::Tree => 'T',
        TileKind::Rock => 'o',
        TileKind::Stall => '#',
        TileKind::Path => ':',
        TileKind::Checkpoint => '+',
        TileKind::Objective => 'X',
        TileKind::Chest => '$',
    }
}

/// Renders one line per row. Player spawns are drawn as `S` over their tile.
pub(crate) fn render_map(map: &TileMap) -> String {
    let mut text = String::with_capacity(((map.columns() + 1) * map.rows()) as usize);
    for (row, tiles) in map.rows_iter().enumerate() {
        for (column, tile) in tiles.iter().enumerate() {
            let cell = CellCoord::new(column as u32, row as u32);
            if map.spawns().contains(&cell) {
                text.push('S');
            } else {
                text.push(glyph(*tile));
            }
        }
        text.push('\n');
    }
    text
}
