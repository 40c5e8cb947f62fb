//! Grid parser turning level text into entity descriptors.

use marble_maze_core::{EntityDescriptor, EntityKind, LevelLayout, Position};

use crate::LevelError;

/// Symbol that leaves a tile empty.
pub const EMPTY_SYMBOL: char = ' ';

/// Parses level text into a layout.
///
/// Lines are split on `\n` and read bottom-to-top, so the last line of the
/// text is grid row zero; a trailing newline therefore produces an empty
/// bottom row. A single trailing `\r` is ignored on every line. Lines may have
/// different lengths. The first unknown symbol aborts parsing.
pub fn parse_level(text: &str, level: u32) -> Result<LevelLayout, LevelError> {
    let lines: Vec<&str> = text.split('\n').collect();
    let line_count = lines.len();
    let mut descriptors = Vec::new();

    for ((row, &line), row_offset) in (0_u32..).zip(lines.iter().rev()).zip(0_usize..) {
        let line = line.strip_suffix('\r').unwrap_or(line);
        for (column, symbol) in (0_u32..).zip(line.chars()) {
            if symbol == EMPTY_SYMBOL {
                continue;
            }

            let kind = EntityKind::from_symbol(symbol).ok_or_else(|| LevelError::UnknownSymbol {
                level,
                symbol,
                line: line_count - row_offset,
                column,
                row,
            })?;
            descriptors.push(EntityDescriptor::new(
                kind,
                Position::tile_center(column, row),
            ));
        }
    }

    Ok(LevelLayout::new(level, descriptors))
}
