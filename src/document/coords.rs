//! Conversion between byte offsets, tree-sitter points and host positions
//!
//! Rows count `\n` only, which is what tree-sitter uses for `Point::row`.
//! Columns inside a [`Point`] are byte columns; the host may want UTF-16
//! code units instead, see [`PositionEncoding`].

use ropey::Rope;
use serde::{Deserialize, Serialize};
use tree_sitter::Point;

use crate::errors::{HighlightError, Result};

/// Column unit the host uses for positions it renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionEncoding {
    /// Byte columns, identical to tree-sitter's.
    Utf8,
    /// UTF-16 code units (VS Code and the LSP default).
    #[default]
    Utf16,
}

/// Translates a byte offset into a (row, byte column) point in `text`.
///
/// An offset past the end of the snapshot, or one that splits a multi-byte
/// character, means the host's edit does not belong to this snapshot.
pub fn to_point(text: &Rope, byte: usize) -> Result<Point> {
    let len = text.len_bytes();
    if byte > len || !is_char_boundary(text, byte) {
        return Err(HighlightError::OffsetOutOfRange { offset: byte, len });
    }
    let row = text.byte_to_line(byte);
    let column = byte - text.line_to_byte(row);
    Ok(Point { row, column })
}

fn is_char_boundary(text: &Rope, byte: usize) -> bool {
    text.char_to_byte(text.byte_to_char(byte)) == byte
}

/// Converts a tree point into the host's position representation.
///
/// Points produced by a tree are always valid for the snapshot that tree was
/// parsed from; a point beyond it is clamped to the end of the text.
pub fn to_host_position(text: &Rope, point: Point, encoding: PositionEncoding) -> lsp_types::Position {
    match encoding {
        PositionEncoding::Utf8 => lsp_types::Position::new(point.row as u32, point.column as u32),
        PositionEncoding::Utf16 => {
            let last_row = text.len_lines().saturating_sub(1);
            if point.row > last_row {
                let end = text.line(last_row);
                return lsp_types::Position::new(last_row as u32, end.len_utf16_cu() as u32);
            }
            let line = text.line(point.row);
            let byte = point.column.min(line.len_bytes());
            let char_idx = line.byte_to_char(byte);
            lsp_types::Position::new(point.row as u32, line.char_to_utf16_cu(char_idx) as u32)
        }
    }
}

/// Converts a pair of tree points into a host range.
pub fn to_host_range(text: &Rope, start: Point, end: Point, encoding: PositionEncoding) -> lsp_types::Range {
    lsp_types::Range::new(
        to_host_position(text, start, encoding),
        to_host_position(text, end, encoding),
    )
}
