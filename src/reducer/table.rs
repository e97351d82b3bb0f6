use crate::reducer::blocks::{resolve_text, Block, BlockIndex, BlockType, RelationshipType};

/// Grids larger than this many positions are not materialized.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Lays a TABLE block's CELL children into a dense row-major grid.
///
/// Cell indices are 1-based in provider output. The grid spans the largest
/// observed row and column; positions without a cell hold an empty string.
/// A cell whose row or column exceeds the number of cells in the table is
/// dropped, and a grid over [`MAX_GRID_CELLS`] positions yields no rows.
/// A table with no usable cells yields no rows.
pub fn reduce_table(table: &Block, index: &BlockIndex<'_>) -> Vec<Vec<String>> {
    let children: Vec<&Block> = index
        .related(table, RelationshipType::Child)
        .into_iter()
        .filter(|block| block.kind == BlockType::Cell)
        .collect();
    let bound = children.len();

    let cells: Vec<(usize, usize, String)> = children
        .into_iter()
        .filter_map(|cell| {
            let row = cell
                .row_index
                .filter(|row| *row >= 1 && *row as usize <= bound)?;
            let col = cell
                .column_index
                .filter(|col| *col >= 1 && *col as usize <= bound)?;
            Some((
                (row - 1) as usize,
                (col - 1) as usize,
                resolve_text(cell, index),
            ))
        })
        .collect();

    let Some(max_row) = cells.iter().map(|(row, _, _)| *row).max() else {
        return Vec::new();
    };
    let max_col = cells.iter().map(|(_, col, _)| *col).max().unwrap_or(0);
    match (max_row + 1).checked_mul(max_col + 1) {
        Some(area) if area <= MAX_GRID_CELLS => {}
        _ => return Vec::new(),
    }

    let mut grid = vec![vec![String::new(); max_col + 1]; max_row + 1];
    for (row, col, text) in cells {
        grid[row][col] = text;
    }
    grid
}
