//! Splitting layers into square blocks and joining them back
use crate::error::{CodecError, Result};
use crate::plane::{Block, Layer, Plane};

/// Blocks of one layer, in rows of blocks from top-left to bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGrid<B> {
    pub rows: Vec<Vec<B>>,
}

impl<B> BlockGrid<B> {
    pub fn new(rows: Vec<Vec<B>>) -> Self {
        BlockGrid { rows }
    }

    /// Number of blocks per row of the grid.
    pub fn width_in_blocks(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height_in_blocks(&self) -> usize {
        self.rows.len()
    }

    pub fn block_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Blocks in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &B> + '_ {
        self.rows.iter().flatten()
    }

    pub fn try_map<U, F>(&self, mut f: F) -> Result<BlockGrid<U>>
    where
        F: FnMut(&B) -> Result<U>,
    {
        let rows = self
            .rows
            .iter()
            .map(|row| row.iter().map(&mut f).collect::<Result<Vec<U>>>())
            .collect::<Result<Vec<_>>>()?;
        Ok(BlockGrid { rows })
    }
}

/// Cut `layer` into `block_size` square blocks.
///
/// Blocks hanging over the right or bottom edge repeat the last column and
/// last row of the layer, so every block is full.
pub fn split(layer: &Layer, block_size: usize) -> Result<BlockGrid<Block>> {
    if block_size == 0 {
        return Err(CodecError::shape("block size must be at least 1"));
    }
    if layer.is_empty() {
        return Err(CodecError::EmptyInput { context: "block split" });
    }
    let grid_width = layer.width.div_ceil(block_size);
    let grid_height = layer.height.div_ceil(block_size);

    let mut rows = Vec::with_capacity(grid_height);
    for block_row in 0..grid_height {
        let mut row = Vec::with_capacity(grid_width);
        for block_col in 0..grid_width {
            let mut block = Plane::new(block_size, block_size);
            for r in 0..block_size {
                let y = (block_row * block_size + r).min(layer.height - 1);
                for c in 0..block_size {
                    let x = (block_col * block_size + c).min(layer.width - 1);
                    block.set(r, c, layer.get(y, x));
                }
            }
            row.push(block);
        }
        rows.push(row);
    }
    Ok(BlockGrid { rows })
}

/// Lay the blocks side by side again. Edge padding added by [`split`] is kept.
pub fn join(grid: &BlockGrid<Block>) -> Result<Layer> {
    let Some(first) = grid.iter().next() else {
        return Ok(Plane::new(0, 0));
    };
    let block_size = first.width;
    let grid_width = grid.width_in_blocks();
    for (index, row) in grid.rows.iter().enumerate() {
        if row.len() != grid_width {
            return Err(CodecError::shape(format!(
                "block row {} has {} blocks, expected {}", index, row.len(), grid_width
            )));
        }
        if let Some(block) = row.iter().find(|b| b.width != block_size || b.height != block_size) {
            return Err(CodecError::shape(format!(
                "{}x{} block in a grid of {}x{} blocks", block.width, block.height, block_size, block_size
            )));
        }
    }

    let width = grid_width * block_size;
    let height = grid.height_in_blocks() * block_size;
    let mut data = Vec::with_capacity(width * height);
    for row in &grid.rows {
        for r in 0..block_size {
            for block in row {
                data.extend_from_slice(&block.data[r * block_size..(r + 1) * block_size]);
            }
        }
    }
    Plane::from_vec(data, width, height)
}
