//! Zigzag scan between square blocks and coefficient vectors
use crate::error::{CodecError, Result};
use crate::plane::{Block, Plane};

/// Row-major positions of an `n` x `n` block in zigzag visiting order.
///
/// Diagonals `row + col = d` are walked in turn; even diagonals run from
/// bottom-left to top-right, odd ones from top-right to bottom-left.
pub fn scan_order(n: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(n * n);
    for diagonal in 0..(2 * n).saturating_sub(1) {
        let first_row = diagonal.saturating_sub(n - 1);
        let last_row = diagonal.min(n - 1);
        if diagonal % 2 == 0 {
            for row in (first_row..=last_row).rev() {
                order.push(row * n + (diagonal - row));
            }
        } else {
            for row in first_row..=last_row {
                order.push(row * n + (diagonal - row));
            }
        }
    }
    order
}

pub fn zigzag(block: &Block) -> Result<Vec<i32>> {
    if !block.is_square() {
        return Err(CodecError::shape(format!(
            "zigzag needs a square block, got {}x{}", block.width, block.height
        )));
    }
    Ok(scan_order(block.width).into_iter().map(|index| block.data[index]).collect())
}

/// Write `vector` back into an `n` x `n` block, `n` being the square root of its length.
pub fn un_zigzag(vector: &[i32]) -> Result<Block> {
    let n = exact_sqrt(vector.len()).ok_or_else(|| {
        CodecError::shape(format!("{} coefficients do not fill a square block", vector.len()))
    })?;
    let mut block = Plane::new(n, n);
    for (&value, index) in vector.iter().zip(scan_order(n)) {
        block.data[index] = value;
    }
    Ok(block)
}

fn exact_sqrt(len: usize) -> Option<usize> {
    let root = (len as f64).sqrt().round() as usize;
    (root * root == len).then_some(root)
}
