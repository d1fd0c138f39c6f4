//! Two dimensional discrete cosine transform on sample blocks
//!
//! The forward transform is the unscaled DCT-II applied to rows, then to
//! columns. The inverse applies the matching DCT-III with its `2/N` scale per
//! dimension, columns first, so that `inverse(forward(b))` lands back near `b`.
use std::f64::consts::PI;

use crate::plane::{Block, Plane};

/// Offset that centres 8-bit samples around zero
pub const LEVEL_SHIFT: f64 = 128.0;

fn dct_ii(input: &[f64]) -> Vec<f64> {
    let n = input.len() as f64;
    (0..input.len())
        .map(|k| {
            input.iter().enumerate()
                .map(|(j, x)| x * ((j as f64 + 0.5) * k as f64 * PI / n).cos())
                .sum()
        })
        .collect()
}

fn dct_iii(input: &[f64]) -> Vec<f64> {
    let n = input.len() as f64;
    (0..input.len())
        .map(|j| {
            let ac: f64 = input.iter().enumerate().skip(1)
                .map(|(k, x)| x * ((j as f64 + 0.5) * k as f64 * PI / n).cos())
                .sum();
            2.0 / n * (input[0] / 2.0 + ac)
        })
        .collect()
}

fn transform_rows(data: &mut [f64], width: usize, f: fn(&[f64]) -> Vec<f64>) {
    for row in data.chunks_mut(width.max(1)) {
        let transformed = f(row);
        row.copy_from_slice(&transformed);
    }
}

fn transform_columns(data: &mut [f64], width: usize, height: usize, f: fn(&[f64]) -> Vec<f64>) {
    for col in 0..width {
        let column: Vec<f64> = (0..height).map(|row| data[row * width + col]).collect();
        for (row, value) in f(&column).into_iter().enumerate() {
            data[row * width + col] = value;
        }
    }
}

/// Level-shift and transform a block; coefficients are truncated toward zero.
pub fn forward(block: &Block) -> Block {
    let mut data: Vec<f64> = block.data.iter().map(|&v| v as f64 - LEVEL_SHIFT).collect();
    transform_rows(&mut data, block.width, dct_ii);
    transform_columns(&mut data, block.width, block.height, dct_ii);
    Plane {
        data: data.into_iter().map(|v| v as i32).collect(),
        width: block.width,
        height: block.height,
    }
}

/// Inverse transform, undo the level shift, round and clamp to `0..=255`.
pub fn inverse(block: &Block) -> Block {
    let mut data: Vec<f64> = block.data.iter().map(|&v| v as f64).collect();
    transform_columns(&mut data, block.width, block.height, dct_iii);
    transform_rows(&mut data, block.width, dct_iii);
    Plane {
        data: data.into_iter()
            .map(|v| (v + LEVEL_SHIFT).round().clamp(0.0, 255.0) as i32)
            .collect(),
        width: block.width,
        height: block.height,
    }
}
