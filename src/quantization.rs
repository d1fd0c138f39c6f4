//! Module for (de)quantization of DCT coefficient blocks
use std::fmt;

use crate::error::{CodecError, Result};
use crate::plane::Block;

/// Side length of the quantization matrices
pub const MATRIX_SIZE: usize = 8;

pub type QuantizationTable = [[i32; MATRIX_SIZE]; MATRIX_SIZE];

const Q10: QuantizationTable = [
    [80, 60, 50, 80, 120, 200, 255, 255],
    [55, 60, 70, 95, 130, 255, 255, 255],
    [70, 65, 80, 120, 200, 255, 255, 255],
    [70, 85, 110, 145, 255, 255, 255, 255],
    [90, 110, 185, 255, 255, 255, 255, 255],
    [120, 175, 255, 255, 255, 255, 255, 255],
    [245, 255, 255, 255, 255, 255, 255, 255],
    [255, 255, 255, 255, 255, 255, 255, 255],
];

const Q50: QuantizationTable = [
    [16, 11, 10, 16, 24, 40, 51, 61],
    [12, 12, 14, 19, 26, 58, 60, 55],
    [14, 13, 16, 24, 40, 57, 69, 56],
    [14, 17, 22, 29, 51, 87, 80, 62],
    [18, 22, 37, 56, 68, 109, 103, 77],
    [24, 35, 55, 64, 81, 104, 113, 92],
    [49, 64, 78, 87, 103, 121, 120, 101],
    [72, 92, 95, 98, 112, 100, 130, 99],
];

const Q90: QuantizationTable = [
    [3, 2, 2, 3, 5, 8, 10, 12],
    [2, 2, 3, 4, 5, 12, 12, 11],
    [3, 3, 3, 5, 8, 11, 14, 11],
    [3, 3, 4, 6, 10, 17, 16, 12],
    [4, 4, 7, 11, 14, 22, 21, 15],
    [5, 7, 11, 13, 16, 12, 23, 18],
    [10, 13, 16, 17, 21, 24, 24, 21],
    [14, 18, 19, 20, 22, 20, 20, 20],
];

/// Compression level preset; a higher level keeps more detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantizationLevel {
    Low,
    Medium,
    High,
}

impl QuantizationLevel {
    pub fn value(self) -> u32 {
        match self {
            QuantizationLevel::Low => 10,
            QuantizationLevel::Medium => 50,
            QuantizationLevel::High => 90,
        }
    }

    pub fn matrix(self) -> &'static QuantizationTable {
        match self {
            QuantizationLevel::Low => &Q10,
            QuantizationLevel::Medium => &Q50,
            QuantizationLevel::High => &Q90,
        }
    }
}

impl TryFrom<u32> for QuantizationLevel {
    type Error = CodecError;

    fn try_from(level: u32) -> Result<Self> {
        match level {
            10 => Ok(QuantizationLevel::Low),
            50 => Ok(QuantizationLevel::Medium),
            90 => Ok(QuantizationLevel::High),
            other => Err(CodecError::UnsupportedLevel(other)),
        }
    }
}

impl fmt::Display for QuantizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}", self.value())
    }
}

fn check_shape(block: &Block) -> Result<()> {
    if block.width != MATRIX_SIZE || block.height != MATRIX_SIZE {
        return Err(CodecError::shape(format!(
            "quantization needs a {0}x{0} block, got {1}x{2}", MATRIX_SIZE, block.width, block.height
        )));
    }
    Ok(())
}

/// Divide every coefficient by its matrix entry, truncating toward zero.
pub fn quantize(block: &Block, level: QuantizationLevel) -> Result<Block> {
    check_shape(block)?;
    let matrix = level.matrix();
    let mut result = block.clone();
    for (row, values) in result.data.chunks_mut(MATRIX_SIZE).enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value /= matrix[row][col];
        }
    }
    Ok(result)
}

/// Multiply every coefficient back by its matrix entry.
pub fn dequantize(block: &Block, level: QuantizationLevel) -> Result<Block> {
    check_shape(block)?;
    let matrix = level.matrix();
    let mut result = block.clone();
    for (row, values) in result.data.chunks_mut(MATRIX_SIZE).enumerate() {
        for (col, value) in values.iter_mut().enumerate() {
            *value *= matrix[row][col];
        }
    }
    Ok(result)
}

/// [`quantize`] with a raw level number, as supplied by a caller's level selector.
pub fn quantize_level(block: &Block, level: u32) -> Result<Block> {
    quantize(block, QuantizationLevel::try_from(level)?)
}

/// [`dequantize`] with a raw level number.
pub fn dequantize_level(block: &Block, level: u32) -> Result<Block> {
    dequantize(block, QuantizationLevel::try_from(level)?)
}
