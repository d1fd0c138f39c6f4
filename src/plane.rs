//! Row-major two dimensional matrices: image layers, blocks and pixel images
use std::slice::Chunks;

use crate::error::{CodecError, Result};

/// A `width` x `height` matrix stored row after row.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T> {
    pub data: Vec<T>,
    pub width: usize,
    pub height: usize,
}

impl<T: Copy + Default> Plane<T> {
    pub fn new(width: usize, height: usize) -> Plane<T> {
        Plane {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Copy> Plane<T> {
    /// Build a plane from nested rows; all rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Plane<T>> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(CodecError::shape(format!(
                "row {} has {} values, expected {}", bad, rows[bad].len(), width
            )));
        }
        let data = rows.into_iter().flatten().collect();
        Ok(Plane { data, width, height })
    }

    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> Result<Plane<T>> {
        if data.len() != width * height {
            return Err(CodecError::shape(format!(
                "{} values cannot fill a {}x{} plane", data.len(), width, height
            )));
        }
        Ok(Plane { data, width, height })
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.width + col] = value;
    }

    pub fn rows(&self) -> Chunks<'_, T> {
        // chunks(0) panics
        self.data.chunks(self.width.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        if self.width == 0 {
            return vec![vec![]; self.height];
        }
        self.rows().map(|row| row.to_vec()).collect()
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Apply `f` to every element, keeping the geometry.
    pub fn map<U, F: FnMut(T) -> U>(&self, f: F) -> Plane<U> {
        Plane {
            data: self.data.iter().copied().map(f).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// Keep the top-left `width` x `height` window.
    pub fn crop(&self, width: usize, height: usize) -> Result<Plane<T>> {
        if width > self.width || height > self.height {
            return Err(CodecError::shape(format!(
                "cannot crop {}x{} plane to {}x{}", self.width, self.height, width, height
            )));
        }
        let data = self.rows()
            .take(height)
            .flat_map(|row| row[..width].iter().copied())
            .collect();
        Ok(Plane { data, width, height })
    }
}

/// Square sample block, the unit of DCT, quantization and zigzag processing.
pub type Block = Plane<i32>;

/// A single colour channel of an image.
pub type Layer = Plane<i32>;

/// Pixel image with three channels per pixel, either RGB or YCbCr.
pub type PixelImage = Plane<[i32; 3]>;
