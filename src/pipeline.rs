//! End-to-end lossy image coding: RGB pixels to `.img` and back
//!
//! Encoding converts to YCbCr, splits every channel into blocks and runs each
//! block through the DCT, quantization and the zigzag scan before handing the
//! three coefficient grids to an [`ImageContainer`]. Decoding walks the same
//! steps in reverse and crops the edge padding away again.
use std::path::Path;

use crate::block::{self, BlockGrid};
use crate::color;
use crate::config::CodecConfig;
use crate::container::{CoefficientGrid, ImageContainer};
use crate::dct;
use crate::error::{CodecError, Result};
use crate::plane::{Block, Layer, PixelImage};
use crate::quantization::{self, QuantizationLevel};
use crate::zigzag;

#[derive(Debug, Clone)]
pub struct ImageCodec {
    config: CodecConfig,
}

fn encode_block(block: &Block, level: QuantizationLevel) -> Result<Vec<i32>> {
    zigzag::zigzag(&quantization::quantize(&dct::forward(block), level)?)
}

fn decode_block(coefficients: &[i32], level: QuantizationLevel) -> Result<Block> {
    Ok(dct::inverse(&quantization::dequantize(&zigzag::un_zigzag(coefficients)?, level)?))
}

impl ImageCodec {
    /// Fails unless the configured block size matches the quantization matrices.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.validate_for_quantization()?;
        Ok(ImageCodec { config })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn encode_layer(&self, layer: &Layer) -> Result<CoefficientGrid> {
        let level = self.config.level;
        block::split(layer, self.config.block_size)?.try_map(|block| encode_block(block, level))
    }

    fn decode_layer(&self, grid: &CoefficientGrid, width: usize, height: usize) -> Result<Layer> {
        let level = self.config.level;
        let blocks: BlockGrid<Block> = grid.try_map(|coefficients| decode_block(coefficients, level))?;
        block::join(&blocks)?.crop(width, height)
    }

    /// Compress `image` into a container in the `Encoded` state.
    pub fn encode(&self, image: &PixelImage) -> Result<ImageContainer> {
        if image.is_empty() {
            return Err(CodecError::EmptyInput { context: "image encode" });
        }
        let [y, cb, cr] = color::separate_layers(&color::image_rgb_to_ycbcr(image));
        let grids = [self.encode_layer(&y)?, self.encode_layer(&cb)?, self.encode_layer(&cr)?];
        self.config.diagnostics.debug(format_args!(
            "Transformed {}x{} image at {} into {} blocks per layer",
            image.width, image.height, self.config.level, grids[0].block_count()
        ));

        let mut container = ImageContainer::new(&self.config);
        container.encode(&grids, image.width, image.height)?;
        Ok(container)
    }

    /// Rebuild the RGB image held by a container that was encoded or read.
    ///
    /// The quantization level is not stored in the file; the codec's own
    /// level must match the one used for encoding.
    pub fn decode(&self, container: &mut ImageContainer) -> Result<PixelImage> {
        let grids = container.decode()?;
        let header = *container.header();
        let (width, height) = (header.width as usize, header.height as usize);
        if header.block_size as usize != self.config.block_size {
            return Err(CodecError::shape(format!(
                "container holds {0}x{0} blocks, codec expects {1}x{1}",
                header.block_size, self.config.block_size
            )));
        }
        let [y, cb, cr] = &grids;
        let layers = [
            self.decode_layer(y, width, height)?,
            self.decode_layer(cb, width, height)?,
            self.decode_layer(cr, width, height)?,
        ];
        Ok(color::image_ycbcr_to_rgb(&color::join_layers(&layers)?))
    }

    /// Encode `image` and write it to `path`, returning the file size.
    pub fn compress_to_file<P: AsRef<Path>>(&self, image: &PixelImage, path: P) -> Result<u64> {
        let mut container = self.encode(image)?;
        container.write(path)
    }

    pub fn decompress_file<P: AsRef<Path>>(&self, path: P) -> Result<PixelImage> {
        let mut container = ImageContainer::new(&self.config);
        container.read(path)?;
        self.decode(&mut container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;

    fn gradient(width: usize, height: usize) -> PixelImage {
        let data = (0..width * height)
            .map(|i| {
                let (row, col) = ((i / width) as i32, (i % width) as i32);
                [(col * 16) % 256, (row * 16) % 256, 128]
            })
            .collect();
        Plane::from_vec(data, width, height).unwrap()
    }

    #[test]
    fn test_rejects_block_size() {
        let config = CodecConfig::builder().block_size(4).build().unwrap();
        assert!(matches!(ImageCodec::new(config), Err(CodecError::Shape { .. })));
    }

    #[test]
    fn test_empty_image() {
        let codec = ImageCodec::new(CodecConfig::default()).unwrap();
        assert!(matches!(codec.encode(&Plane::new(0, 0)), Err(CodecError::EmptyInput { .. })));
    }

    #[test]
    fn test_encode_decode_keeps_size() {
        let codec = ImageCodec::new(CodecConfig::default()).unwrap();
        let image = gradient(13, 9);
        let mut container = codec.encode(&image).unwrap();
        assert_eq!(container.header().width_in_cols, 2);
        let decoded = codec.decode(&mut container).unwrap();
        assert_eq!((decoded.width, decoded.height), (13, 9));
        assert!(decoded.data.iter().flatten().all(|v| (0..=255).contains(v)));
    }

    #[test]
    fn test_flat_image_survives() {
        let codec = ImageCodec::new(CodecConfig::builder().level(90).build().unwrap()).unwrap();
        let image = Plane::from_vec(vec![[90, 90, 90]; 64], 8, 8).unwrap();
        let mut container = codec.encode(&image).unwrap();
        let decoded = codec.decode(&mut container).unwrap();
        for (original, restored) in image.data.iter().zip(&decoded.data) {
            for (a, b) in original.iter().zip(restored) {
                assert!((a - b).abs() <= 3, "{:?} vs {:?}", original, restored);
            }
        }
    }
}
