//! Signal and image compression: Huffman and LZW coding, and a JPEG-like
//! lossy image pipeline stored in a compact `.img` container.
//!
//! ```
//! use sigpress::{HuffmanCodec, LzwCodec};
//! # fn main() -> sigpress::Result<()> {
//! let mut huffman: HuffmanCodec = HuffmanCodec::default();
//! assert_eq!(huffman.encode(&[1, 1, 1, 1, 10])?, vec!["1", "1", "1", "1", "0"]);
//! assert_eq!(huffman.compression_ratio(None), 10.0);
//!
//! let mut lzw: LzwCodec = LzwCodec::default();
//! let codes = lzw.encode(&[123, 123, 100, 100, 100, 100, 99, 99, 50, 10])?;
//! assert_eq!(codes, vec![0, 0, 1, 7, 1, 2, 2, 3, 4]);
//! # Ok(())
//! # }
//! ```
pub mod block;
pub mod color;
pub mod compressor;
pub mod config;
pub mod container;
pub mod dct;
pub mod entropy;
pub mod error;
pub mod pipeline;
pub mod plane;
pub mod quantization;
pub mod zigzag;

/// Integer sample or coefficient value handled by the coders
pub type Symbol = i32;

pub use compressor::{CompressionReport, SampleCompressor};
pub use config::{CodecConfig, Diagnostics};
pub use container::{ContainerState, ImageContainer, ImgHeader};
pub use entropy::{HuffmanCodec, LzwCodec};
pub use error::{CodecError, Result};
pub use pipeline::ImageCodec;
pub use plane::{Block, Layer, PixelImage, Plane};
pub use quantization::QuantizationLevel;
