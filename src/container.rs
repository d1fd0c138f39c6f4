//! The `.img` container: header, serialized code tree and Huffman payload
//!
//! ```text
//! offset 0   width              u32 LE, image width in pixels
//! offset 4   height             u32 LE, image height in pixels
//! offset 8   block_size         u32 LE
//! offset 12  width_in_cols      u32 LE, blocks per block row
//! offset 16  main_data_padding  u32 LE, zero bits appended to the payload
//! offset 20  tree_byte_length   u32 LE
//! offset 24  tree_padding       u32 LE, zero bits appended to the tree
//! offset 28  tree bytes, then payload bytes up to the end of the file
//! ```
//!
//! A container moves through `Empty -> Encoded -> Written` on the writing side
//! and `Read -> Decoded` on the reading side. A flushed write clears the in-memory
//! image fields, so a decode always starts from what was read back.
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::block::BlockGrid;
use crate::config::{CodecConfig, Diagnostics};
use crate::entropy::bits;
use crate::entropy::{HuffmanCodec, LeafWidth, SerializedTree};
use crate::error::{CodecError, Result};
use crate::Symbol;

/// Size of the fixed header in bytes
pub const HEADER_LEN: usize = 28;
/// Colour layers stored in one container
pub const LAYER_COUNT: usize = 3;
/// Quantized coefficients are signed and may exceed a byte.
pub const TREE_LEAF_WIDTH: LeafWidth = LeafWidth::Short;

/// Zigzag coefficient vectors of one layer, arranged as its block grid.
pub type CoefficientGrid = BlockGrid<Vec<Symbol>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImgHeader {
    pub width: u32,
    pub height: u32,
    pub block_size: u32,
    pub width_in_cols: u32,
    pub main_data_padding: u32,
    pub tree_byte_length: u32,
    pub tree_padding: u32,
}

impl ImgHeader {
    fn fields(&self) -> [u32; 7] {
        [
            self.width,
            self.height,
            self.block_size,
            self.width_in_cols,
            self.main_data_padding,
            self.tree_byte_length,
            self.tree_padding,
        ]
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        for (chunk, field) in bytes.chunks_exact_mut(4).zip(self.fields()) {
            chunk.copy_from_slice(&field.to_le_bytes());
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; HEADER_LEN]) -> Self {
        let mut fields = [0u32; 7];
        for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
            *field = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let [
            width,
            height,
            block_size,
            width_in_cols,
            main_data_padding,
            tree_byte_length,
            tree_padding,
        ] = fields;
        ImgHeader {
            width,
            height,
            block_size,
            width_in_cols,
            main_data_padding,
            tree_byte_length,
            tree_padding,
        }
    }

    /// Block rows needed to cover `height` pixels.
    pub fn height_in_blocks(&self) -> usize {
        if self.block_size == 0 {
            return 0;
        }
        (self.height as usize).div_ceil(self.block_size as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Empty,
    Encoded,
    Written,
    Read,
    Decoded,
}

impl ContainerState {
    pub fn name(self) -> &'static str {
        match self {
            ContainerState::Empty => "EMPTY",
            ContainerState::Encoded => "ENCODED",
            ContainerState::Written => "WRITTEN",
            ContainerState::Read => "READ",
            ContainerState::Decoded => "DECODED",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ImageContainer {
    header: ImgHeader,
    state: ContainerState,
    huffman: HuffmanCodec<Symbol>,
    encoded_bits: String,
    file_size: Option<u64>,
    config: CodecConfig,
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        CodecError::invalid_container(format!("{} of {} does not fit in 32 bits", what, value))
    })
}

impl ImageContainer {
    pub fn new(config: &CodecConfig) -> Self {
        ImageContainer {
            header: ImgHeader::default(),
            state: ContainerState::Empty,
            huffman: HuffmanCodec::new(config),
            encoded_bits: String::new(),
            file_size: None,
            config: config.clone(),
        }
    }

    pub fn header(&self) -> &ImgHeader {
        &self.header
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    /// Bytes written by the last `write` or consumed by the last `read`.
    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    /// Huffman payload before padding.
    pub fn encoded_bits(&self) -> &str {
        &self.encoded_bits
    }

    fn diagnostics(&self) -> &Diagnostics {
        &self.config.diagnostics
    }

    fn expect_state(&self, operation: &'static str, allowed: &[ContainerState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(CodecError::InvalidState { operation, state: self.state.name() })
        }
    }

    /// Flatten three coefficient grids (layer, block row, block, coefficient)
    /// and Huffman-code them.
    pub fn encode(
        &mut self,
        layers: &[CoefficientGrid; LAYER_COUNT],
        width: usize,
        height: usize,
    ) -> Result<()> {
        let block_len = layers[0].iter().next().map_or(0, Vec::len);
        let block_size = (block_len as f64).sqrt().round() as usize;
        if block_len == 0 || block_size * block_size != block_len {
            return Err(CodecError::shape(format!(
                "{} coefficients per block do not form a square block", block_len
            )));
        }
        let width_in_cols = width.div_ceil(block_size);
        let height_in_blocks = height.div_ceil(block_size);
        for (index, layer) in layers.iter().enumerate() {
            if layer.width_in_blocks() != width_in_cols
                || layer.height_in_blocks() != height_in_blocks
            {
                return Err(CodecError::shape(format!(
                    "layer {} is {}x{} blocks, a {}x{} image needs {}x{}",
                    index, layer.width_in_blocks(), layer.height_in_blocks(),
                    width, height, width_in_cols, height_in_blocks
                )));
            }
            if layer.rows.iter().any(|row| row.len() != width_in_cols)
                || layer.iter().any(|block| block.len() != block_len) {
                return Err(CodecError::shape(format!("layer {} has ragged blocks", index)));
            }
        }

        let samples: Vec<Symbol> = layers.iter()
            .flat_map(|layer| layer.iter())
            .flat_map(|block| block.iter().copied())
            .collect();
        let mut huffman = HuffmanCodec::new(&self.config);
        let encoded_bits = huffman.encode_to_bits(&samples)?;

        self.header = ImgHeader {
            width: to_u32(width, "width")?,
            height: to_u32(height, "height")?,
            block_size: to_u32(block_size, "block size")?,
            width_in_cols: to_u32(width_in_cols, "block grid width")?,
            ..ImgHeader::default()
        };
        self.diagnostics().debug(format_args!(
            "Encoded {} coefficients of a {}x{} image into {} bits (ratio {})",
            samples.len(), width, height, encoded_bits.len(), huffman.compression_ratio(None)
        ));
        self.huffman = huffman;
        self.encoded_bits = encoded_bits;
        self.file_size = None;
        self.state = ContainerState::Encoded;
        Ok(())
    }

    /// Write the container to `path`, returning the file size.
    pub fn write<P: AsRef<Path>>(&mut self, path: P) -> Result<u64> {
        self.expect_state("write", &[ContainerState::Encoded])?;
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        let size = self.emit(&mut writer)?;
        writer.flush()?;
        self.clear_written(size);
        self.diagnostics()
            .info(format_args!("Wrote {} bytes to {}", size, path.as_ref().display()));
        Ok(size)
    }

    /// Write the container to `writer` and flush it.
    ///
    /// The in-memory image is only cleared once the flush succeeded, so a
    /// failed write leaves the container `Encoded` and ready for a retry.
    pub fn write_to<W: Write>(&mut self, writer: &mut W) -> Result<u64> {
        let size = self.emit(writer)?;
        writer.flush()?;
        self.clear_written(size);
        Ok(size)
    }

    fn emit<W: Write>(&self, writer: &mut W) -> Result<u64> {
        self.expect_state("write", &[ContainerState::Encoded])?;
        let mut tree_bits = self.huffman.serialize_tree_with(TREE_LEAF_WIDTH)?.to_bits();
        let tree_padding = bits::pad_to_byte(&mut tree_bits);
        let tree_bytes = bits::bits_to_bytes(&tree_bits)?;

        let mut payload_bits = self.encoded_bits.clone();
        let main_data_padding = bits::pad_to_byte(&mut payload_bits);
        let payload = bits::bits_to_bytes(&payload_bits)?;

        let header = ImgHeader {
            main_data_padding,
            tree_byte_length: to_u32(tree_bytes.len(), "tree length")?,
            tree_padding,
            ..self.header
        };
        self.diagnostics().debug(format_args!("Writing header {:?}", header));
        writer.write_all(&header.to_bytes())?;
        writer.write_all(&tree_bytes)?;
        writer.write_all(&payload)?;

        Ok((HEADER_LEN + tree_bytes.len() + payload.len()) as u64)
    }

    fn clear_written(&mut self, size: u64) {
        self.file_size = Some(size);
        self.header = ImgHeader::default();
        self.encoded_bits.clear();
        self.huffman = HuffmanCodec::new(&self.config);
        self.state = ContainerState::Written;
    }

    /// Load header, code tree and payload from `path`.
    pub fn read<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        self.read_from(&mut reader)?;
        self.diagnostics().info(format_args!(
            "Read {} bytes from {}", self.file_size.unwrap_or(0), path.as_ref().display()
        ));
        Ok(())
    }

    pub fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let mut header_bytes = [0u8; HEADER_LEN];
        reader.read_exact(&mut header_bytes).map_err(|e| truncated(e, "header"))?;
        let header = ImgHeader::from_bytes(&header_bytes);
        if header.block_size == 0 {
            return Err(CodecError::invalid_container("block size is zero"));
        }

        // read at most the declared length
        let mut tree_bytes = vec![];
        reader.by_ref().take(u64::from(header.tree_byte_length)).read_to_end(&mut tree_bytes)?;
        if tree_bytes.len() != header.tree_byte_length as usize {
            return Err(CodecError::invalid_container("file ends inside the code tree"));
        }
        let mut payload = vec![];
        reader.read_to_end(&mut payload)?;

        let tree_bits = bits::strip_padding(bits::bytes_to_bits(&tree_bytes), header.tree_padding)?;
        let serialized = SerializedTree::parse(&tree_bits, TREE_LEAF_WIDTH)?;
        let mut huffman = HuffmanCodec::new(&self.config);
        huffman.deserialize_tree(&serialized)?;
        let encoded_bits =
            bits::strip_padding(bits::bytes_to_bits(&payload), header.main_data_padding)?;

        self.diagnostics().debug(format_args!(
            "Read header {:?} with a {} bit payload", header, encoded_bits.len()
        ));
        self.file_size = Some((HEADER_LEN + tree_bytes.len() + payload.len()) as u64);
        self.header = header;
        self.huffman = huffman;
        self.encoded_bits = encoded_bits;
        self.state = ContainerState::Read;
        Ok(())
    }

    /// Huffman-decode the payload and cut it back into three coefficient grids.
    pub fn decode(&mut self) -> Result<[CoefficientGrid; LAYER_COUNT]> {
        self.expect_state(
            "decode",
            &[ContainerState::Encoded, ContainerState::Read, ContainerState::Decoded],
        )?;
        let samples = self.huffman.decode(&self.encoded_bits)?;

        let block_size = self.header.block_size as usize;
        let width_in_cols = self.header.width_in_cols as usize;
        let sizes = block_size.checked_mul(block_size).and_then(|block_len| {
            let row_len = block_len.checked_mul(width_in_cols)?;
            Some((block_len, row_len, row_len.checked_mul(LAYER_COUNT)?))
        });
        let Some((block_len, row_len, layer_row_len)) = sizes else {
            return Err(CodecError::invalid_container(format!(
                "{} blocks of size {} per block row do not fit in memory", width_in_cols, block_size
            )));
        };
        if row_len == 0 || samples.len() % layer_row_len != 0 {
            return Err(CodecError::invalid_container(format!(
                "{} coefficients cannot fill {} layers of block rows with {} blocks of {}",
                samples.len(), LAYER_COUNT, width_in_cols, block_len
            )));
        }
        let height_in_blocks = samples.len() / layer_row_len;
        if self.header.height > 0 && height_in_blocks != self.header.height_in_blocks() {
            return Err(CodecError::invalid_container(format!(
                "payload holds {} block rows per layer, height {} needs {}",
                height_in_blocks, self.header.height, self.header.height_in_blocks()
            )));
        }

        let layers = [0, 1, 2].map(|layer| {
            let start = layer * height_in_blocks * row_len;
            let rows = samples[start..start + height_in_blocks * row_len]
                .chunks(row_len)
                .map(|row| row.chunks(block_len).map(<[Symbol]>::to_vec).collect())
                .collect();
            BlockGrid::new(rows)
        });
        self.diagnostics().debug(format_args!(
            "Decoded {} coefficients into {} layers of {}x{} blocks",
            samples.len(), LAYER_COUNT, width_in_cols, height_in_blocks
        ));
        self.state = ContainerState::Decoded;
        Ok(layers)
    }
}

fn truncated(error: std::io::Error, section: &str) -> CodecError {
    if error.kind() == ErrorKind::UnexpectedEof {
        CodecError::invalid_container(format!("file ends inside the {}", section))
    } else {
        CodecError::Io(error)
    }
}
