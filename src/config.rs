//! Codec configuration and the diagnostic sink handed to every component
//!
//! Components never log through a process-wide logger of their own; they are
//! given a [`Diagnostics`] value when they are built, which carries the log
//! target and the most verbose level they may emit.
//!
//! ```
//! use sigpress::config::CodecConfig;
//! # fn main() -> Result<(), sigpress::CodecError> {
//! let config = CodecConfig::builder()
//!     .block_size(8)
//!     .level(90)
//!     .build()?;
//! assert_eq!(config.level.value(), 90);
//! # Ok(())
//! # }
//! ```
use std::borrow::Cow;
use std::env;
use std::fmt;

use log::{Level, LevelFilter};

use crate::entropy::tree::LeafWidth;
use crate::error::{CodecError, Result};
use crate::quantization::QuantizationLevel;

/// Environment variable overriding the block size
pub const ENV_BLOCK_SIZE: &str = "SIGPRESS_BLOCK_SIZE";
/// Environment variable overriding the quantization level
pub const ENV_LEVEL: &str = "SIGPRESS_LEVEL";

/// Log sink scoped to one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    target: Cow<'static, str>,
    max_level: LevelFilter,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            target: Cow::Borrowed("sigpress"),
            max_level: LevelFilter::Debug,
        }
    }
}

impl Diagnostics {
    pub fn new<T: Into<Cow<'static, str>>>(target: T, max_level: LevelFilter) -> Self {
        Diagnostics { target: target.into(), max_level }
    }

    /// A sink that drops everything.
    pub fn silent() -> Self {
        Diagnostics {
            target: Cow::Borrowed("sigpress"),
            max_level: LevelFilter::Off,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level <= self.max_level
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: self.target.as_ref(), level, "{}", args);
        }
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }
}

/// Parameters shared by the lossless coders and the image pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecConfig {
    pub block_size: usize,
    pub level: QuantizationLevel,
    /// Leaf width used by `HuffmanCodec::serialize_tree`.
    pub leaf_width: LeafWidth,
    pub diagnostics: Diagnostics,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            block_size: 8,
            level: QuantizationLevel::Medium,
            leaf_width: LeafWidth::Byte,
            diagnostics: Diagnostics::default(),
        }
    }
}

impl CodecConfig {
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }

    /// Defaults overridden by `SIGPRESS_BLOCK_SIZE` and `SIGPRESS_LEVEL` when set.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(raw) = env::var(ENV_BLOCK_SIZE) {
            let block_size = raw.trim().parse::<usize>().map_err(|e| {
                CodecError::configuration(format!("{ENV_BLOCK_SIZE}={raw:?}: {e}"))
            })?;
            builder = builder.block_size(block_size);
        }
        if let Ok(raw) = env::var(ENV_LEVEL) {
            let level = raw.trim().parse::<u32>().map_err(|e| {
                CodecError::configuration(format!("{ENV_LEVEL}={raw:?}: {e}"))
            })?;
            builder = builder.level(level);
        }
        builder.build()
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(CodecError::configuration("block size must be at least 1"));
        }
        Ok(())
    }

    /// The quantization matrices are 8x8, so the lossy pipeline needs 8x8 blocks.
    pub fn validate_for_quantization(&self) -> Result<()> {
        self.validate()?;
        if self.block_size != crate::quantization::MATRIX_SIZE {
            return Err(CodecError::shape(format!(
                "quantization needs {0}x{0} blocks, configured block size is {1}",
                crate::quantization::MATRIX_SIZE, self.block_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CodecConfigBuilder {
    block_size: usize,
    level: u32,
    leaf_width: LeafWidth,
    diagnostics: Diagnostics,
}

impl Default for CodecConfigBuilder {
    fn default() -> Self {
        let defaults = CodecConfig::default();
        CodecConfigBuilder {
            block_size: defaults.block_size,
            level: defaults.level.value(),
            leaf_width: defaults.leaf_width,
            diagnostics: defaults.diagnostics,
        }
    }
}

impl CodecConfigBuilder {
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn leaf_width(mut self, leaf_width: LeafWidth) -> Self {
        self.leaf_width = leaf_width;
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn build(self) -> Result<CodecConfig> {
        let config = CodecConfig {
            block_size: self.block_size,
            level: QuantizationLevel::try_from(self.level)?,
            leaf_width: self.leaf_width,
            diagnostics: self.diagnostics,
        };
        config.validate()?;
        Ok(config)
    }
}
