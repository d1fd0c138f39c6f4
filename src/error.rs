//! Error handling for the codecs and the `.img` container

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised by the lossless coders, the lossy pipeline and the container
#[derive(Error, Debug)]
pub enum CodecError {
    /// Underlying file or stream failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Quantization level other than 10, 50 or 90
    #[error("Unsupported quantization level: {0} (expected 10, 50 or 90)")]
    UnsupportedLevel(u32),

    /// A Huffman bit string contained something other than '0' or '1'
    #[error("Illegal code bit {found:?} at position {position}")]
    IllegalCode {
        /// Offset of the offending character
        position: usize,
        /// The offending character
        found: char,
    },

    /// Serialized code tree could not be expanded
    #[error("Malformed code tree: {message}")]
    MalformedTree {
        /// What went wrong while expanding the tree
        message: String,
    },

    /// LZW code that is neither in the dictionary nor the next code to be defined
    #[error("Invalid LZW code {code}")]
    InvalidLzwCode {
        /// The unknown code
        code: u32,
    },

    /// Matrix, block or vector dimensions do not fit the operation
    #[error("Shape error: {message}")]
    Shape {
        /// Description of the mismatch
        message: String,
    },

    /// Operation needs at least one sample
    #[error("Empty input: {context}")]
    EmptyInput {
        /// Which operation received the empty input
        context: &'static str,
    },

    /// Leaf value cannot be represented with the configured leaf width
    #[error("Symbol {symbol} does not fit in a {bits}-bit tree leaf")]
    SymbolOutOfRange {
        /// The symbol value
        symbol: i64,
        /// Width of a serialized leaf
        bits: u32,
    },

    /// `.img` data is truncated or inconsistent
    #[error("Invalid container: {message}")]
    InvalidContainer {
        /// Description of the inconsistency
        message: String,
    },

    /// Container operation called out of order
    #[error("Cannot {operation} a container in state {state}")]
    InvalidState {
        /// Attempted operation
        operation: &'static str,
        /// Current state name
        state: &'static str,
    },

    /// Decode or serialization requested before any tree exists
    #[error("Code tree has not been built or read")]
    TreeNotBuilt,

    /// Configuration values rejected by validation
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Description of the rejected value
        message: String,
    },
}

impl CodecError {
    /// Create a shape error
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape { message: message.into() }
    }

    /// Create a malformed tree error
    pub fn malformed_tree<S: Into<String>>(message: S) -> Self {
        Self::MalformedTree { message: message.into() }
    }

    /// Create an invalid container error
    pub fn invalid_container<S: Into<String>>(message: S) -> Self {
        Self::InvalidContainer { message: message.into() }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// True for errors caused by the environment rather than by the data
    pub fn is_io(&self) -> bool {
        matches!(self, CodecError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = [
            (CodecError::UnsupportedLevel(20), "Unsupported quantization level: 20 (expected 10, 50 or 90)"),
            (CodecError::IllegalCode { position: 3, found: '2' }, "Illegal code bit '2' at position 3"),
            (CodecError::malformed_tree("missing child"), "Malformed code tree: missing child"),
            (CodecError::InvalidLzwCode { code: 9 }, "Invalid LZW code 9"),
            (CodecError::shape("vector of 5"), "Shape error: vector of 5"),
            (CodecError::EmptyInput { context: "huffman encode" }, "Empty input: huffman encode"),
            (CodecError::SymbolOutOfRange { symbol: 300, bits: 8 }, "Symbol 300 does not fit in a 8-bit tree leaf"),
            (CodecError::InvalidState { operation: "write", state: "empty" }, "Cannot write a container in state empty"),
            (CodecError::TreeNotBuilt, "Code tree has not been built or read"),
        ];
        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CodecError = io_error.into();
        assert!(error.is_io());
        assert!(error.to_string().contains("file not found"));
    }
}
