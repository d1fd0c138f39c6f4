//! Conversion between '0'/'1' bit strings and packed bytes.
//!
//! Bits are packed most significant first, so the first character of the
//! string lands in bit 7 of the first byte.
use crate::error::{CodecError, Result};

/// Number of zero bits needed to reach the next byte boundary.
pub fn padding_for(bit_len: usize) -> u32 {
    ((8 - bit_len % 8) % 8) as u32
}

/// Append zero bits up to a byte boundary, returning how many were added.
pub fn pad_to_byte(bits: &mut String) -> u32 {
    let padding = padding_for(bits.len());
    bits.extend(std::iter::repeat('0').take(padding as usize));
    padding
}

/// Pack a byte-aligned bit string.
pub fn bits_to_bytes(bits: &str) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(CodecError::shape(format!(
            "bit string of length {} is not byte aligned", bits.len()
        )));
    }
    let mut bytes = Vec::with_capacity(bits.len() / 8);
    let mut current = 0u8;
    for (position, bit) in bits.chars().enumerate() {
        current <<= 1;
        match bit {
            '0' => {}
            '1' => current |= 1,
            found => return Err(CodecError::IllegalCode { position, found }),
        }
        if position % 8 == 7 {
            bytes.push(current);
            current = 0;
        }
    }
    Ok(bytes)
}

pub fn bytes_to_bits(bytes: &[u8]) -> String {
    let mut bits = String::with_capacity(bytes.len() * 8);
    for byte in bytes {
        for shift in (0..8).rev() {
            bits.push(if (byte >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    bits
}

/// Drop `padding` trailing bits.
pub fn strip_padding(mut bits: String, padding: u32) -> Result<String> {
    let padding = padding as usize;
    if padding > bits.len() {
        return Err(CodecError::invalid_container(format!(
            "padding of {} bits exceeds section of {} bits", padding, bits.len()
        )));
    }
    bits.truncate(bits.len() - padding);
    Ok(bits)
}

/// `value` as a fixed width two's complement bit string.
pub fn to_fixed_bits(value: i64, width: u32) -> String {
    let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
    let raw = (value as u64) & mask;
    format!("{:0width$b}", raw, width = width as usize)
}

/// Parse a fixed width bit string, sign-extending when `signed`.
pub fn from_fixed_bits(bits: &str, signed: bool) -> Result<i64> {
    let width = bits.len() as u32;
    let mut raw = 0u64;
    for (position, bit) in bits.chars().enumerate() {
        raw <<= 1;
        match bit {
            '0' => {}
            '1' => raw |= 1,
            found => return Err(CodecError::IllegalCode { position, found }),
        }
    }
    if signed && width > 0 && width < 64 && (raw >> (width - 1)) & 1 == 1 {
        Ok(raw as i64 - (1i64 << width))
    } else {
        Ok(raw as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        assert_eq!(padding_for(0), 0);
        assert_eq!(padding_for(5), 3);
        assert_eq!(padding_for(8), 0);
        let mut bits = String::from("11110");
        assert_eq!(pad_to_byte(&mut bits), 3);
        assert_eq!(bits, "11110000");
    }

    #[test]
    fn test_pack_unpack() {
        let bytes = bits_to_bytes("1000000100000011").unwrap();
        assert_eq!(bytes, vec![0x81, 0x03]);
        assert_eq!(bytes_to_bits(&bytes), "1000000100000011");
    }

    #[test]
    fn test_pack_rejects_unaligned_and_illegal() {
        assert!(matches!(bits_to_bytes("101"), Err(CodecError::Shape { .. })));
        assert!(matches!(
            bits_to_bytes("1010x010"),
            Err(CodecError::IllegalCode { position: 4, found: 'x' })
        ));
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding("11110000".to_string(), 3).unwrap(), "11110");
        assert!(strip_padding("1".to_string(), 2).is_err());
    }

    #[test]
    fn test_fixed_bits() {
        assert_eq!(to_fixed_bits(10, 8), "00001010");
        assert_eq!(to_fixed_bits(-1, 16), "1111111111111111");
        assert_eq!(from_fixed_bits("00001010", false).unwrap(), 10);
        assert_eq!(from_fixed_bits("1111111111111111", true).unwrap(), -1);
        assert_eq!(from_fixed_bits("11111111", false).unwrap(), 255);
        assert_eq!(from_fixed_bits(&to_fixed_bits(-300, 16), true).unwrap(), -300);
    }
}
