//! Bit-level embed/extract codecs.
//!
//! An encoder maps fixed-size data blocks onto fixed-size codeword blocks of
//! carrier bits. `extract(embed(d)) == d` for every valid data block,
//! whatever the codeword held before embedding.

pub mod hamming;
pub mod lsb;

pub use hamming::HammingEncoder;
pub use lsb::LsbEncoder;

use crate::error::{Error, Result};
use std::str::FromStr;

/// Read bit `pos` of a byte slice (LSB-first within each byte).
pub(crate) fn get_bit(buf: &[u8], pos: usize) -> bool {
    (buf[pos / 8] >> (pos % 8)) & 1 == 1
}

/// Write bit `pos` of a byte slice (LSB-first within each byte).
pub(crate) fn set_bit(buf: &mut [u8], pos: usize, value: bool) {
    let mask = 1u8 << (pos % 8);
    if value {
        buf[pos / 8] |= mask;
    } else {
        buf[pos / 8] &= !mask;
    }
}

/// Encoder variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderKind {
    Lsb,
    Hamming,
}

impl FromStr for EncoderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lsb" => Ok(EncoderKind::Lsb),
            "hamming" => Ok(EncoderKind::Hamming),
            other => Err(Error::UnknownEncoder(other.to_string())),
        }
    }
}

/// A bit codec; closed set of variants resolved by name or kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoder {
    Lsb(LsbEncoder),
    Hamming(HammingEncoder),
}

impl Encoder {
    /// Default configuration for the given kind.
    pub fn new(kind: EncoderKind) -> Self {
        match kind {
            EncoderKind::Lsb => Encoder::Lsb(LsbEncoder::default()),
            EncoderKind::Hamming => Encoder::Hamming(HammingEncoder::default()),
        }
    }

    /// Resolve a variant from its name with default parameters.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn kind(&self) -> EncoderKind {
        match self {
            Encoder::Lsb(_) => EncoderKind::Lsb,
            Encoder::Hamming(_) => EncoderKind::Hamming,
        }
    }

    /// Reconfigure one named parameter.
    ///
    /// `block_size` applies to the lsb variant, `parity_bits` to hamming.
    /// Out-of-range values are rejected, never clamped.
    pub fn set_arg_by_name(&mut self, name: &str, value: u64) -> Result<()> {
        match (&*self, name) {
            (Encoder::Lsb(_), "block_size") => {
                *self = Encoder::Lsb(LsbEncoder::new(value as usize)?);
                Ok(())
            }
            (Encoder::Hamming(_), "parity_bits") => {
                let bits = u8::try_from(value).map_err(|_| {
                    Error::InvalidParameter(format!("parity bits {} out of range", value))
                })?;
                *self = Encoder::Hamming(HammingEncoder::new(bits)?);
                Ok(())
            }
            (_, other) => Err(Error::InvalidParameter(format!(
                "unknown encoder argument: {}",
                other
            ))),
        }
    }

    /// Payload bytes per block.
    pub fn data_block_size(&self) -> usize {
        match self {
            Encoder::Lsb(e) => e.data_block_size(),
            Encoder::Hamming(e) => e.data_block_size(),
        }
    }

    /// Carrier bytes per block.
    pub fn codeword_block_size(&self) -> usize {
        match self {
            Encoder::Lsb(e) => e.codeword_block_size(),
            Encoder::Hamming(e) => e.codeword_block_size(),
        }
    }

    pub fn embed(&self, codeword: &mut [u8], data: &[u8]) -> Result<()> {
        match self {
            Encoder::Lsb(e) => e.embed(codeword, data),
            Encoder::Hamming(e) => e.embed(codeword, data),
        }
    }

    pub fn extract(&self, codeword: &[u8], data: &mut [u8]) -> Result<()> {
        match self {
            Encoder::Lsb(e) => e.extract(codeword, data),
            Encoder::Hamming(e) => e.extract(codeword, data),
        }
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::Hamming(HammingEncoder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_helpers() {
        let mut buf = [0u8; 2];
        set_bit(&mut buf, 0, true);
        set_bit(&mut buf, 10, true);
        assert!(get_bit(&buf, 0));
        assert!(!get_bit(&buf, 1));
        assert!(get_bit(&buf, 10));
        assert_eq!(buf, [0b0000_0001, 0b0000_0100]);
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Encoder::from_name("lsb").unwrap().kind(), EncoderKind::Lsb);
        assert_eq!(
            Encoder::from_name("Hamming").unwrap().kind(),
            EncoderKind::Hamming
        );
        assert!(matches!(
            Encoder::from_name("raptor"),
            Err(Error::UnknownEncoder(_))
        ));
    }

    #[test]
    fn test_set_arg_by_name() {
        let mut enc = Encoder::new(EncoderKind::Hamming);
        enc.set_arg_by_name("parity_bits", 3).unwrap();
        assert_eq!(enc.data_block_size(), 3);

        assert!(enc.set_arg_by_name("parity_bits", 9).is_err());
        assert!(enc.set_arg_by_name("block_size", 4).is_err());

        let mut enc = Encoder::new(EncoderKind::Lsb);
        enc.set_arg_by_name("block_size", 16).unwrap();
        assert_eq!(enc.data_block_size(), 16);
        assert!(enc.set_arg_by_name("block_size", 7).is_err());
    }

    #[test]
    fn test_round_trip_through_enum() {
        for enc in [
            Encoder::new(EncoderKind::Lsb),
            Encoder::new(EncoderKind::Hamming),
        ] {
            let data: Vec<u8> = (0..enc.data_block_size()).map(|i| i as u8 + 1).collect();
            let mut codeword = vec![0x5Au8; enc.codeword_block_size()];
            enc.embed(&mut codeword, &data).unwrap();

            let mut out = vec![0u8; enc.data_block_size()];
            enc.extract(&codeword, &mut out).unwrap();
            assert_eq!(out, data);
        }
    }
}
