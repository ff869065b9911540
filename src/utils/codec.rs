//! Positional base-2^k text codec
//!
//! Input bytes are read as one big-endian bit stream and cut into k-bit
//! groups. When the stream length is not a multiple of k, zero bits are
//! prepended so that every group is full; decoding strips them again.

use crate::error::{NanoError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The 32-symbol alphabet used by account addresses
pub const NANO_ALPHABET: &str = "13456789abcdefghijkmnopqrstuwxyz";

/// Shared codec for account addresses
pub static NANO_BASE32: Lazy<BaseCodec> = Lazy::new(|| {
    BaseCodec::new(NANO_ALPHABET).expect("address alphabet is a valid base-32 alphabet")
});

#[derive(Debug, Clone)]
pub struct BaseCodec {
    alphabet: Vec<char>,
    lookup: HashMap<char, u32>,
    bits_per_symbol: u32,
}

impl BaseCodec {
    /// Build a codec over `alphabet`; its length must be a power of two
    /// between 2 and 256 and no symbol may repeat.
    pub fn new(alphabet: &str) -> Result<BaseCodec> {
        let symbols: Vec<char> = alphabet.chars().collect();
        let base = symbols.len();
        if !(2..=256).contains(&base) || !base.is_power_of_two() {
            return Err(NanoError::Config(format!(
                "codec base must be a power of two between 2 and 256, got {base}"
            )));
        }

        let mut lookup = HashMap::with_capacity(base);
        for (value, symbol) in symbols.iter().enumerate() {
            if lookup.insert(*symbol, value as u32).is_some() {
                return Err(NanoError::Config(format!(
                    "codec alphabet repeats the symbol '{symbol}'"
                )));
            }
        }

        Ok(BaseCodec {
            alphabet: symbols,
            lookup,
            bits_per_symbol: base.trailing_zeros(),
        })
    }

    pub fn base(&self) -> usize {
        self.alphabet.len()
    }

    pub fn bits_per_symbol(&self) -> u32 {
        self.bits_per_symbol
    }

    /// Number of symbols needed to encode `byte_len` bytes
    pub fn encoded_len(&self, byte_len: usize) -> usize {
        let bits = self.bits_per_symbol as usize;
        (byte_len * 8).div_ceil(bits)
    }

    pub fn encode(&self, data: &[u8]) -> String {
        let k = self.bits_per_symbol;
        let mask = (1u32 << k) - 1;
        let symbols = self.encoded_len(data.len());
        let padding = (symbols * k as usize - data.len() * 8) as u32;

        let mut out = String::with_capacity(symbols);
        let mut acc: u32 = 0;
        let mut pending = padding;
        for byte in data {
            acc = (acc << 8) | u32::from(*byte);
            pending += 8;
            while pending >= k {
                pending -= k;
                out.push(self.alphabet[((acc >> pending) & mask) as usize]);
            }
            acc &= (1u32 << pending) - 1;
        }
        out
    }

    /// Decode `text`; the output length is the whole number of bytes the
    /// symbols carry. The leading padding bits must be zero, so every
    /// accepted text is exactly what `encode` produces for its output.
    pub fn decode(&self, text: &str) -> Result<Vec<u8>> {
        let k = self.bits_per_symbol;
        let symbols = text.chars().count();
        let total_bits = symbols * k as usize;
        let mut skip = (total_bits % 8) as u32;

        let mut out = Vec::with_capacity(total_bits / 8);
        let mut acc: u32 = 0;
        let mut pending: u32 = 0;
        for symbol in text.chars() {
            let value = *self.lookup.get(&symbol).ok_or_else(|| {
                NanoError::format(format!("invalid symbol '{symbol}' in encoded text"))
            })?;
            acc = (acc << k) | value;
            pending += k;

            if skip > 0 {
                let dropped = skip.min(pending);
                skip -= dropped;
                pending -= dropped;
                if acc >> pending != 0 {
                    return Err(NanoError::format(format!(
                        "non-zero padding bits before '{symbol}' in encoded text"
                    )));
                }
            }

            while pending >= 8 {
                pending -= 8;
                out.push((acc >> pending) as u8);
            }
            acc &= (1u32 << pending) - 1;
        }
        Ok(out)
    }

    /// Decode and require exactly `len` bytes
    pub fn decode_exact(&self, text: &str, len: usize) -> Result<Vec<u8>> {
        if text.chars().count() != self.encoded_len(len) {
            return Err(NanoError::format(format!(
                "expected {} symbols, got {}",
                self.encoded_len(len),
                text.chars().count()
            )));
        }
        self.decode(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_power_of_two_base() {
        assert!(BaseCodec::new("0123456789").is_err());
        assert!(BaseCodec::new("0").is_err());
        assert!(BaseCodec::new("").is_err());
    }

    #[test]
    fn test_rejects_repeated_symbols() {
        assert!(BaseCodec::new("0120").is_err());
    }

    #[test]
    fn test_hex_alphabet_matches_hex() {
        let codec = BaseCodec::new("0123456789ABCDEF").unwrap();
        assert_eq!(codec.bits_per_symbol(), 4);
        assert_eq!(codec.encode(&[0xDE, 0xAD, 0x01]), "DEAD01");
        assert_eq!(codec.decode("DEAD01").unwrap(), vec![0xDE, 0xAD, 0x01]);
    }

    #[test]
    fn test_binary_alphabet() {
        let codec = BaseCodec::new("01").unwrap();
        assert_eq!(codec.encode(&[0b1010_0001]), "10100001");
        assert_eq!(codec.decode("10100001").unwrap(), vec![0b1010_0001]);
    }

    #[test]
    fn test_base32_pads_at_the_front() {
        // 8 bits need two 5-bit symbols, so two zero bits are prepended:
        // 00 11111111 -> 00111 11111
        let codec = &*NANO_BASE32;
        assert_eq!(codec.encode(&[0xFF]), "9z");
        assert_eq!(codec.decode("9z").unwrap(), vec![0xFF]);
        assert_eq!(codec.encoded_len(32), 52);
        assert_eq!(codec.encoded_len(5), 8);
    }

    #[test]
    fn test_base32_public_key_length_round_trip() {
        let codec = &*NANO_BASE32;
        let data: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
        let text = codec.encode(&data);
        assert_eq!(text.len(), 52);
        assert_eq!(codec.decode_exact(&text, 32).unwrap(), data);
    }

    #[test]
    fn test_decode_rejects_unknown_symbol() {
        // '0', '2', 'l' and 'v' are not part of the address alphabet
        assert!(NANO_BASE32.decode("0z").unwrap_err().is_format());
        assert!(NANO_BASE32.decode("l1").is_err());
    }

    #[test]
    fn test_decode_rejects_set_padding_bits() {
        // "9z" carries 0xFF behind two zero bits; 'z' and 'b' set them
        assert!(NANO_BASE32.decode("zz").unwrap_err().is_format());
        assert!(NANO_BASE32.decode("bz").is_err());
        // 52 symbols drop four bits: only '1' and '3' may lead
        let key = NANO_BASE32.encode(&[0xA5; 32]);
        for lead in NANO_ALPHABET.chars() {
            let text = format!("{lead}{}", &key[1..]);
            let decoded = NANO_BASE32.decode_exact(&text, 32);
            if lead == '1' || lead == '3' {
                assert_eq!(NANO_BASE32.encode(&decoded.unwrap()), text);
            } else {
                assert!(decoded.is_err(), "'{lead}' accepted");
            }
        }
    }

    #[test]
    fn test_decode_exact_checks_length() {
        assert!(NANO_BASE32.decode_exact("1111", 5).is_err());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(NANO_BASE32.encode(&[]), "");
        assert!(NANO_BASE32.decode("").unwrap().is_empty());
    }
}
