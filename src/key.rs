//! One-time key parsing and clamping.

use crate::error::{Error, Result};
use crate::KEY_SIZE;

/// The two halves of a 32-byte one-time key: the clamped multiplier `r`
/// and the final-offset `s`, both 128-bit little-endian values.
///
/// Clamping happens exactly once, here; backends receive `r` already
/// clamped and never touch the raw key again.
#[derive(Clone)]
pub(crate) struct KeyHalves {
    r: [u8; 16],
    s: [u8; 16],
}

impl KeyHalves {
    /// Split and clamp a raw 32-byte key.
    pub(crate) fn parse(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE {
            return Err(Error::InvalidKeyLength { len: key.len() });
        }

        let mut r = [0u8; 16];
        r.copy_from_slice(&key[0..16]);

        // r &= 0x0ffffffc_0ffffffc_0ffffffc_0fffffff
        r[3] &= 15;
        r[7] &= 15;
        r[11] &= 15;
        r[15] &= 15;
        r[4] &= 252;
        r[8] &= 252;
        r[12] &= 252;

        let mut s = [0u8; 16];
        s.copy_from_slice(&key[16..32]);

        Ok(Self { r, s })
    }

    /// The clamped multiplier half.
    pub(crate) fn r(&self) -> &[u8; 16] {
        &self.r
    }

    /// The unmodified offset half, added after the polynomial evaluation.
    pub(crate) fn s(&self) -> &[u8; 16] {
        &self.s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_and_long_keys() {
        assert_eq!(
            KeyHalves::parse(&[0u8; 30]).err(),
            Some(Error::InvalidKeyLength { len: 30 })
        );
        assert_eq!(
            KeyHalves::parse(&[0u8; 33]).err(),
            Some(Error::InvalidKeyLength { len: 33 })
        );
    }

    #[test]
    fn clamps_exactly_the_documented_bits() {
        let halves = KeyHalves::parse(&[0xff; 32]).expect("key");

        let mut expected_r = [0xffu8; 16];
        for idx in [3, 7, 11, 15] {
            expected_r[idx] = 0x0f;
        }
        for idx in [4, 8, 12] {
            expected_r[idx] = 0xfc;
        }

        assert_eq!(halves.r(), &expected_r);
        assert_eq!(halves.s(), &[0xff; 16]);
    }

    #[test]
    fn s_half_passes_through_untouched() {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let halves = KeyHalves::parse(&key).expect("key");
        assert_eq!(halves.s(), &key[16..32]);
    }
}
