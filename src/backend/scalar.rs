//! Portable reference accumulator over 5×26-bit limbs.
//!
//! The 130-bit accumulator is split into five 26-bit limbs with delayed
//! carries. Reduction uses the identity a·2^130 ≡ a·5 (mod 2^130 − 5):
//! anything above bit 130 is multiplied by 5 and folded back into the low
//! limbs.

use super::BLOCK_SIZE;

const LIMB_MASK: u32 = 0x03ff_ffff;

/// Accumulator plus the limb form of the clamped multiplier.
#[derive(Clone)]
pub(crate) struct State {
    a: [u32; 5],
    r: [u32; 5],
}

impl State {
    /// `r` must already be clamped.
    pub(crate) fn new(r: &[u8; 16]) -> Self {
        State {
            a: [0; 5],
            r: [
                le32(&r[0..4]) & LIMB_MASK,
                le32(&r[3..7]) >> 2 & LIMB_MASK,
                le32(&r[6..10]) >> 4 & LIMB_MASK,
                le32(&r[9..13]) >> 6 & LIMB_MASK,
                le32(&r[12..16]) >> 8,
            ],
        }
    }

    /// Absorb one full 16-byte block, pad bit at 2^128.
    pub(crate) fn absorb_block(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), BLOCK_SIZE);
        self.accumulate(
            le32(&block[0..4]) & LIMB_MASK,
            le32(&block[3..7]) >> 2 & LIMB_MASK,
            le32(&block[6..10]) >> 4 & LIMB_MASK,
            le32(&block[9..13]) >> 6 & LIMB_MASK,
            le32(&block[12..16]) >> 8 | 1 << 24,
        );
    }

    /// Absorb the final 1..=16 byte chunk, pad bit at 2^(8·len).
    pub(crate) fn absorb_last(&mut self, chunk: &[u8]) {
        debug_assert!(!chunk.is_empty() && chunk.len() <= BLOCK_SIZE);
        let mut buf = [0u8; 17];
        buf[..chunk.len()].copy_from_slice(chunk);
        buf[chunk.len()] = 1;
        self.accumulate(
            le32(&buf[0..4]) & LIMB_MASK,
            le32(&buf[3..7]) >> 2 & LIMB_MASK,
            le32(&buf[6..10]) >> 4 & LIMB_MASK,
            le32(&buf[9..13]) >> 6 & LIMB_MASK,
            le32(&buf[13..17]),
        );
    }

    fn accumulate(&mut self, n0: u32, n1: u32, n2: u32, n3: u32, n4: u32) {
        self.a[0] += n0;
        self.a[1] += n1;
        self.a[2] += n2;
        self.a[3] += n3;
        self.a[4] += n4;
        self.mul_r_mod_p();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn mul_r_mod_p(&mut self) {
        // t = a * r; high limbs wrap around multiplied by 5
        let mut t = [0u64; 5];

        t[0] += u64::from(self.r[0]) * u64::from(self.a[0]);
        t[1] += u64::from(self.r[0]) * u64::from(self.a[1]);
        t[2] += u64::from(self.r[0]) * u64::from(self.a[2]);
        t[3] += u64::from(self.r[0]) * u64::from(self.a[3]);
        t[4] += u64::from(self.r[0]) * u64::from(self.a[4]);

        t[0] += u64::from(5 * self.r[1]) * u64::from(self.a[4]);
        t[1] += u64::from(self.r[1]) * u64::from(self.a[0]);
        t[2] += u64::from(self.r[1]) * u64::from(self.a[1]);
        t[3] += u64::from(self.r[1]) * u64::from(self.a[2]);
        t[4] += u64::from(self.r[1]) * u64::from(self.a[3]);

        t[0] += u64::from(5 * self.r[2]) * u64::from(self.a[3]);
        t[1] += u64::from(5 * self.r[2]) * u64::from(self.a[4]);
        t[2] += u64::from(self.r[2]) * u64::from(self.a[0]);
        t[3] += u64::from(self.r[2]) * u64::from(self.a[1]);
        t[4] += u64::from(self.r[2]) * u64::from(self.a[2]);

        t[0] += u64::from(5 * self.r[3]) * u64::from(self.a[2]);
        t[1] += u64::from(5 * self.r[3]) * u64::from(self.a[3]);
        t[2] += u64::from(5 * self.r[3]) * u64::from(self.a[4]);
        t[3] += u64::from(self.r[3]) * u64::from(self.a[0]);
        t[4] += u64::from(self.r[3]) * u64::from(self.a[1]);

        t[0] += u64::from(5 * self.r[4]) * u64::from(self.a[1]);
        t[1] += u64::from(5 * self.r[4]) * u64::from(self.a[2]);
        t[2] += u64::from(5 * self.r[4]) * u64::from(self.a[3]);
        t[3] += u64::from(5 * self.r[4]) * u64::from(self.a[4]);
        t[4] += u64::from(self.r[4]) * u64::from(self.a[0]);

        // propagate carries
        t[1] += t[0] >> 26;
        t[2] += t[1] >> 26;
        t[3] += t[2] >> 26;
        t[4] += t[3] >> 26;

        self.a[0] = t[0] as u32 & LIMB_MASK;
        self.a[1] = t[1] as u32 & LIMB_MASK;
        self.a[2] = t[2] as u32 & LIMB_MASK;
        self.a[3] = t[3] as u32 & LIMB_MASK;
        self.a[4] = t[4] as u32 & LIMB_MASK;

        // fold the top carry back in; at most 1 bit is left in a[1]
        self.a[0] += (t[4] >> 26) as u32 * 5;
        self.a[1] += self.a[0] >> 26;
        self.a[0] &= LIMB_MASK;
    }

    fn propagate_carries(&mut self) {
        self.a[2] += self.a[1] >> 26;
        self.a[3] += self.a[2] >> 26;
        self.a[4] += self.a[3] >> 26;
        self.a[0] += (self.a[4] >> 26) * 5;
        self.a[1] += self.a[0] >> 26;

        self.a[0] &= LIMB_MASK;
        self.a[1] &= LIMB_MASK;
        self.a[2] &= LIMB_MASK;
        self.a[3] &= LIMB_MASK;
        self.a[4] &= LIMB_MASK;
    }

    fn reduce_mod_p(&mut self) {
        self.propagate_carries();

        // t = a - p
        let mut t = self.a;
        t[0] += 5;
        t[4] = t[4].wrapping_sub(1 << 26);

        t[1] += t[0] >> 26;
        t[2] += t[1] >> 26;
        t[3] += t[2] >> 26;
        t[4] = t[4].wrapping_add(t[3] >> 26);

        t[0] &= LIMB_MASK;
        t[1] &= LIMB_MASK;
        t[2] &= LIMB_MASK;
        t[3] &= LIMB_MASK;

        // constant-time select: (a - p) if non-negative, a otherwise
        let mask = (t[4] >> 31).wrapping_sub(1);
        self.a[0] = t[0] & mask | self.a[0] & !mask;
        self.a[1] = t[1] & mask | self.a[1] & !mask;
        self.a[2] = t[2] & mask | self.a[2] & !mask;
        self.a[3] = t[3] & mask | self.a[3] & !mask;
        self.a[4] = t[4] & mask | self.a[4] & !mask;
    }

    /// Full reduction, then add `s` mod 2^128 and encode little-endian.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn finalize(mut self, s: &[u8; 16]) -> [u8; 16] {
        self.reduce_mod_p();

        // 5×26-bit to 4×32-bit
        let a = [
            self.a[0] | self.a[1] << 26,
            self.a[1] >> 6 | self.a[2] << 20,
            self.a[2] >> 12 | self.a[3] << 14,
            self.a[3] >> 18 | self.a[4] << 8,
        ];

        // t = a + s, carries propagated, bit 128 discarded
        let mut t = [
            u64::from(a[0]) + u64::from(le32(&s[0..4])),
            u64::from(a[1]) + u64::from(le32(&s[4..8])),
            u64::from(a[2]) + u64::from(le32(&s[8..12])),
            u64::from(a[3]) + u64::from(le32(&s[12..16])),
        ];
        t[1] += t[0] >> 32;
        t[2] += t[1] >> 32;
        t[3] += t[2] >> 32;

        let mut tag = [0u8; 16];
        tag[0..4].copy_from_slice(&(t[0] as u32).to_le_bytes());
        tag[4..8].copy_from_slice(&(t[1] as u32).to_le_bytes());
        tag[8..12].copy_from_slice(&(t[2] as u32).to_le_bytes());
        tag[12..16].copy_from_slice(&(t[3] as u32).to_le_bytes());
        tag
    }
}

#[inline]
fn le32(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyHalves;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[test]
    fn rfc_8439_vector() {
        // RFC 8439 Section 2.5.2
        let key = [
            0x85, 0xd6, 0xbe, 0x78, 0x57, 0x55, 0x6d, 0x33, 0x7f, 0x44, 0x52, 0xfe, 0x42, 0xd5,
            0x06, 0xa8, 0x01, 0x03, 0x80, 0x8a, 0xfb, 0x0d, 0xb2, 0xfd, 0x4a, 0xbf, 0xf6, 0xaf,
            0x41, 0x49, 0xf5, 0x1b,
        ];
        let msg = b"Cryptographic Forum Research Group";

        let halves = KeyHalves::parse(&key).expect("key");
        let mut state = State::new(halves.r());
        state.absorb_block(&msg[0..16]);
        state.absorb_block(&msg[16..32]);
        state.absorb_last(&msg[32..]);

        assert_eq!(
            hex(&state.finalize(halves.s())),
            "a8061dc1305136c6c22b8baf0c0127a9"
        );
    }

    #[test]
    fn empty_message_returns_s() {
        let mut key = [0u8; 32];
        key[16..].copy_from_slice(&[0xa5; 16]);
        let halves = KeyHalves::parse(&key).expect("key");
        let state = State::new(halves.r());
        assert_eq!(state.finalize(halves.s()), [0xa5; 16]);
    }

    #[test]
    fn all_zero_key_and_message_gives_zero_tag() {
        let halves = KeyHalves::parse(&[0u8; 32]).expect("key");
        let mut state = State::new(halves.r());
        for _ in 0..4 {
            state.absorb_block(&[0u8; 16]);
        }
        assert_eq!(state.finalize(halves.s()), [0u8; 16]);
    }
}
