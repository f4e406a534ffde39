//! Interchangeable Poly1305 accumulation backends.
//!
//! Every backend evaluates the same polynomial over GF(2^130 − 5) and must
//! produce byte-identical tags for every (key, message) pair; the scalar
//! backend is the portable reference the others are checked against.

mod scalar;
mod wide;

use std::sync::OnceLock;

use tracing::debug;

use crate::key::KeyHalves;

/// Size of one message block consumed by the accumulation step, in bytes.
pub(crate) const BLOCK_SIZE: usize = 16;

/// Largest buffering stride across tiers; sizes the engine's pending
/// buffer. New tiers with a larger stride must be added here.
pub(crate) const MAX_STRIDE: usize = {
    let mut max = BLOCK_SIZE;
    if wide::STRIDE > max {
        max = wide::STRIDE;
    }
    max
};

/// Available backend tiers, slowest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tier {
    /// Portable 5×26-bit limb arithmetic; always usable.
    Scalar,
    /// Native 128-bit arithmetic; needs 64-bit integer hardware.
    Wide,
}

impl Tier {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Tier::Scalar => "scalar",
            Tier::Wide => "wide",
        }
    }

    /// Buffering stride the streaming engine uses for this tier.
    ///
    /// The wide tier is fed four blocks at a time; the stride is what
    /// `Poly1305::block_size` reports and has no effect on the tag.
    pub(crate) fn stride(self) -> usize {
        match self {
            Tier::Scalar => BLOCK_SIZE,
            Tier::Wide => wide::STRIDE,
        }
    }
}

fn probe() -> Tier {
    // u128 multiplication is only worthwhile where 64-bit multiplies are
    // native; everywhere else the limb reference wins.
    if cfg!(target_pointer_width = "64") {
        Tier::Wide
    } else {
        Tier::Scalar
    }
}

/// The tier used by production engines, resolved once per process.
pub(crate) fn preferred() -> Tier {
    static PREFERRED: OnceLock<Tier> = OnceLock::new();
    *PREFERRED.get_or_init(|| {
        let tier = probe();
        debug!(backend = tier.name(), "selected poly1305 backend");
        tier
    })
}

/// Backend-specific accumulator state.
///
/// Each variant owns its own representation; state is never reinterpreted
/// across tiers.
#[derive(Clone)]
pub(crate) enum Accumulator {
    Scalar(scalar::State),
    Wide(wide::State),
}

impl Accumulator {
    pub(crate) fn init(tier: Tier, halves: &KeyHalves) -> Self {
        match tier {
            Tier::Scalar => Accumulator::Scalar(scalar::State::new(halves.r())),
            Tier::Wide => Accumulator::Wide(wide::State::new(halves.r())),
        }
    }

    /// Absorb whole 16-byte blocks; `blocks.len()` must be a multiple of
    /// [`BLOCK_SIZE`].
    pub(crate) fn absorb(&mut self, blocks: &[u8]) {
        debug_assert_eq!(blocks.len() % BLOCK_SIZE, 0);
        match self {
            Accumulator::Scalar(state) => {
                for block in blocks.chunks_exact(BLOCK_SIZE) {
                    state.absorb_block(block);
                }
            }
            Accumulator::Wide(state) => {
                for block in blocks.chunks_exact(BLOCK_SIZE) {
                    state.absorb_block(block);
                }
            }
        }
    }

    /// Absorb the final short chunk (1..=16 bytes) with the pad bit placed
    /// at bit 8·len, not at a full-block boundary.
    pub(crate) fn absorb_last(&mut self, chunk: &[u8]) {
        debug_assert!(!chunk.is_empty() && chunk.len() <= BLOCK_SIZE);
        match self {
            Accumulator::Scalar(state) => state.absorb_last(chunk),
            Accumulator::Wide(state) => state.absorb_last(chunk),
        }
    }

    /// Reduce fully mod 2^130 − 5, add `s` mod 2^128, encode little-endian.
    pub(crate) fn finalize(self, s: &[u8; 16]) -> [u8; crate::TAG_SIZE] {
        match self {
            Accumulator::Scalar(state) => state.finalize(s),
            Accumulator::Wide(state) => state.finalize(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_is_stable_across_calls() {
        assert_eq!(preferred(), preferred());
    }

    #[test]
    fn strides_are_block_multiples_within_max() {
        for tier in [Tier::Scalar, Tier::Wide] {
            assert!(tier.stride() >= BLOCK_SIZE);
            assert_eq!(tier.stride() % BLOCK_SIZE, 0);
            assert!(tier.stride() <= MAX_STRIDE);
        }
    }
}
