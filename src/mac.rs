//! Streaming MAC engine, one-shot computation, and verification.

use crate::backend::{self, Accumulator, Tier, BLOCK_SIZE, MAX_STRIDE};
use crate::error::Result;
use crate::key::KeyHalves;
use crate::TAG_SIZE;

/// Incremental Poly1305 engine.
///
/// Accepts writes of arbitrary length and alignment; [`tag`](Self::tag)
/// projects the authenticator for everything written so far without
/// consuming the engine, so writing may continue afterwards.
///
/// A key must authenticate at most one message. [`reset`](Self::reset)
/// reuses the key material for a fresh message; whether that is safe is
/// the caller's call, not enforced here.
pub struct Poly1305 {
    halves: KeyHalves,
    tier: Tier,
    acc: Accumulator,
    buf: [u8; MAX_STRIDE],
    buf_used: usize,
}

impl Poly1305 {
    /// Create an engine for the given 32-byte one-time key.
    ///
    /// Clamps the key and selects the fastest usable backend (resolved
    /// once per process). Fails with [`Error::InvalidKeyLength`] for any
    /// other key length.
    ///
    /// [`Error::InvalidKeyLength`]: crate::Error::InvalidKeyLength
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::with_tier(key, backend::preferred())
    }

    pub(crate) fn with_tier(key: &[u8], tier: Tier) -> Result<Self> {
        let halves = KeyHalves::parse(key)?;
        let acc = Accumulator::init(tier, &halves);
        Ok(Self {
            halves,
            tier,
            acc,
            buf: [0; MAX_STRIDE],
            buf_used: 0,
        })
    }

    /// Absorb message bytes. Any length and boundary alignment is fine;
    /// complete strides are forwarded to the backend and the remainder is
    /// buffered.
    pub fn write(&mut self, mut data: &[u8]) {
        let stride = self.tier.stride();

        if self.buf_used != 0 || data.len() < stride {
            let take = (stride - self.buf_used).min(data.len());
            self.buf[self.buf_used..self.buf_used + take].copy_from_slice(&data[..take]);
            self.buf_used += take;
            data = &data[take..];

            if self.buf_used == stride {
                self.acc.absorb(&self.buf[..stride]);
                self.buf_used = 0;
            }
        }

        let aligned = data.len() - data.len() % stride;
        if aligned != 0 {
            self.acc.absorb(&data[..aligned]);
            data = &data[aligned..];
        }

        if !data.is_empty() {
            self.buf[..data.len()].copy_from_slice(data);
            self.buf_used = data.len();
        }
    }

    /// The 16-byte authenticator for all bytes written so far.
    ///
    /// Operates on a snapshot: the engine stays writable and a later call
    /// reflects the full cumulative message.
    #[must_use]
    pub fn tag(&self) -> [u8; TAG_SIZE] {
        let mut acc = self.acc.clone();

        let full = self.buf_used - self.buf_used % BLOCK_SIZE;
        if full != 0 {
            acc.absorb(&self.buf[..full]);
        }
        if self.buf_used > full {
            acc.absorb_last(&self.buf[full..self.buf_used]);
        }

        acc.finalize(self.halves.s())
    }

    /// Append the authenticator to `prefix` and return the result.
    #[must_use]
    pub fn sum_into(&self, prefix: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(prefix.len() + TAG_SIZE);
        out.extend_from_slice(prefix);
        out.extend_from_slice(&self.tag());
        out
    }

    /// Discard all absorbed bytes and start a new message with the same
    /// key material.
    pub fn reset(&mut self) {
        self.buf[..self.buf_used].fill(0);
        self.buf_used = 0;
        self.acc = Accumulator::init(self.tier, &self.halves);
    }

    /// Tag length in bytes; always [`TAG_SIZE`].
    #[must_use]
    pub fn size(&self) -> usize {
        TAG_SIZE
    }

    /// The active backend's natural write granularity, in bytes.
    ///
    /// Informational: writes of any size are accepted regardless.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.tier.stride()
    }
}

/// One-shot authenticator for `msg` under a 32-byte one-time key.
///
/// Fails with [`Error::InvalidKeyLength`] for any other key length.
///
/// [`Error::InvalidKeyLength`]: crate::Error::InvalidKeyLength
pub fn sum(key: &[u8], msg: &[u8]) -> Result<[u8; TAG_SIZE]> {
    let halves = KeyHalves::parse(key)?;
    Ok(sum_with_tier(&halves, backend::preferred(), msg))
}

pub(crate) fn sum_with_tier(halves: &KeyHalves, tier: Tier, msg: &[u8]) -> [u8; TAG_SIZE] {
    let mut acc = Accumulator::init(tier, halves);

    let aligned = msg.len() - msg.len() % BLOCK_SIZE;
    if aligned != 0 {
        acc.absorb(&msg[..aligned]);
    }
    if msg.len() > aligned {
        acc.absorb_last(&msg[aligned..]);
    }

    acc.finalize(halves.s())
}

/// Whether `tag` is a valid authenticator for `msg` under `key`.
///
/// The comparison does not branch on where (or whether) the tags differ;
/// a mismatch, including a wrong-length `tag`, is `Ok(false)`. Only a bad
/// key length is an error.
pub fn verify(tag: &[u8], msg: &[u8], key: &[u8]) -> Result<bool> {
    let expected = sum(key, msg)?;

    let mut diff = u8::from(tag.len() != TAG_SIZE);
    for (a, b) in expected.iter().zip(tag) {
        diff |= a ^ b;
    }
    Ok(diff == 0)
}
