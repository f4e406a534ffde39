//! Poly1305 one-time message authentication.
//!
//! This library computes the Poly1305 authenticator: a 32-byte one-time key
//! and an arbitrary-length message go in, a 16-byte tag comes out. Several
//! interchangeable backends (a portable scalar reference and a wide-integer
//! fast path) compute the identical function; the fastest usable one is
//! picked once per process.
//!
//! # Quick Start
//!
//! ```rust
//! use poly1305_otk::{sum, verify, Poly1305};
//!
//! let key = b"this is 32-byte key for Poly1305";
//!
//! // One-shot
//! let tag = sum(key, b"Hello world!")?;
//! assert!(verify(&tag, b"Hello world!", key)?);
//!
//! // Incremental
//! let mut mac = Poly1305::new(key)?;
//! mac.write(b"Hello ");
//! mac.write(b"world!");
//! assert_eq!(mac.tag(), tag);
//! # Ok::<(), poly1305_otk::Error>(())
//! ```
//!
//! # One-time keys
//!
//! A key must authenticate at most one message. Authenticating two
//! different messages with the same key lets an attacker forge tags for
//! further messages under that key. Key and nonce management belong to the
//! caller; this crate neither detects nor prevents reuse.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod backend;
mod error;
mod key;
mod mac;

pub use error::{Error, Result};
pub use mac::{sum, verify, Poly1305};

/// Length of Poly1305 one-time keys, in bytes.
pub const KEY_SIZE: usize = 32;

/// Length of Poly1305 authenticator tags, in bytes.
pub const TAG_SIZE: usize = 16;
