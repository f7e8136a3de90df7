// src/core/mod.rs

/// Immutable table of prime-factor pairs, one per symbol position.
pub mod keypair;
/// Per-symbol key derivation, encoding, and decoding.
pub mod cipher;
/// Checksum digits derived from encoded values.
pub mod checksum;
/// Timestamp text, calendar normalization, and the sequence codec.
pub mod timestamp;
/// Elapsed-time comparison against the license duration.
pub mod expiry;
/// Current-time sources.
pub mod clock;
/// Sinks for encode/decode diagnostics.
pub mod diagnostics;

pub use checksum::ChecksumCodec;
pub use cipher::{Cipher, CipherSettings, DerivedKey};
pub use clock::{Clock, FixedClock, SystemClock};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, LogSink, MemorySink, SilentSink};
pub use expiry::{ExpiryEvaluator, ExpiryVerdict};
pub use keypair::{KeypairEntry, KeypairTable};
pub use timestamp::{EncodedTimestamp, TimestampCodec};
