// src/core/diagnostics.rs

//! Injectable sink for encode/decode diagnostics.
//!
//! The codecs describe what they are doing as [`DiagnosticEvent`]s and hand
//! them to whatever [`DiagnosticSink`] they were built with. [`LogSink`]
//! forwards to the `log` facade, [`SilentSink`] drops everything, and
//! [`MemorySink`] keeps the events for inspection.

use std::fmt;
use std::sync::Mutex;

/// Log target used by [`LogSink`].
pub const DIAGNOSTICS_TARGET: &str = "license_timestamp::diagnostics";

/// One step of an encode, decode, or verification pass.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// Plaintext about to be encoded.
    PlainText {
        /// The timestamp text.
        text: String,
    },
    /// A symbol was encoded.
    SymbolEncoded {
        /// Symbol position.
        index: usize,
        /// The plaintext character.
        symbol: char,
        /// The encoded value.
        value: f64,
    },
    /// Encoded values were read back from storage.
    ValuesRead {
        /// How many values the encoded file held.
        count: usize,
    },
    /// A stored checksum did not match the recomputed one.
    ChecksumMismatch {
        /// Checksum recomputed from the encoded values.
        computed: String,
        /// Checksum read from storage.
        stored: String,
    },
    /// A value was decoded.
    SymbolDecoded {
        /// Symbol position.
        index: usize,
        /// Modulus of the key at this position.
        modulus: f64,
        /// The recovered character.
        symbol: char,
    },
    /// Timestamp text was split into calendar fields.
    FieldsParsed {
        /// Year as written.
        year: i64,
        /// Month, 1-based.
        month: i64,
        /// Day of month.
        day: i64,
        /// Hour.
        hour: i64,
        /// Minute.
        minute: i64,
        /// Second.
        second: i64,
    },
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainText { text } => write!(f, "message to encrypt: {}", text),
            Self::SymbolEncoded { index, symbol, value } => {
                write!(f, "encoded[{}] '{}' = {}", index, symbol, value)
            }
            Self::ValuesRead { count } => write!(f, "length of the encrypted data is {}", count),
            Self::ChecksumMismatch { computed, stored } => {
                write!(f, "calculated: {}, read checksum: {}", computed, stored)
            }
            Self::SymbolDecoded { index, modulus, symbol } => {
                write!(f, "decoded[{}] (N = {}) = '{}'", index, modulus, symbol)
            }
            Self::FieldsParsed { year, month, day, hour, minute, second } => write!(
                f,
                "parsed {:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        }
    }
}

/// Receives diagnostic events from the core.
pub trait DiagnosticSink: Send + Sync {
    /// Handles one event.
    fn record(&self, event: &DiagnosticEvent);
}

/// Forwards events to `log::debug!` under [`DIAGNOSTICS_TARGET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, event: &DiagnosticEvent) {
        log::debug!(target: DIAGNOSTICS_TARGET, "{}", event);
    }
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn record(&self, _event: &DiagnosticEvent) {}
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<DiagnosticEvent>>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events recorded so far.
    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Drops the recorded events.
    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, event: &DiagnosticEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
