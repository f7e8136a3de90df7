// src/core/timestamp.rs

//! Timestamp text and its encoded form.
//!
//! Timestamps are local wall-clock time rendered as `YYYY-MM-DDTHH:MM:SSZ`.
//! The trailing `Z` is a literal character and does not mean UTC.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, TimeZone};

use crate::core::checksum::ChecksumCodec;
use crate::core::cipher::{Cipher, CipherSettings};
use crate::core::clock::Clock;
use crate::core::diagnostics::{DiagnosticEvent, DiagnosticSink, SilentSink};
use crate::error::{LicenseError, Result};

/// Length of a well-formed timestamp text.
pub const TIMESTAMP_LEN: usize = 20;

/// Default number of symbol slots; texts must be strictly shorter.
pub const DEFAULT_BUFFER_SIZE: usize = 21;

/// `strftime` pattern of a timestamp text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const FIELD_DELIMITERS: [char; 4] = ['T', 'Z', '-', ':'];

/// Renders `instant` as timestamp text.
pub fn format_timestamp(instant: &DateTime<Local>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Reads `clock` and renders the result as timestamp text.
pub fn now_to_text(clock: &dyn Clock) -> Result<String> {
    let now = clock
        .now()
        .map_err(|e| LicenseError::timestamp_retrieval(format!("clock unavailable: {}", e)))?;
    let text = format_timestamp(&now);
    if text.len() != TIMESTAMP_LEN {
        return Err(LicenseError::timestamp_retrieval(format!(
            "formatted timestamp {:?} has length {}, expected {}",
            text,
            text.len(),
            TIMESTAMP_LEN
        )));
    }
    Ok(text)
}

/// Calendar fields read from timestamp text, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFields {
    /// Year as written.
    pub year: i64,
    /// Month, 1-based.
    pub month: i64,
    /// Day of month.
    pub day: i64,
    /// Hour.
    pub hour: i64,
    /// Minute.
    pub minute: i64,
    /// Second.
    pub second: i64,
}

impl TimestampFields {
    /// Splits `text` on `T`, `Z`, `-` and `:`, skipping empty tokens.
    ///
    /// Each token contributes its leading decimal digits, or zero if it has
    /// none. Missing tokens are zero. Empty text yields the zero calendar
    /// time, `1900-01-00T00:00:00`. Returns `None` if a field overflows.
    pub fn parse(text: &str) -> Option<Self> {
        if text.is_empty() {
            return Some(Self {
                year: 1900,
                month: 1,
                day: 0,
                hour: 0,
                minute: 0,
                second: 0,
            });
        }
        let mut fields = [0i64; 6];
        let tokens = text
            .split(|c| FIELD_DELIMITERS.contains(&c))
            .filter(|token| !token.is_empty());
        for (slot, token) in fields.iter_mut().zip(tokens) {
            *slot = leading_integer(token)?;
        }
        let [year, month, day, hour, minute, second] = fields;
        Some(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Normalizes out-of-range fields by carrying into the next larger unit.
    ///
    /// Month 13 becomes January of the next year, day 0 becomes the last day
    /// of the previous month, and so on.
    pub fn normalize(&self) -> Option<chrono::NaiveDateTime> {
        let months = self.year.checked_mul(12)?.checked_add(self.month.checked_sub(1)?)?;
        let year = i32::try_from(months.div_euclid(12)).ok()?;
        let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
        let base = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;

        let seconds = self
            .day
            .checked_sub(1)?
            .checked_mul(86_400)?
            .checked_add(self.hour.checked_mul(3_600)?)?
            .checked_add(self.minute.checked_mul(60)?)?
            .checked_add(self.second)?;
        // Keeps Duration::seconds clear of its panic threshold
        if seconds.unsigned_abs() > 1_000_000_000_000_000 {
            return None;
        }
        base.checked_add_signed(Duration::seconds(seconds))
    }
}

fn leading_integer(token: &str) -> Option<i64> {
    let trimmed = token.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'+') => (false, &trimmed[1..]),
        Some(b'-') => (true, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Some(0);
    }
    let magnitude: i64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Seconds since the Unix epoch of timestamp text read as local time.
///
/// Returns `None` when the text cannot be mapped to a local instant.
pub fn text_to_epoch(text: &str) -> Option<i64> {
    let naive = TimestampFields::parse(text)?.normalize()?;
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Some(instant.timestamp()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp()),
        LocalResult::None => None,
    }
}

/// Encoded values of one timestamp plus their checksum digits.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedTimestamp {
    /// One encoded value per symbol, in order.
    pub values: Vec<f64>,
    /// One checksum digit per value, in order.
    pub checksum_digits: Vec<i64>,
}

impl EncodedTimestamp {
    /// The serialized checksum string.
    pub fn checksum(&self) -> String {
        ChecksumCodec::serialize(&self.checksum_digits)
    }
}

/// Encodes timestamp text into values and back.
#[derive(Clone)]
pub struct TimestampCodec {
    cipher: Cipher,
    checksum: ChecksumCodec,
    buffer_size: usize,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for TimestampCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampCodec")
            .field("cipher", &self.cipher)
            .field("checksum", &self.checksum)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl Default for TimestampCodec {
    fn default() -> Self {
        Self::new(CipherSettings::default())
    }
}

impl TimestampCodec {
    /// A codec over the standard keypair table, emitting no diagnostics.
    pub fn new(settings: CipherSettings) -> Self {
        Self::with_parts(
            Cipher::new(settings.scheme),
            ChecksumCodec::new(settings.checksum_modulus),
            settings.buffer_size,
        )
    }

    /// A codec from explicit parts.
    pub fn with_parts(cipher: Cipher, checksum: ChecksumCodec, buffer_size: usize) -> Self {
        Self {
            cipher,
            checksum,
            buffer_size,
            sink: Arc::new(SilentSink),
        }
    }

    /// Routes diagnostics to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying cipher.
    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    /// The underlying checksum codec.
    pub fn checksum(&self) -> &ChecksumCodec {
        &self.checksum
    }

    /// Symbol slots per timestamp.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Encodes every symbol of `text` and derives the checksum digits.
    ///
    /// Each symbol's code must be below the modulus of its position, which
    /// holds for all of ASCII.
    pub fn encode_text(&self, text: &str) -> Result<EncodedTimestamp> {
        if text.is_empty() {
            return Err(LicenseError::invalid_parameter("timestamp text is empty"));
        }
        let length = text.chars().count();
        if length >= self.buffer_size {
            return Err(LicenseError::invalid_parameter(format!(
                "timestamp text has {} symbols, at most {} fit",
                length,
                self.buffer_size.saturating_sub(1)
            )));
        }

        for (index, symbol) in text.chars().enumerate() {
            let modulus = self.cipher.table().entry(index).modulus();
            if u64::from(symbol as u32) >= modulus {
                return Err(LicenseError::invalid_parameter(format!(
                    "symbol {:?} at position {} does not fit modulus {}",
                    symbol, index, modulus
                )));
            }
        }

        self.sink.record(&DiagnosticEvent::PlainText {
            text: text.to_string(),
        });
        let values: Vec<f64> = text
            .chars()
            .enumerate()
            .map(|(index, symbol)| {
                let value = self.cipher.encode(symbol as u32, index);
                self.sink.record(&DiagnosticEvent::SymbolEncoded {
                    index,
                    symbol,
                    value,
                });
                value
            })
            .collect();
        let checksum_digits = self.checksum.digest(&values);
        Ok(EncodedTimestamp {
            values,
            checksum_digits,
        })
    }

    /// Whether `stored` matches the checksum recomputed from `values`.
    pub fn verify(&self, values: &[f64], stored: &str) -> bool {
        let computed = self.checksum.digest(values);
        if ChecksumCodec::verify(stored, &computed) {
            return true;
        }
        self.sink.record(&DiagnosticEvent::ChecksumMismatch {
            computed: ChecksumCodec::serialize(&computed),
            stored: stored.to_string(),
        });
        false
    }

    /// Decodes `values` back into text, rounding each result up.
    pub fn decode_sequence(&self, values: &[f64]) -> Result<String> {
        self.sink.record(&DiagnosticEvent::ValuesRead {
            count: values.len(),
        });
        if values.len() >= self.buffer_size {
            return Err(LicenseError::tampered(format!(
                "encoded file holds {} values, at most {} fit",
                values.len(),
                self.buffer_size.saturating_sub(1)
            )));
        }

        let mut text = String::with_capacity(values.len());
        for (index, &value) in values.iter().enumerate() {
            let code = self.cipher.decode(value, index).ceil();
            let symbol = symbol_from_code(code).ok_or_else(|| {
                LicenseError::tampered(format!(
                    "value {} at position {} does not decode to a character",
                    value, index
                ))
            })?;
            self.sink.record(&DiagnosticEvent::SymbolDecoded {
                index,
                modulus: self.cipher.private_key(index).modulus,
                symbol,
            });
            text.push(symbol);
        }

        if let Some(fields) = TimestampFields::parse(&text) {
            self.sink.record(&DiagnosticEvent::FieldsParsed {
                year: fields.year,
                month: fields.month,
                day: fields.day,
                hour: fields.hour,
                minute: fields.minute,
                second: fields.second,
            });
        }
        Ok(text)
    }
}

fn symbol_from_code(code: f64) -> Option<char> {
    if !code.is_finite() || code < 0.0 || code > u32::MAX as f64 {
        return None;
    }
    char::from_u32(code as u32)
}
