// src/storage/mod.rs

// Define sub-modules for storage backends
pub mod memory;
pub mod file;

use std::fmt::Debug;

use crate::config::Config;
use crate::error::{LicenseError, Result};
use crate::types::StorageType;

pub use file::FileGateway;
pub use memory::MemoryGateway;

/// Which halves of the timestamp pair currently exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presence {
    /// The encoded timestamp is present.
    pub encrypted: bool,
    /// The checksum is present.
    pub checksum: bool,
}

impl Presence {
    /// At least one half exists.
    pub fn any(&self) -> bool {
        self.encrypted || self.checksum
    }

    /// Both halves exist.
    pub fn all(&self) -> bool {
        self.encrypted && self.checksum
    }
}

/// The persisted pair as read back from storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoredTimestamp {
    /// Encoded values, in symbol order.
    pub values: Vec<f64>,
    /// The stored checksum string, empty if the checksum was blank.
    pub checksum: String,
}

/// Persists the encoded timestamp and its checksum.
///
/// Implementations never overwrite an existing pair: `write` fails with
/// `FileExist` when either half is already present.
pub trait PersistenceGateway: Send + Sync + Debug {
    /// Reports which halves currently exist.
    fn presence(&self) -> Presence;

    /// Stores a new pair.
    fn write(&self, values: &[f64], checksum: &str) -> Result<()>;

    /// Loads the stored pair; both halves must exist.
    fn read(&self) -> Result<StoredTimestamp>;

    /// Deletes whichever halves exist.
    fn remove(&self) -> Result<()>;
}

/// Builds the gateway selected by `config.storage.storage_type`.
pub fn create_gateway(config: &Config) -> Result<Box<dyn PersistenceGateway>> {
    match config.storage.storage_type {
        StorageType::Memory => Ok(Box::new(MemoryGateway::new())),
        StorageType::File => Ok(Box::new(FileGateway::new(
            &config.license.encrypted_file,
            &config.license.checksum_file,
        )?)),
    }
}

/// Renders a value with 17 significant digits, like C's `%.17g`.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.16e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if !(-4..17).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let precision = (16 - exponent) as usize;
        trim_fraction(&format!("{:.*}", precision, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// One formatted value per line.
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|&v| format!("{}\n", format_value(v)))
        .collect()
}

/// Parses whitespace-separated values; any malformed token means tampering.
pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .enumerate()
        .map(|(position, token)| {
            token.parse::<f64>().map_err(|_| {
                LicenseError::tampered(format!(
                    "token {:?} at position {} is not a number",
                    token, position
                ))
            })
        })
        .collect()
}

/// The first whitespace-delimited token, or an empty string.
pub fn parse_checksum(text: &str) -> String {
    text.split_whitespace().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_format_value_matches_printf() {
        assert_eq!(format_value(41.0), "41");
        assert_eq!(format_value(1034.0), "1034");
        assert_eq!(format_value(781_250_000_000.0), "781250000000");
        assert_eq!(format_value(0.1), "0.10000000000000001");
        assert_eq!(format_value(48f64.powf(11.0)), "3.1164029812101612e+18");
        assert_eq!(format_value(0.00001), "1.0000000000000001e-05");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-2.5), "-2.5");
    }

    #[test]
    fn test_format_value_round_trips() {
        for value in [41.0, 0.1, 1.0 / 3.0, 48f64.powf(11.0), 123_456_789.125] {
            assert_eq!(format_value(value).parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn test_format_values_one_per_line() {
        assert_eq!(format_values(&[41.0, 75.0]), "41\n75\n");
        assert_eq!(format_values(&[]), "");
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_values("41\n75\n").unwrap(), vec![41.0, 75.0]);
        assert_eq!(
            parse_values("3.1164029812101612e+18").unwrap(),
            vec![3.116_402_981_210_161_2e18]
        );
        assert!(parse_values("").unwrap().is_empty());
        assert_matches!(
            parse_values("41\nabc\n"),
            Err(LicenseError::TimestampTampered(_))
        );
    }

    #[test]
    fn test_parse_checksum() {
        assert_eq!(parse_checksum("4175107\n"), "4175107");
        assert_eq!(parse_checksum("  12 34"), "12");
        assert_eq!(parse_checksum(""), "");
    }

    #[test]
    fn test_presence() {
        let none = Presence::default();
        assert!(!none.any() && !none.all());
        let half = Presence { encrypted: true, checksum: false };
        assert!(half.any() && !half.all());
        let both = Presence { encrypted: true, checksum: true };
        assert!(both.all());
    }

    #[test]
    fn test_create_gateway_uses_storage_type() {
        let mut config = Config::default();
        config.storage.storage_type = StorageType::Memory;
        let gateway = create_gateway(&config).unwrap();
        assert!(!gateway.presence().any());

        config.storage.storage_type = StorageType::File;
        config.license.encrypted_file = String::new();
        assert_matches!(create_gateway(&config), Err(LicenseError::InvalidParameter(_)));
    }
}
