// src/core/keypair.rs

use std::sync::{Arc, OnceLock};

use crate::error::{LicenseError, Result};

/// One pair of small prime factors from which a public/private key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeypairEntry {
    /// First prime factor.
    pub factor_a: u64,
    /// Second prime factor.
    pub factor_b: u64,
}

impl KeypairEntry {
    /// Creates an entry, checking that both factors are distinct and greater than one.
    pub fn new(factor_a: u64, factor_b: u64) -> Result<Self> {
        if factor_a <= 1 || factor_b <= 1 {
            return Err(LicenseError::invalid_parameter(format!(
                "keypair factors must exceed 1, got ({}, {})",
                factor_a, factor_b
            )));
        }
        if factor_a == factor_b {
            return Err(LicenseError::invalid_parameter(format!(
                "keypair factors must differ, got ({}, {})",
                factor_a, factor_b
            )));
        }
        Ok(Self { factor_a, factor_b })
    }

    /// `factor_a * factor_b`.
    pub fn modulus(&self) -> u64 {
        self.factor_a * self.factor_b
    }

    /// Euler's totient of the modulus, `(factor_a - 1) * (factor_b - 1)`.
    pub fn phi(&self) -> u64 {
        (self.factor_a - 1) * (self.factor_b - 1)
    }
}

const STANDARD_FACTOR_B: [u64; 20] = [
    13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

const STANDARD_FACTOR_A: u64 = 11;

/// Immutable, ordered table of keypair entries.
///
/// Symbol position `i` always uses `entries[i % len]`, so a timestamp longer
/// than the table wraps around to the first entry again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypairTable {
    entries: Vec<KeypairEntry>,
}

impl KeypairTable {
    /// Builds a table from `entries`; the table must not be empty.
    pub fn new(entries: Vec<KeypairEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(LicenseError::invalid_parameter("keypair table cannot be empty"));
        }
        Ok(Self { entries })
    }

    /// The shared 20-entry table every issued timestamp is encoded with.
    pub fn standard() -> Arc<KeypairTable> {
        static STANDARD: OnceLock<Arc<KeypairTable>> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                let entries = STANDARD_FACTOR_B
                    .iter()
                    .map(|&factor_b| KeypairEntry {
                        factor_a: STANDARD_FACTOR_A,
                        factor_b,
                    })
                    .collect();
                Arc::new(KeypairTable { entries })
            })
            .clone()
    }

    /// The entry used for symbol position `index`.
    pub fn entry(&self, index: usize) -> &KeypairEntry {
        &self.entries[index % self.entries.len()]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &KeypairEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_prime(n: u64) -> bool {
        n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn test_standard_table_invariants() {
        let table = KeypairTable::standard();
        assert_eq!(table.len(), 20);
        for entry in table.iter() {
            assert_ne!(entry.factor_a, entry.factor_b);
            assert!(entry.factor_a > 2 && entry.factor_b > 2);
            assert!(is_prime(entry.factor_a), "{} is not prime", entry.factor_a);
            assert!(is_prime(entry.factor_b), "{} is not prime", entry.factor_b);
        }
        assert_eq!(*table.entry(0), KeypairEntry { factor_a: 11, factor_b: 13 });
        assert_eq!(*table.entry(19), KeypairEntry { factor_a: 11, factor_b: 97 });
    }

    #[test]
    fn test_entry_wraps_by_table_size() {
        let table = KeypairTable::standard();
        assert_eq!(table.entry(20), table.entry(0));
        assert_eq!(table.entry(47), table.entry(7));
    }

    #[test]
    fn test_standard_table_is_shared() {
        assert!(Arc::ptr_eq(&KeypairTable::standard(), &KeypairTable::standard()));
    }

    #[test]
    fn test_entry_validation() {
        assert!(KeypairEntry::new(11, 11).is_err());
        assert!(KeypairEntry::new(1, 13).is_err());
        let entry = KeypairEntry::new(11, 13).unwrap();
        assert_eq!(entry.modulus(), 143);
        assert_eq!(entry.phi(), 120);
        assert!(KeypairTable::new(Vec::new()).is_err());
    }
}
