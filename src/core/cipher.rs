// src/core/cipher.rs

//! Per-symbol modular-exponentiation transform.
//!
//! Symbol position `i` is encoded with the key derived from
//! `KeypairTable::entry(i)`. The public exponent is the smallest `e >= 2`
//! coprime with `phi`; how the private exponent is derived, and whether the
//! forward transform is reduced modulo `n`, depends on the [`CipherScheme`].

use std::sync::Arc;

use crate::core::checksum::DEFAULT_CHECKSUM_MODULUS;
use crate::core::keypair::KeypairTable;
use crate::core::timestamp::DEFAULT_BUFFER_SIZE;
use crate::types::CipherScheme;

/// Exponent and modulus derived for one symbol position. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedKey {
    /// Private exponent.
    pub exponent: f64,
    /// `factor_a * factor_b`.
    pub modulus: f64,
}

/// Tunable parameters of the cipher, checksum, and timestamp codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSettings {
    /// Transform variant.
    pub scheme: CipherScheme,
    /// Upper bound (exclusive) of each checksum digit.
    pub checksum_modulus: u64,
    /// Symbol slots per timestamp; texts must be strictly shorter.
    pub buffer_size: usize,
}

impl Default for CipherSettings {
    fn default() -> Self {
        Self {
            scheme: CipherScheme::Modular,
            checksum_modulus: DEFAULT_CHECKSUM_MODULUS,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Multiplicative inverse of `value` modulo `modulus`, if one exists.
pub fn mod_inverse(value: u64, modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }
    let (mut old_r, mut r) = (value as i128, modulus as i128);
    let (mut old_s, mut s) = (1i128, 0i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    if old_r != 1 {
        return None;
    }
    Some(old_s.rem_euclid(modulus as i128) as u64)
}

/// `base^exp mod modulus` by square-and-multiply.
pub fn mod_pow(base: u64, mut exp: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let m = modulus as u128;
    let mut base = base as u128 % m;
    let mut acc: u128 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc * base % m;
        }
        base = base * base % m;
        exp >>= 1;
    }
    acc as u64
}

/// Encodes and decodes single symbols with rotating keys.
#[derive(Debug, Clone)]
pub struct Cipher {
    table: Arc<KeypairTable>,
    scheme: CipherScheme,
}

impl Cipher {
    /// A cipher over the standard keypair table.
    pub fn new(scheme: CipherScheme) -> Self {
        Self::with_table(KeypairTable::standard(), scheme)
    }

    /// A cipher over a caller-supplied table.
    pub fn with_table(table: Arc<KeypairTable>, scheme: CipherScheme) -> Self {
        Self { table, scheme }
    }

    /// The transform variant in use.
    pub fn scheme(&self) -> CipherScheme {
        self.scheme
    }

    /// The keypair table in use.
    pub fn table(&self) -> &KeypairTable {
        &self.table
    }

    /// Public exponent for symbol position `index`.
    pub fn public_key(&self, index: usize) -> u64 {
        let phi = self.table.entry(index).phi();
        let mut e = 2;
        while e < phi {
            if gcd(e, phi) == 1 {
                break;
            }
            e += 1;
        }
        e
    }

    /// Private exponent and modulus for symbol position `index`.
    ///
    /// Under [`CipherScheme::Modular`] the exponent is `NaN` when the public
    /// exponent has no inverse modulo `phi`, which only happens for degenerate
    /// custom tables.
    pub fn private_key(&self, index: usize) -> DerivedKey {
        let entry = self.table.entry(index);
        let e = self.public_key(index);
        let phi = entry.phi();
        let exponent = match self.scheme {
            CipherScheme::Modular => mod_inverse(e, phi).map_or(f64::NAN, |d| d as f64),
            CipherScheme::Legacy => (1.0 / e as f64) % phi as f64,
        };
        DerivedKey {
            exponent,
            modulus: entry.modulus() as f64,
        }
    }

    /// Encodes one symbol code at position `index`.
    pub fn encode(&self, symbol: u32, index: usize) -> f64 {
        let e = self.public_key(index);
        match self.scheme {
            CipherScheme::Modular => {
                mod_pow(symbol as u64, e, self.table.entry(index).modulus()) as f64
            }
            CipherScheme::Legacy => (symbol as f64).powf(e as f64),
        }
    }

    /// Decodes one value at position `index`.
    ///
    /// The result is a real; callers round it up to recover the symbol code.
    /// Under [`CipherScheme::Modular`], values that are not non-negative
    /// integers decode to `NaN`.
    pub fn decode(&self, value: f64, index: usize) -> f64 {
        let key = self.private_key(index);
        match self.scheme {
            CipherScheme::Modular => {
                if !key.exponent.is_finite() || !is_whole_u64(value) {
                    return f64::NAN;
                }
                mod_pow(value as u64, key.exponent as u64, key.modulus as u64) as f64
            }
            CipherScheme::Legacy => value.powf(key.exponent) % key.modulus,
        }
    }
}

fn is_whole_u64(value: f64) -> bool {
    value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value < u64::MAX as f64
}
