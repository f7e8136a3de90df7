// src/core/checksum.rs

/// Default upper bound (exclusive) of a checksum digit.
pub const DEFAULT_CHECKSUM_MODULUS: u64 = 3001;

/// Derives, serializes, and verifies the per-symbol checksum digits.
///
/// Each digit is `ceil(fmod(value, modulus))`; the checksum string is the
/// digits' decimal text concatenated without separators. This detects edits,
/// it does not authenticate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumCodec {
    modulus: u64,
}

impl Default for ChecksumCodec {
    fn default() -> Self {
        Self::new(DEFAULT_CHECKSUM_MODULUS)
    }
}

impl ChecksumCodec {
    /// A codec with the given digit modulus.
    pub fn new(modulus: u64) -> Self {
        Self { modulus }
    }

    /// The digit modulus.
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Checksum digit for one encoded value.
    pub fn digit_of(&self, encoded_value: f64) -> i64 {
        (encoded_value % self.modulus as f64).ceil() as i64
    }

    /// Checksum digits for a whole encoded sequence, in order.
    pub fn digest(&self, values: &[f64]) -> Vec<i64> {
        values.iter().map(|&v| self.digit_of(v)).collect()
    }

    /// Concatenates the decimal text of each digit.
    pub fn serialize(digits: &[i64]) -> String {
        digits.iter().map(|d| d.to_string()).collect()
    }

    /// Whether `expected` equals the serialized `computed` digits exactly.
    pub fn verify(expected: &str, computed: &[i64]) -> bool {
        Self::serialize(computed) == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digit_of() {
        let codec = ChecksumCodec::default();
        assert_eq!(codec.digit_of(41.0), 41);
        assert_eq!(codec.digit_of(3001.0), 0);
        assert_eq!(codec.digit_of(3002.5), 2);
        assert_eq!(codec.digit_of(781_250_000_000.0), 110);
    }

    #[test]
    fn test_serialize_has_no_separators() {
        assert_eq!(ChecksumCodec::serialize(&[41, 75, 107]), "4175107");
        assert_eq!(ChecksumCodec::serialize(&[]), "");
    }

    #[test]
    fn test_verify_detects_single_mutations() {
        let codec = ChecksumCodec::default();
        let values = [41.0, 75.0, 107.0, 98.0];
        let digits = codec.digest(&values);
        let expected = ChecksumCodec::serialize(&digits);
        assert!(ChecksumCodec::verify(&expected, &digits));

        let mut flipped = expected.clone().into_bytes();
        flipped[2] = if flipped[2] == b'9' { b'8' } else { flipped[2] + 1 };
        assert!(!ChecksumCodec::verify(&String::from_utf8(flipped).unwrap(), &digits));

        let mut mutated = values;
        mutated[1] += 1.0;
        assert!(!ChecksumCodec::verify(&expected, &codec.digest(&mutated)));
    }

    #[test]
    fn test_custom_modulus() {
        let codec = ChecksumCodec::new(7);
        assert_eq!(codec.modulus(), 7);
        assert_eq!(codec.digest(&[8.0, 13.0, 14.0]), vec![1, 6, 0]);
    }
}
