use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Key-derivation and transform variant used by the cipher.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum CipherScheme {
    /// Exact integer RSA-style transform: `c^e mod n`, inverted with
    /// `d = e^-1 mod phi`.
    #[default]
    Modular,
    /// Floating-point transform kept for files issued by earlier releases:
    /// `pow(c, e)` forward, `fmod(pow(v, fmod(1/e, phi)), n)` back.
    Legacy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_cipher_scheme_parsing() {
        assert_eq!(CipherScheme::from_str("modular").unwrap(), CipherScheme::Modular);
        assert_eq!(CipherScheme::from_str("Legacy").unwrap(), CipherScheme::Legacy);
        assert!(CipherScheme::from_str("rsa").is_err());
        assert_eq!(CipherScheme::default().to_string(), "modular");
    }
}
