//! # World Seed
//!
//! A world is named by an integer or a string. Both are hashed with 64-bit
//! FNV-1a into a [`Seed`], which exposes the raw hash (for the permutation
//! shuffle) and a float in [0, 1) (the "seed value" that personality ranges
//! are interpolated with). Integers hash through their decimal text, so `42`
//! and `"42"` name the same world.

use std::fmt;

use serde::{Deserialize, Serialize};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8], mut hash: u64) -> u64 {
    for byte in bytes {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Maps a hash onto [0, 1) using its top 53 bits.
fn unit_interval(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}

/// The seed a world is created from, as written in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSource {
    /// An integer seed.
    Number(i64),
    /// A free-form text seed.
    Text(String),
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Number(0)
    }
}

impl fmt::Display for SeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedSource::Number(n) => write!(f, "{n}"),
            SeedSource::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A hashed world seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed {
    hash: u64,
}

impl Seed {
    /// Hashes arbitrary seed text.
    pub fn new(text: &str) -> Self {
        Seed {
            hash: fnv1a(text.as_bytes(), FNV_OFFSET),
        }
    }

    /// The 64-bit hash used to drive shuffles.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The seed value in [0, 1).
    pub fn value(&self) -> f64 {
        unit_interval(self.hash)
    }

    /// An independent fraction in [0, 1) for one named parameter.
    ///
    /// Each salt yields a different, stable stream from the same seed, so
    /// adding a parameter never shifts the values of existing ones.
    pub fn fraction(&self, salt: &str) -> f64 {
        unit_interval(self.derive(salt))
    }

    /// An independent 64-bit hash for one named purpose.
    pub fn derive(&self, salt: &str) -> u64 {
        let hash = fnv1a(&self.hash.to_le_bytes(), FNV_OFFSET);
        fnv1a(salt.as_bytes(), hash)
    }
}

impl From<&str> for Seed {
    fn from(text: &str) -> Self {
        Seed::new(text)
    }
}

impl From<i64> for Seed {
    fn from(number: i64) -> Self {
        Seed::new(&number.to_string())
    }
}

impl From<&SeedSource> for Seed {
    fn from(source: &SeedSource) -> Self {
        match source {
            SeedSource::Number(n) => Seed::from(*n),
            SeedSource::Text(s) => Seed::new(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_and_their_text_agree() {
        assert_eq!(Seed::from(42), Seed::from("42"));
        assert_ne!(Seed::from(42), Seed::from(43));
    }

    #[test]
    fn empty_text_hashes_to_offset_basis() {
        assert_eq!(Seed::new("").hash(), FNV_OFFSET);
    }

    #[test]
    fn known_fnv_vector() {
        // FNV-1a 64 of "a".
        assert_eq!(Seed::new("a").hash(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn values_are_unit_interval() {
        for text in ["", "a", "TESTSEED1", "a much longer seed phrase"] {
            let seed = Seed::new(text);
            assert!((0.0..1.0).contains(&seed.value()));
            assert!((0.0..1.0).contains(&seed.fraction("cave")));
        }
    }

    #[test]
    fn fractions_differ_by_salt() {
        let seed = Seed::new("TESTSEED1");
        assert_ne!(seed.fraction("cave"), seed.fraction("stripe"));
        assert_eq!(seed.fraction("cave"), Seed::new("TESTSEED1").fraction("cave"));
    }

    #[test]
    fn sources_deserialize_untagged() {
        let n: SeedSource = serde_json::from_str("1234").unwrap();
        let s: SeedSource = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(n, SeedSource::Number(1234));
        assert_eq!(s, SeedSource::Text("hello".into()));
        assert_eq!(Seed::from(&n), Seed::from("1234"));
    }
}
