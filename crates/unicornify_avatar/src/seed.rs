//! Hex seeds and the deterministic random source built from them.

use md5::{Digest, Md5};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors from parsing a hex seed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    #[error("Seed is empty")]
    Empty,

    #[error("Seed has an odd number of hex digits ({0})")]
    OddLength(usize),

    #[error("Invalid hex digit {character:?} at position {position}")]
    InvalidDigit { position: usize, character: char },
}

/// Parse a string of hex digit pairs into bytes. Upper and lower case are
/// both accepted.
pub fn parse_hex(seed: &str) -> Result<Vec<u8>, SeedError> {
    if seed.is_empty() {
        return Err(SeedError::Empty);
    }
    let digits = seed
        .char_indices()
        .map(|(position, character)| {
            character
                .to_digit(16)
                .map(|d| d as u8)
                .ok_or(SeedError::InvalidDigit {
                    position,
                    character,
                })
        })
        .collect::<Result<Vec<u8>, SeedError>>()?;
    if digits.len() % 2 != 0 {
        return Err(SeedError::OddLength(digits.len()));
    }
    Ok(digits.chunks(2).map(|pair| pair[0] << 4 | pair[1]).collect())
}

/// Fold any number of seed bytes into the fixed-size seed of [`StdRng`].
/// The byte count is mixed in so that leading zero bytes still matter.
fn fold_seed(bytes: &[u8]) -> [u8; 32] {
    let mut seed = [0u8; 32];
    for (i, &b) in bytes.iter().enumerate() {
        let slot = &mut seed[i % 32];
        *slot = slot.rotate_left(3) ^ b;
    }
    for (slot, len_byte) in seed[24..].iter_mut().zip((bytes.len() as u64).to_le_bytes()) {
        *slot ^= len_byte;
    }
    seed
}

/// Random source for parameter generation.
///
/// Every parameter is drawn through one of these methods, in a fixed
/// order, so a seed always produces the same creature.
#[derive(Debug, Clone)]
pub struct SeedRandom {
    rng: StdRng,
}

impl SeedRandom {
    /// Seed from a hex string.
    pub fn from_hex(seed: &str) -> Result<Self, SeedError> {
        Ok(Self::from_bytes(&parse_hex(seed)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            rng: StdRng::from_seed(fold_seed(bytes)),
        }
    }

    pub fn from_u32(seed: u32) -> Self {
        Self::from_bytes(&seed.to_le_bytes())
    }

    /// Uniform integer in `min..=max`.
    pub fn rand_int(&mut self, min: i32, max: i32) -> i32 {
        self.rng.gen_range(min..=max)
    }

    /// Uniform float in `[0, 1)`.
    pub fn random(&mut self) -> f64 {
        self.rng.gen()
    }

    /// Uniform index in `0..count`.
    pub fn choice(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count)
    }

    pub fn bits(&mut self) -> u32 {
        self.rng.gen()
    }
}

/// Fresh random 128-bit seed as 32 lowercase hex digits.
pub fn random_hash() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Seed for an email address: the MD5 of the trimmed, lowercased address
/// as 32 hex digits, so the same person gets the same unicorn as on
/// Gravatar-style services.
pub fn mail_hash(mail: &str) -> String {
    let digest = Md5::digest(mail.trim().to_lowercase().as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("00ff10Ab"), Ok(vec![0x00, 0xff, 0x10, 0xab]));
        assert_eq!(parse_hex(""), Err(SeedError::Empty));
        assert_eq!(parse_hex("abc"), Err(SeedError::OddLength(3)));
        assert_eq!(
            parse_hex("12g4"),
            Err(SeedError::InvalidDigit {
                position: 2,
                character: 'g'
            })
        );
    }

    #[test]
    fn test_same_seed_same_draws() {
        let mut a = SeedRandom::from_hex("c0ffee").unwrap();
        let mut b = SeedRandom::from_hex("C0FFEE").unwrap();
        for _ in 0..20 {
            assert_eq!(a.rand_int(0, 1000), b.rand_int(0, 1000));
            assert_eq!(a.random(), b.random());
        }
    }

    #[test]
    fn test_leading_zero_bytes_matter() {
        assert_ne!(fold_seed(&[0]), fold_seed(&[0, 0]));
        assert_ne!(fold_seed(&[1, 2]), fold_seed(&[2, 1]));
    }

    #[test]
    fn test_ranges() {
        let mut rand = SeedRandom::from_u32(7);
        for _ in 0..200 {
            let i = rand.rand_int(-3, 3);
            assert!((-3..=3).contains(&i));
            let f = rand.random();
            assert!((0.0..1.0).contains(&f));
            assert!(rand.choice(2) < 2);
        }
    }

    #[test]
    fn test_random_hash_parses() {
        let hash = random_hash();
        assert_eq!(hash.len(), 32);
        assert_eq!(parse_hex(&hash).unwrap().len(), 16);
    }

    #[test]
    fn test_mail_hash() {
        assert_eq!(mail_hash(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(mail_hash("  ABC\n"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(mail_hash("Foo@Example.com"), mail_hash("foo@example.com "));
        assert!(parse_hex(&mail_hash("someone@example.org")).is_ok());
    }
}
