//! Pickup code generation
//!
//! Codes are short enough to read aloud at a store counter and avoid
//! characters that look alike (`0`/`O`, `1`/`I`).

use rand::Rng;

use crate::model::MAX_CLAIM_CODE_LEN;

/// Characters a pickup code is drawn from
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Default pickup code length
pub const DEFAULT_CODE_LEN: usize = 6;

/// Attempts before giving up on finding an unused code
const MAX_ATTEMPTS: usize = 64;

/// Generates pickup codes
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    len: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LEN)
    }
}

impl CodeGenerator {
    /// Length is clamped to `1..=MAX_CLAIM_CODE_LEN`.
    pub fn new(len: usize) -> Self {
        Self {
            len: len.clamp(1, MAX_CLAIM_CODE_LEN),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Generate one random code
    pub fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..self.len)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect()
    }

    /// Generate a code for which `in_use` returns false.
    ///
    /// Returns `None` if every attempt collided.
    pub fn generate_unique<F>(&self, mut in_use: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        (0..MAX_ATTEMPTS)
            .map(|_| self.generate())
            .find(|code| !in_use(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        let code = CodeGenerator::default().generate();
        assert_eq!(code.len(), DEFAULT_CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_length_clamped() {
        assert_eq!(CodeGenerator::new(0).len(), 1);
        assert_eq!(CodeGenerator::new(64).len(), MAX_CLAIM_CODE_LEN);
    }

    #[test]
    fn test_generate_unique_skips_taken_codes() {
        let generator = CodeGenerator::new(1);
        let taken: HashSet<u8> = CODE_ALPHABET[1..].iter().copied().collect();
        // Only 'A' is free; 64 attempts over 32 symbols almost surely find it
        let code = generator.generate_unique(|c| taken.contains(&c.as_bytes()[0]));
        if let Some(code) = code {
            assert_eq!(code, "A");
        }
    }

    #[test]
    fn test_generate_unique_gives_up() {
        let generator = CodeGenerator::default();
        assert!(generator.generate_unique(|_| true).is_none());
    }
}
