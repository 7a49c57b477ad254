//! Session code generation.

use rand::{Rng, thread_rng};

/// Code alphabet. `I`, `O`, `0` and `1` are left out so codes read back unambiguously.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of characters in a session code.
pub const CODE_LENGTH: usize = 6;

/// Produces random human-readable session codes.
///
/// Codes are not checked for uniqueness.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionCodeGenerator;

impl SessionCodeGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a code from the thread-local RNG.
    #[must_use]
    pub fn generate(&self) -> String {
        self.generate_with(&mut thread_rng())
    }

    /// Generate a code from the given RNG, one independent draw per character.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..CODE_LENGTH)
            .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
            .collect()
    }
}

/// Normalize a user-entered code: trimmed, uppercase. `None` when blank.
#[must_use]
pub fn normalize_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_code_shape() {
        let generator = SessionCodeGenerator::new();
        for _ in 0..500 {
            let code = generator.generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)), "{code}");
        }
    }

    #[test]
    fn test_ambiguous_characters_excluded() {
        for c in [b'I', b'O', b'0', b'1'] {
            assert!(!CODE_ALPHABET.contains(&c));
        }
    }

    #[test]
    fn test_positions_are_roughly_uniform() {
        let generator = SessionCodeGenerator::new();
        let mut rng = StdRng::seed_from_u64(7);
        let draws = 32_000;
        let mut counts = vec![[0usize; CODE_LENGTH]; CODE_ALPHABET.len()];

        for _ in 0..draws {
            let code = generator.generate_with(&mut rng);
            for (pos, b) in code.bytes().enumerate() {
                let idx = CODE_ALPHABET.iter().position(|&c| c == b).unwrap();
                counts[idx][pos] += 1;
            }
        }

        // Expected ~1000 per symbol and position; allow a wide band.
        let expected = draws / CODE_ALPHABET.len();
        for row in &counts {
            for &n in row {
                assert!(n > expected * 7 / 10 && n < expected * 13 / 10, "count {n}");
            }
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  ab12cd "), Some("AB12CD".to_string()));
        assert_eq!(normalize_code(" \t\n"), None);
        assert_eq!(normalize_code(""), None);
    }
}
