//! Password generation.
//!
//! Rejection sampling over a random byte stream: draw bytes, interpret each
//! as a character code, and keep only the ones in the allowed character
//! class until the requested length is reached. Source selection is isolated
//! behind [`ByteSource`] so the acceptance predicate is independent of where
//! the randomness comes from.

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};
use regex::Regex;

/// Characters acceptable in generated passwords: letters and digits that are
/// hard to confuse visually (no `i`, `l`, `o`, `0`, `1`) plus a fixed symbol
/// set.
static ALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-hj-km-np-zA-HJ-KM-NP-Z2-9~!@#$%^&*()_+=-]").unwrap());

/// A stream of raw random bytes.
pub trait ByteSource {
    fn next_byte(&mut self) -> u8;
}

/// The operating system's cryptographically secure generator.
pub struct OsRandom(OsRng);

impl ByteSource for OsRandom {
    fn next_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        self.0.fill_bytes(&mut buf);
        buf[0]
    }
}

/// Clock-seeded PRNG, used only when the OS source is unavailable. Not
/// suitable for anything that must stay secret from a determined attacker.
pub struct FallbackRandom(SmallRng);

impl ByteSource for FallbackRandom {
    fn next_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        self.0.fill_bytes(&mut buf);
        buf[0]
    }
}

/// Pick the best available byte source: the OS generator when it works,
/// otherwise the clock-seeded fallback.
pub fn default_source() -> Box<dyn ByteSource> {
    let mut probe = [0u8; 1];
    if OsRng.try_fill_bytes(&mut probe).is_ok() {
        Box::new(OsRandom(OsRng))
    } else {
        tracing::warn!("OS random source unavailable; falling back to a clock-seeded PRNG");
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Box::new(FallbackRandom(SmallRng::seed_from_u64(seed)))
    }
}

/// Whether a raw byte, read as a character code, is an allowed password
/// character.
pub fn accepted(byte: u8) -> bool {
    let mut buf = [0u8; 4];
    ALLOWED.is_match((byte as char).encode_utf8(&mut buf))
}

/// Accepted characters drawn lazily from a byte source.
///
/// There is no retry cap: the allow-list covers enough of the byte range
/// that running out is a probabilistic impossibility, not a handled error.
struct Accepted<'a> {
    source: &'a mut dyn ByteSource,
}

impl Iterator for Accepted<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            let byte = self.source.next_byte();
            if accepted(byte) {
                return Some(byte as char);
            }
        }
    }
}

/// Generate a password of exactly `length` allowed characters from the best
/// available random source.
pub fn generate(length: usize) -> String {
    generate_with(default_source().as_mut(), length)
}

/// Generate a password of exactly `length` allowed characters from the given
/// source.
pub fn generate_with(source: &mut dyn ByteSource, length: usize) -> String {
    Accepted { source }.take(length).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed byte sequence, cycling.
    struct Scripted {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Scripted {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.to_vec(),
                pos: 0,
            }
        }
    }

    impl ByteSource for Scripted {
        fn next_byte(&mut self) -> u8 {
            let byte = self.bytes[self.pos % self.bytes.len()];
            self.pos += 1;
            byte
        }
    }

    #[test]
    fn generates_exactly_the_requested_length() {
        let password = generate(12);
        assert_eq!(password.chars().count(), 12);
    }

    #[test]
    fn every_character_is_in_the_allow_list() {
        let password = generate(64);
        for c in password.chars() {
            assert!(accepted(c as u8), "unexpected character {c:?}");
        }
    }

    #[test]
    fn repeated_calls_differ() {
        // 2^-N chance of a false failure for N well past 64
        assert_ne!(generate(24), generate(24));
    }

    #[test]
    fn rejected_bytes_are_redrawn() {
        // 'i', 'l', 'o', '0' and '1' are all ambiguous and must be skipped
        let mut source = Scripted::new(b"i0a l1b o..c");
        let password = generate_with(&mut source, 3);
        assert_eq!(password, "abc");
    }

    #[test]
    fn zero_length_yields_empty_string() {
        let mut source = Scripted::new(b"abc");
        assert_eq!(generate_with(&mut source, 0), "");
    }

    #[test]
    fn allow_list_covers_a_meaningful_byte_fraction() {
        // Termination of the rejection loop relies on this staying large
        let accepted_count = (0u16..=255).filter(|b| accepted(*b as u8)).count();
        assert!(accepted_count >= 60, "only {accepted_count} bytes accepted");
    }

    #[test]
    fn ambiguous_characters_are_rejected() {
        for c in ['i', 'l', 'o', '0', '1', 'I', 'L', 'O'] {
            assert!(!accepted(c as u8), "{c:?} should be rejected");
        }
    }
}
