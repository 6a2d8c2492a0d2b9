//! Random prefix generation for created aliases.

/// Lowercase consonants only: prefixes stay pronounceable and cannot
/// spell accidental words.
const LEXICON: &[u8; 20] = b"bcdfghjkmnpqrstvwxyz";

const PREFIX_LEN: usize = 5;

/// Generates a 5-character random prefix from the consonant lexicon.
///
/// Bytes come from the operating system's CSPRNG. 20^5 combinations make
/// collisions between runs negligible without being impossible.
///
/// # Panics
///
/// Panics if the OS entropy source fails. There is no recovery from
/// that, and falling back to weaker randomness would be worse than
/// aborting.
#[must_use]
pub fn generate() -> String {
    let mut bytes = [0u8; PREFIX_LEN];
    if let Err(e) = getrandom::fill(&mut bytes) {
        panic!("system entropy source failed: {e}");
    }
    bytes
        .iter()
        .map(|b| char::from(LEXICON[usize::from(*b) % LEXICON.len()]))
        .collect()
}
