//! Squad code drawing and normalization.
//!
//! Codes are short enough for a user to read over voice chat and type on a
//! phone. Uniqueness against *live* squads is enforced by the store at
//! insertion time; destroyed codes may be handed out again.

use rand::Rng;

/// Characters a squad code may contain.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a squad code.
pub const CODE_LEN: usize = 4;

/// Collision redraws before code allocation fails closed. With a 36^4 code
/// space and small live-squad counts this bound is effectively unreachable.
pub const MAX_ATTEMPTS: usize = 32;

/// Draw a random squad code.
pub fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-entered code: strip whitespace, fold to uppercase.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Whether a (normalized) code has the shape a live code could have.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LEN
        && code
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
