//! Human-readable branch labels.
//!
//! Labels cycle through the alphabet and gain a numeric tier after every
//! 26 branches: `Timeline A` .. `Timeline Z`, `Timeline A1` .. `Timeline Z1`,
//! `Timeline A2`, and so on. The mapping is a bijection on `u64`, so a label
//! issued from a monotonically increasing counter never repeats.

const PREFIX: &str = "Timeline ";
const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the label for the branch created `index`-th in a session.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn branch_label(index: u64) -> String {
    let letter = char::from(ALPHABET[(index % 26) as usize]);
    let tier = index / 26;
    if tier == 0 {
        format!("{PREFIX}{letter}")
    } else {
        format!("{PREFIX}{letter}{tier}")
    }
}

/// Inverse of [`branch_label`]. Returns `None` for strings it never produces.
#[must_use]
pub fn label_index(label: &str) -> Option<u64> {
    let rest = label.strip_prefix(PREFIX)?;
    let mut chars = rest.chars();
    let letter = chars.next()?;
    let position = ALPHABET.iter().position(|&c| char::from(c) == letter)?;

    let digits = chars.as_str();
    let tier = if digits.is_empty() {
        0
    } else {
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u64>().ok()?
    };

    tier.checked_mul(26)?.checked_add(position as u64)
}
