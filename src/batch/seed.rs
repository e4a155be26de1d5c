//! Per-unit seed derivation.
//!
//! The seed keys the rotation stream of one work unit. It depends only on the
//! unit's stable identity and its rotation increment, so a sequence can be
//! re-created from the output directory alone, and the same model rotated by
//! 45° and by 60° draws different rotation orders.

/// Seed used when the identity suffix is not hexadecimal.
pub const FALLBACK_SEED: i64 = 12345;

/// Number of trailing identity characters read as hexadecimal.
pub const IDENTITY_SUFFIX_LEN: usize = 6;

/// Derives the rotation seed for a work unit.
///
/// The last [`IDENTITY_SUFFIX_LEN`] characters of `model_identity` are parsed
/// as a base-16 integer ([`FALLBACK_SEED`] if that fails) and the rotation
/// increment, truncated toward zero, is added. Never fails.
///
/// The suffix may carry surrounding whitespace, a sign, a `0x` prefix and
/// single `_` separators between digits, so `"ab0x1234"` seeds from `0x1234`.
pub fn derive_seed(model_identity: &str, rotation_degrees: f64) -> i64 {
    let base = parse_hex(identity_suffix(model_identity)).unwrap_or(FALLBACK_SEED);
    base.wrapping_add(rotation_degrees.trunc() as i64)
}

fn parse_hex(literal: &str) -> Option<i64> {
    let literal = literal.trim();
    let (negative, unsigned) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal.strip_prefix('+').unwrap_or(literal)),
    };
    // A separator may follow the prefix directly.
    let digits = match unsigned.strip_prefix("0x").or_else(|| unsigned.strip_prefix("0X")) {
        Some(rest) => rest.strip_prefix('_').unwrap_or(rest),
        None => unsigned,
    };
    let well_formed = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.chars().all(|c| c.is_ascii_hexdigit() || c == '_');
    if !well_formed {
        return None;
    }

    let value = i64::from_str_radix(&digits.replace('_', ""), 16).ok()?;
    Some(if negative { -value } else { value })
}

fn identity_suffix(identity: &str) -> &str {
    let start = identity
        .char_indices()
        .rev()
        .nth(IDENTITY_SUFFIX_LEN - 1)
        .map_or(0, |(index, _)| index);
    &identity[start..]
}
