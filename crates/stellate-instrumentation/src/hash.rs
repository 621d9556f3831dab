//! Content hashing for change detection
//!
//! A 31-multiplier rolling hash over Unicode code points, wrapped to 32 bits.
//! The collector uses it to deduplicate responses and variable sets; it is
//! not a cryptographic digest and makes no collision-resistance claims.

use serde_json::Value;

/// Hash a string into a `u32`.
///
/// Each code point `c` folds in as `acc = (acc << 5) - acc + c` with 32-bit
/// two's-complement wrapping. The empty string hashes to 0.
pub fn hash(input: &str) -> u32 {
    input.chars().fold(0i32, |acc, c| {
        (acc << 5).wrapping_sub(acc).wrapping_add(c as i32)
    }) as u32
}

/// Hash the compact JSON text of a value
pub fn hash_json(value: &Value) -> u32 {
    hash(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference model: the same recurrence written as `31 * acc + c` in u32.
    fn model(input: &str) -> u32 {
        input
            .chars()
            .fold(0u32, |acc, c| acc.wrapping_mul(31).wrapping_add(c as u32))
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(hash(""), 0);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(hash("a"), 97);
        assert_eq!(hash("ab"), 3105);
        assert_eq!(hash("hello"), 99_162_322);
        assert_eq!(hash("{}"), 3938);
        assert_eq!(hash(r#"{"data":null}"#), 1_390_146_093);
    }

    #[test]
    fn test_wraps_into_upper_half() {
        // Signed accumulator is negative here; output must be the unsigned view
        assert_eq!(hash("query { me { id } }"), 3_054_509_157);
    }

    #[test]
    fn test_astral_code_point_is_one_unit() {
        assert_eq!(hash("😀"), 128_512);
        assert_eq!(hash("a😀b"), 4_077_187);

        // Folding the UTF-16 surrogates separately gives a different value
        let surrogates = "😀"
            .encode_utf16()
            .fold(0u32, |acc, u| acc.wrapping_mul(31).wrapping_add(u as u32));
        assert_eq!(surrogates, 1_772_899);
        assert_ne!(hash("😀"), surrogates);
    }

    #[test]
    fn test_hash_json_uses_compact_text() {
        let value = serde_json::json!({ "data": null });
        assert_eq!(hash_json(&value), hash(r#"{"data":null}"#));
    }

    proptest! {
        #[test]
        fn prop_matches_multiplier_model(s in any::<String>()) {
            prop_assert_eq!(hash(&s), model(&s));
        }

        #[test]
        fn prop_deterministic(s in any::<String>()) {
            prop_assert_eq!(hash(&s), hash(&s.clone()));
        }
    }
}
