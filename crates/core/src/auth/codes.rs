//! One-time codes and generated passwords.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Generates a 4-digit numeric code in `1000..=9999`.
#[must_use]
pub fn generate_code() -> String {
    rand::rng().random_range(1000..=9999).to_string()
}

/// Returns the lowercase hex SHA-256 digest of a code.
#[must_use]
pub fn hash_code(code: &str) -> String {
    format!("{:x}", Sha256::digest(code.as_bytes()))
}

/// Generates a 10-character lowercase hex password from 5 random bytes.
#[must_use]
pub fn generate_password() -> String {
    let bytes: [u8; 5] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hash_code_known_vector() {
        assert_eq!(
            hash_code("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn test_generated_password_shape() {
        let password = generate_password();
        assert_eq!(password.len(), 10);
        assert!(password.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    proptest! {
        #[test]
        fn test_codes_are_four_digits(_seed in 0u8..64) {
            let code = generate_code();
            prop_assert_eq!(code.len(), 4);
            let value: u32 = code.parse().unwrap();
            prop_assert!((1000..=9999).contains(&value));
        }
    }
}
