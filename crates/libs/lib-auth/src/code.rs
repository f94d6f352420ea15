//! # Verification Codes
//!
//! Six digit numeric codes mailed to users to confirm their email address.

use rand::Rng;

/// Smallest code that can be issued.
pub const VERIFY_CODE_MIN: u32 = 100_000;
/// Largest code that can be issued.
pub const VERIFY_CODE_MAX: u32 = 999_999;

/// Generate a code drawn uniformly from `[VERIFY_CODE_MIN, VERIFY_CODE_MAX]`.
pub fn generate_verify_code() -> String {
    rand::thread_rng()
        .gen_range(VERIFY_CODE_MIN..=VERIFY_CODE_MAX)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_six_digits_in_range() {
        for _ in 0..1_000 {
            let code = generate_verify_code();
            assert_eq!(code.len(), 6);

            let value: u32 = code.parse().expect("code should be numeric");
            assert!((VERIFY_CODE_MIN..=VERIFY_CODE_MAX).contains(&value));
        }
    }
}
