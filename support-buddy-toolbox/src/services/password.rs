//! Local password strength meter and generator. Nothing leaves the process.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{PasswordStrength, StrengthLevel};

/// Lengths accepted by [`generate_password`].
pub const GENERATED_LENGTH: RangeInclusive<usize> = 8..=32;

const MAX_SCORE: u8 = 6;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

const LETTERS_AND_DIGITS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PUNCTUATION: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Score a password on six criteria.
pub fn password_strength(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    let mut feedback = Vec::new();
    if length < 8 {
        feedback.push("Use at least 8 characters".to_string());
    }
    if !has_lowercase {
        feedback.push("Add lowercase letters".to_string());
    }
    if !has_uppercase {
        feedback.push("Add uppercase letters".to_string());
    }
    if !has_digit {
        feedback.push("Add numbers".to_string());
    }
    if !has_special {
        feedback.push("Add special characters".to_string());
    }

    let score = [
        length >= 8,
        length >= 12,
        has_lowercase,
        has_uppercase,
        has_digit,
        has_special,
    ]
    .into_iter()
    .map(u8::from)
    .sum();

    let strength = match score {
        0..=2 => StrengthLevel::Weak,
        3..=4 => StrengthLevel::Moderate,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength {
        strength,
        score,
        max_score: MAX_SCORE,
        length,
        has_lowercase,
        has_uppercase,
        has_digit,
        has_special,
        feedback,
    }
}

/// Random password from letters, digits and optionally ASCII punctuation.
pub fn generate_password(length: usize, include_special: bool) -> ToolboxResult<String> {
    if !GENERATED_LENGTH.contains(&length) {
        return Err(ToolboxError::ValidationError(format!(
            "Password length must be between {} and {}",
            GENERATED_LENGTH.start(),
            GENERATED_LENGTH.end()
        )));
    }

    let charset: Vec<u8> = if include_special {
        [LETTERS_AND_DIGITS, PUNCTUATION].concat()
    } else {
        LETTERS_AND_DIGITS.to_vec()
    };

    let mut rng = rand::thread_rng();
    Ok((0..length)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect())
}
