//! Unix file permission conversions.

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{PermissionAssessment, PermissionMode};

const TRIPLET: [(u8, char); 3] = [(4, 'r'), (2, 'w'), (1, 'x')];

/// Expand a numeric mode such as `"644"` (or `"0644"`).
pub fn permissions_from_numeric(numeric: &str) -> ToolboxResult<PermissionMode> {
    let trimmed = numeric.trim();
    let digits = match trimmed.len() {
        4 => trimmed.strip_prefix('0').unwrap_or(trimmed),
        _ => trimmed,
    };

    let parsed: Option<Vec<u8>> = digits
        .chars()
        .map(|c| c.to_digit(8).and_then(|d| u8::try_from(d).ok()))
        .collect();
    match parsed {
        Some(values) if values.len() == 3 => Ok(build_mode(values[0], values[1], values[2])),
        _ => Err(ToolboxError::ValidationError(format!(
            "Invalid numeric permissions {trimmed:?}: use three digits 0-7"
        ))),
    }
}

/// Collapse a nine-character mode such as `"rwxr-xr-x"`.
///
/// A leading file-type character (`-`, `d`, `l`) as printed by `ls -l` is
/// accepted and ignored.
pub fn permissions_from_symbolic(symbolic: &str) -> ToolboxResult<PermissionMode> {
    let trimmed = symbolic.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let chars = match chars.len() {
        10 if matches!(chars[0], '-' | 'd' | 'l') => &chars[1..],
        _ => &chars[..],
    };

    let invalid = || {
        ToolboxError::ValidationError(format!(
            "Invalid symbolic permissions {trimmed:?}: expected e.g. rw-r--r--"
        ))
    };
    if chars.len() != 9 {
        return Err(invalid());
    }

    let mut digits = [0u8; 3];
    for (digit, class) in digits.iter_mut().zip(chars.chunks(3)) {
        for ((bit, letter), c) in TRIPLET.iter().zip(class) {
            match *c {
                '-' => {}
                c if c == *letter => *digit += bit,
                _ => return Err(invalid()),
            }
        }
    }

    Ok(build_mode(digits[0], digits[1], digits[2]))
}

fn triplet(value: u8) -> String {
    TRIPLET
        .iter()
        .map(|(bit, letter)| if value & bit == 0 { '-' } else { *letter })
        .collect()
}

fn assess(numeric: &str) -> PermissionAssessment {
    match numeric {
        "777" => PermissionAssessment::Dangerous,
        "666" => PermissionAssessment::Insecure,
        "644" | "755" => PermissionAssessment::Recommended,
        "600" | "700" => PermissionAssessment::Secure,
        _ => PermissionAssessment::Custom,
    }
}

fn build_mode(owner: u8, group: u8, other: u8) -> PermissionMode {
    let numeric = format!("{owner}{group}{other}");
    let (owner, group, other) = (triplet(owner), triplet(group), triplet(other));
    PermissionMode {
        symbolic: format!("{owner}{group}{other}"),
        owner,
        group,
        other,
        assessment: assess(&numeric),
        chmod: format!("chmod {numeric} filename"),
        numeric,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_to_symbolic() {
        let mode = permissions_from_numeric("644").unwrap();
        assert_eq!(mode.symbolic, "rw-r--r--");
        assert_eq!(mode.owner, "rw-");
        assert_eq!(mode.group, "r--");
        assert_eq!(mode.other, "r--");
        assert_eq!(mode.assessment, PermissionAssessment::Recommended);
        assert_eq!(mode.chmod, "chmod 644 filename");
    }

    #[test]
    fn test_assessments() {
        let cases = [
            ("777", PermissionAssessment::Dangerous),
            ("666", PermissionAssessment::Insecure),
            ("755", PermissionAssessment::Recommended),
            ("600", PermissionAssessment::Secure),
            ("0700", PermissionAssessment::Secure),
            ("640", PermissionAssessment::Custom),
        ];
        for (input, expected) in cases {
            assert_eq!(permissions_from_numeric(input).unwrap().assessment, expected);
        }
    }

    #[test]
    fn test_numeric_rejects_bad_input() {
        for input in ["", "64", "6444", "648", "abc", "1644"] {
            assert!(
                matches!(
                    permissions_from_numeric(input),
                    Err(ToolboxError::ValidationError(_))
                ),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_symbolic_to_numeric() {
        assert_eq!(permissions_from_symbolic("rwxr-xr-x").unwrap().numeric, "755");
        assert_eq!(permissions_from_symbolic("-rw-------").unwrap().numeric, "600");
        assert_eq!(permissions_from_symbolic("drwxrwxrwx").unwrap().numeric, "777");
        assert_eq!(permissions_from_symbolic("---------").unwrap().numeric, "000");
    }

    #[test]
    fn test_symbolic_rejects_bad_input() {
        assert!(permissions_from_symbolic("rwx").is_err());
        assert!(permissions_from_symbolic("wrxr-xr-x").is_err());
        assert!(permissions_from_symbolic("rwsr-xr-x").is_err());
    }

    #[test]
    fn test_conversions_agree() {
        for n in ["000", "421", "644", "751", "777"] {
            let mode = permissions_from_numeric(n).unwrap();
            assert_eq!(permissions_from_symbolic(&mode.symbolic).unwrap(), mode);
        }
    }
}
