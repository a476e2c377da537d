//! Pulser aliases.
//!
//! An alias is the only key a pulser is looked up by.

use crate::error::PulsorError;

/// Maximum alias length, in characters, after trimming.
pub const MAX_ALIAS_LENGTH: usize = 32;

/// Validate an alias and return its trimmed form.
///
/// # Errors
///
/// Returns [`PulsorError::InvalidAlias`] if the trimmed alias is empty or too long.
pub fn validate_alias(alias: &str) -> Result<&str, PulsorError> {
    let trimmed = alias.trim();
    if trimmed.is_empty() {
        return Err(PulsorError::InvalidAlias("Alias cannot be empty"));
    }
    if trimmed.chars().count() > MAX_ALIAS_LENGTH {
        return Err(PulsorError::InvalidAlias(
            "Alias cannot be longer than 32 characters",
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_trimmed() {
        assert_eq!(validate_alias("  sidebar:loaded ").unwrap(), "sidebar:loaded");
        assert_eq!(validate_alias("fetch:fragment").unwrap(), "fetch:fragment");
    }

    #[test]
    fn test_alias_empty() {
        assert!(validate_alias("").is_err());
        assert!(validate_alias("   \t\n").is_err());
    }

    #[test]
    fn test_alias_length() {
        let exact = "a".repeat(MAX_ALIAS_LENGTH);
        assert!(validate_alias(&exact).is_ok());

        let long = "a".repeat(MAX_ALIAS_LENGTH + 1);
        assert!(validate_alias(&long).is_err());

        // Surrounding whitespace does not count
        let padded = format!("  {exact}  ");
        assert_eq!(validate_alias(&padded).unwrap(), exact);
    }

    #[test]
    fn test_alias_counts_chars_not_bytes() {
        let accented = "é".repeat(MAX_ALIAS_LENGTH);
        assert!(validate_alias(&accented).is_ok());
    }
}
