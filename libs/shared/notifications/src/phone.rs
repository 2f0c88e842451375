use crate::error::NotificationError;

/// Normalises a phone number into E.164 for the configured country.
///
/// Non-digits are dropped, a single national trunk `0` is removed, and bare
/// 10-digit national numbers get the country code. The result must carry the
/// country prefix, anything else is rejected.
const NATIONAL_DIGITS: usize = 10;

pub fn normalize_phone(raw: &str, country_code: &str) -> Result<String, NotificationError> {
    let mut digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if let Some(stripped) = digits.strip_prefix('0') {
        digits = stripped.to_string();
    }

    if digits.len() == NATIONAL_DIGITS {
        digits = format!("{}{}", country_code, digits);
    }

    let formatted = format!("+{}", digits);
    let expected_prefix = format!("+{}", country_code);

    if digits.len() != country_code.len() + NATIONAL_DIGITS || !formatted.starts_with(&expected_prefix) {
        return Err(NotificationError::InvalidPhone(raw.to_string()));
    }

    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_national_number_with_trunk_zero() {
        assert_eq!(normalize_phone("09876543210", "91").unwrap(), "+919876543210");
    }

    #[test]
    fn test_already_international_is_unchanged() {
        assert_eq!(normalize_phone("+919876543210", "91").unwrap(), "+919876543210");
    }

    #[test]
    fn test_formatting_characters_are_ignored() {
        assert_eq!(normalize_phone("(987) 654-3210", "91").unwrap(), "+919876543210");
        assert_eq!(normalize_phone("+91 98765 43210", "91").unwrap(), "+919876543210");
    }

    #[test]
    fn test_ten_digits_starting_with_country_code_still_prefixed() {
        assert_eq!(normalize_phone("9123456789", "91").unwrap(), "+919123456789");
    }

    #[test]
    fn test_foreign_number_is_rejected() {
        assert_matches!(
            normalize_phone("+1 415 555 0100 1", "91"),
            Err(NotificationError::InvalidPhone(_))
        );
    }

    #[test]
    fn test_empty_is_rejected() {
        assert_matches!(normalize_phone("", "91"), Err(NotificationError::InvalidPhone(_)));
        assert_matches!(normalize_phone("+91", "91"), Err(NotificationError::InvalidPhone(_)));
    }

    #[test]
    fn test_short_number_with_country_code_is_rejected() {
        assert_matches!(normalize_phone("+91 12345", "91"), Err(NotificationError::InvalidPhone(_)));
        assert_matches!(normalize_phone("+91 98765 432101", "91"), Err(NotificationError::InvalidPhone(_)));
    }
}
