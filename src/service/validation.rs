use crate::error::{Error, Result};
use crate::types::ALL_TOPICS;

const MAX_TOPIC_KEY_LEN: usize = 64;
const MAX_TOPIC_NAME_LEN: usize = 100;

/// Lowercases the key and turns spaces into underscores.
pub fn normalize_topic_key(key: &str) -> String {
    key.trim().to_lowercase().replace(' ', "_")
}

fn is_valid_key_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
}

/// Validates an already normalized topic key.
pub fn validate_topic_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::Validation("type_key is required".to_string()));
    }
    if key.len() > MAX_TOPIC_KEY_LEN {
        return Err(Error::Validation(format!(
            "type_key cannot exceed {MAX_TOPIC_KEY_LEN} characters"
        )));
    }
    if !key.chars().all(is_valid_key_char) {
        return Err(Error::Validation(
            "type_key can only contain lowercase letters, digits, hyphens, and underscores"
                .to_string(),
        ));
    }
    if key == ALL_TOPICS {
        return Err(Error::Validation(format!(
            "'{ALL_TOPICS}' is reserved as the broadcast target for every subscriber"
        )));
    }
    Ok(())
}

pub fn validate_topic_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("type_name is required".to_string()));
    }
    if name.chars().count() > MAX_TOPIC_NAME_LEN {
        return Err(Error::Validation(format!(
            "type_name cannot exceed {MAX_TOPIC_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Returns the trimmed value, or `None` when it is absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_topic_key() {
        assert_eq!(normalize_topic_key("  Big Sale "), "big_sale");
        assert_eq!(normalize_topic_key("PROMO"), "promo");
        assert_eq!(normalize_topic_key("release-notes"), "release-notes");
    }

    #[test]
    fn test_validate_topic_key() {
        assert!(validate_topic_key("promo").is_ok());
        assert!(validate_topic_key("big_sale-2").is_ok());
        assert!(matches!(validate_topic_key(""), Err(Error::Validation(_))));
        assert!(validate_topic_key("a/b").is_err());
        assert!(validate_topic_key("a.b").is_err());
        assert!(validate_topic_key("café").is_err());
        assert!(validate_topic_key("all").is_err());
        assert!(validate_topic_key(&"k".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_topic_name() {
        assert!(validate_topic_name("Promotions").is_ok());
        assert!(validate_topic_name("").is_err());
        assert!(validate_topic_name(&"n".repeat(101)).is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}
