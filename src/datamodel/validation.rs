use thiserror::Error;

pub const MAX_METRIC_TYPE_LABEL_LENGTH: usize = 200;
pub const MAX_SLUG_LENGTH: usize = 75;
pub const MAX_LABEL_LENGTH: usize = 75;
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A field value that the schema would reject.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Lengths are counted in characters, like a VARCHAR column.
pub fn check_max_length(
    field: &'static str,
    value: &str,
    max_length: usize,
) -> Result<(), ValidationError> {
    let length = value.chars().count();
    if length > max_length {
        return Err(ValidationError::new(
            field,
            format!("{} characters, at most {} allowed", length, max_length),
        ));
    }
    Ok(())
}

pub fn check_not_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub fn check_slug(slug: &str) -> Result<(), ValidationError> {
    check_not_empty("slug", slug)?;
    check_max_length("slug", slug, MAX_SLUG_LENGTH)?;
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new(
            "slug",
            "only ASCII letters, digits, '-' and '_' are allowed",
        ));
    }
    Ok(())
}

pub fn check_label(label: &str) -> Result<(), ValidationError> {
    check_not_empty("label", label)?;
    check_max_length("label", label, MAX_LABEL_LENGTH)
}

pub fn check_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(description) => check_max_length("description", description, MAX_DESCRIPTION_LENGTH),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_slug() {
        assert!(check_slug("users").is_ok());
        assert!(check_slug("daily-active_users2").is_ok());
        assert_eq!(check_slug("").unwrap_err().field, "slug");
        assert!(check_slug("has space").is_err());
        assert!(check_slug(&"a".repeat(75)).is_ok());
        assert!(check_slug(&"a".repeat(76)).is_err());
    }

    #[test]
    fn test_check_label() {
        assert!(check_label("Users").is_ok());
        assert!(check_label("   ").is_err());
        let err = check_label(&"é".repeat(76)).unwrap_err();
        assert_eq!(err.to_string(), "Invalid label: 76 characters, at most 75 allowed");
    }

    #[test]
    fn test_check_description() {
        assert!(check_description(None).is_ok());
        assert!(check_description(Some("")).is_ok());
        assert!(check_description(Some(&"x".repeat(501))).is_err());
    }
}
