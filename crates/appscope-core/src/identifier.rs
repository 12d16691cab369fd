use crate::error::AppError;

/// Longest identifier accepted.
pub const MAX_IDENTIFIER_LEN: usize = 150;

/// Basic shape check for a storefront package identifier.
///
/// Accepts reverse-DNS names such as `com.example.app`: at least two
/// dot-separated segments, each starting with an ASCII letter and made of
/// ASCII letters, digits, or underscores. Surrounding whitespace is trimmed
/// and the trimmed form is returned.
pub fn validate(raw: &str) -> Result<String, AppError> {
    let id = raw.trim();

    if id.is_empty() {
        return Err(AppError::InvalidInput("package name is required".into()));
    }
    if id.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::InvalidInput(format!(
            "package name longer than {MAX_IDENTIFIER_LEN} characters"
        )));
    }
    if let Some(c) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.'))
    {
        return Err(AppError::InvalidInput(format!(
            "invalid character '{c}' in package name"
        )));
    }

    let segments: Vec<&str> = id.split('.').collect();
    if segments.len() < 2 {
        return Err(AppError::InvalidInput(
            "invalid package format (use com.example.app)".into(),
        ));
    }
    if segments
        .iter()
        .any(|s| !s.chars().next().is_some_and(|c| c.is_ascii_alphabetic()))
    {
        return Err(AppError::InvalidInput(
            "each package segment must start with a letter".into(),
        ));
    }

    Ok(id.to_string())
}
