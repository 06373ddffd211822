//! Bounded single-line text used for group names and idea/project titles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum length of a title or group name, in characters.
pub const TITLE_MAX: usize = 256;

/// Validation failure for [`Title`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleError {
    Empty,
    TooLong { max: usize },
}

impl TitleError {
    /// Machine-readable rule identifier.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::TooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for TitleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "must not be empty"),
            Self::TooLong { max } => write!(f, "must be at most {max} characters"),
        }
    }
}

impl std::error::Error for TitleError {}

/// Trimmed, non-empty text of at most [`TITLE_MAX`] characters.
///
/// # Examples
/// ```
/// use ideahub::domain::Title;
///
/// assert_eq!(Title::new("  Eng ").unwrap().as_ref(), "Eng");
/// assert!(Title::new(" ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Validate and construct a title.
    ///
    /// # Errors
    /// Returns [`TitleError`] for blank or over-long input.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, TitleError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TitleError::Empty);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(TitleError::TooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Title> for String {
    fn from(value: Title) -> Self {
        value.0
    }
}

impl TryFrom<String> for Title {
    type Error = TitleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_lengths() {
        assert!(Title::new("é".repeat(TITLE_MAX)).is_ok());
        assert_eq!(
            Title::new("x".repeat(TITLE_MAX + 1)),
            Err(TitleError::TooLong { max: TITLE_MAX })
        );
    }
}
