use thiserror::Error;

pub const MAX_LABEL_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name must not be empty")]
    Empty,
    #[error("name must be at most {MAX_LABEL_CHARS} characters")]
    TooLong,
    #[error("name contains invalid character {character:?}")]
    InvalidCharacter { character: char },
}

/// Checks a node label after trimming. Slashes and control characters are rejected.
pub fn validate_label(label: &str) -> Result<(), NameError> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(NameError::Empty);
    }

    if trimmed.chars().count() > MAX_LABEL_CHARS {
        return Err(NameError::TooLong);
    }

    if let Some(character) = trimmed
        .chars()
        .find(|character| character.is_control() || *character == '/' || *character == '\\')
    {
        return Err(NameError::InvalidCharacter { character });
    }

    Ok(())
}

/// Key used to compare sibling labels: trimmed, case-folded.
pub fn sibling_key(label: &str) -> String {
    label.trim().to_lowercase()
}
