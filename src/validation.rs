//! Client-side input checks run before hitting the API.
//!
//! The backend stays authoritative; these only catch obvious mistakes early.

use thiserror::Error;

pub const DISPLAY_NAME_MIN: usize = 2;
pub const DISPLAY_NAME_MAX: usize = 50;
pub const MESSAGE_MIN: usize = 1;
pub const MESSAGE_MAX: usize = 1000;
pub const PROMPT_MIN: usize = 5;
pub const PROMPT_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Display name must be between 2 and 50 characters.")]
    DisplayNameLength,
    #[error("Display name may only contain letters, digits and spaces.")]
    DisplayNameCharacters,
    #[error("Message cannot be empty.")]
    MessageTooShort,
    #[error("Message cannot exceed 1000 characters.")]
    MessageTooLong,
    #[error("Question must be at least 5 characters.")]
    PromptTooShort,
    #[error("Question cannot exceed 200 characters.")]
    PromptTooLong,
}

pub fn validate_display_name(name: &str) -> Result<(), InputError> {
    let len = name.chars().count();
    if !(DISPLAY_NAME_MIN..=DISPLAY_NAME_MAX).contains(&len) {
        return Err(InputError::DisplayNameLength);
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ') {
        return Err(InputError::DisplayNameCharacters);
    }
    Ok(())
}

pub fn validate_message(content: &str) -> Result<(), InputError> {
    let len = content.trim().chars().count();
    if len < MESSAGE_MIN {
        Err(InputError::MessageTooShort)
    } else if len > MESSAGE_MAX {
        Err(InputError::MessageTooLong)
    } else {
        Ok(())
    }
}

pub fn validate_prompt(text: &str) -> Result<(), InputError> {
    let len = text.trim().chars().count();
    if len < PROMPT_MIN {
        Err(InputError::PromptTooShort)
    } else if len > PROMPT_MAX {
        Err(InputError::PromptTooLong)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_bounds() {
        assert_eq!(validate_display_name("a"), Err(InputError::DisplayNameLength));
        assert!(validate_display_name("ab").is_ok());
        assert!(validate_display_name(&"x".repeat(50)).is_ok());
        assert_eq!(validate_display_name(&"x".repeat(51)), Err(InputError::DisplayNameLength));
    }

    #[test]
    fn test_display_name_characters() {
        assert!(validate_display_name("Jane Doe 2").is_ok());
        assert_eq!(validate_display_name("jane_doe"), Err(InputError::DisplayNameCharacters));
        assert_eq!(validate_display_name("zoë"), Err(InputError::DisplayNameCharacters));
    }

    #[test]
    fn test_message_bounds() {
        assert_eq!(validate_message("   "), Err(InputError::MessageTooShort));
        assert!(validate_message("x").is_ok());
        assert!(validate_message(&"é".repeat(1000)).is_ok());
        assert_eq!(validate_message(&"x".repeat(1001)), Err(InputError::MessageTooLong));
    }

    #[test]
    fn test_prompt_bounds() {
        assert_eq!(validate_prompt("why?"), Err(InputError::PromptTooShort));
        assert!(validate_prompt("why me?").is_ok());
        assert!(validate_prompt(&"q".repeat(200)).is_ok());
        assert_eq!(validate_prompt(&"q".repeat(201)), Err(InputError::PromptTooLong));
    }

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            InputError::DisplayNameLength.to_string(),
            "Display name must be between 2 and 50 characters."
        );
    }
}
