use std::borrow::Cow;
use validator::ValidationError;

pub mod todo_item;

#[cfg(test)]
pub mod test_util;

/// Custom validator rejecting text which is empty once surrounding whitespace is trimmed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut blank_err = ValidationError::new("blank");
        blank_err.message = Some(Cow::from("must contain at least one non-whitespace character"));
        return Err(blank_err);
    }

    Ok(())
}
