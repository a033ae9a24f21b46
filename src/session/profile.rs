use crate::error::NotesError;
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// User profile; `language` is the preferred OCR language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub language: Language,
}

impl Profile {
    pub fn with_language(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    /// Update one field by name. Fails without modifying the profile if the
    /// field is unknown or the language code is unsupported.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), NotesError> {
        match field {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "language" => self.language = value.parse()?,
            other => {
                return Err(NotesError::Validation(format!(
                    "unknown profile field '{}'",
                    other
                )))
            }
        }
        Ok(())
    }
}
