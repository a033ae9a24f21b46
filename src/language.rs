//! OCR language codes
//!
//! Codes follow Tesseract's three-letter traineddata names. Two-letter
//! ISO 639-1 codes are accepted as aliases when parsing.

use crate::error::NotesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Language {
    #[default]
    #[serde(rename = "eng")]
    English,
    #[serde(rename = "hin")]
    Hindi,
    #[serde(rename = "tam")]
    Tamil,
    #[serde(rename = "tel")]
    Telugu,
    #[serde(rename = "ben")]
    Bengali,
    #[serde(rename = "mar")]
    Marathi,
    #[serde(rename = "kan")]
    Kannada,
    #[serde(rename = "mal")]
    Malayalam,
    #[serde(rename = "guj")]
    Gujarati,
    #[serde(rename = "pan")]
    Punjabi,
    #[serde(rename = "urd")]
    Urdu,
    #[serde(rename = "fra")]
    French,
    #[serde(rename = "deu")]
    German,
    #[serde(rename = "spa")]
    Spanish,
}

impl Language {
    pub const ALL: [Language; 14] = [
        Language::English,
        Language::Hindi,
        Language::Tamil,
        Language::Telugu,
        Language::Bengali,
        Language::Marathi,
        Language::Kannada,
        Language::Malayalam,
        Language::Gujarati,
        Language::Punjabi,
        Language::Urdu,
        Language::French,
        Language::German,
        Language::Spanish,
    ];

    /// Tesseract traineddata name
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Hindi => "hin",
            Self::Tamil => "tam",
            Self::Telugu => "tel",
            Self::Bengali => "ben",
            Self::Marathi => "mar",
            Self::Kannada => "kan",
            Self::Malayalam => "mal",
            Self::Gujarati => "guj",
            Self::Punjabi => "pan",
            Self::Urdu => "urd",
            Self::French => "fra",
            Self::German => "deu",
            Self::Spanish => "spa",
        }
    }

    fn iso_639_1(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Hindi => "hi",
            Self::Tamil => "ta",
            Self::Telugu => "te",
            Self::Bengali => "bn",
            Self::Marathi => "mr",
            Self::Kannada => "kn",
            Self::Malayalam => "ml",
            Self::Gujarati => "gu",
            Self::Punjabi => "pa",
            Self::Urdu => "ur",
            Self::French => "fr",
            Self::German => "de",
            Self::Spanish => "es",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Tamil => "Tamil",
            Self::Telugu => "Telugu",
            Self::Bengali => "Bengali",
            Self::Marathi => "Marathi",
            Self::Kannada => "Kannada",
            Self::Malayalam => "Malayalam",
            Self::Gujarati => "Gujarati",
            Self::Punjabi => "Punjabi",
            Self::Urdu => "Urdu",
            Self::French => "French",
            Self::German => "German",
            Self::Spanish => "Spanish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = NotesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == wanted || lang.iso_639_1() == wanted)
            .ok_or_else(|| {
                NotesError::Validation(format!(
                    "unsupported language code '{}' (expected one of: {})",
                    s,
                    Language::ALL.map(|l| l.code()).join(", ")
                ))
            })
    }
}
