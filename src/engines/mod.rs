//! OCR engine implementations
//!
//! This module contains implementations of the OcrEngine trait for different
//! OCR backends. Engines are conditionally compiled based on feature flags.

#[cfg(any(feature = "engine-ocrs", feature = "engine-tesseract"))]
mod download;

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;

use crate::config::EngineConfig;
use crate::engine::OcrEngine;
use crate::error::NotesError;
use std::sync::Arc;

/// Names of the engines compiled into this build, in preference order
pub fn compiled_engines() -> Vec<&'static str> {
    let mut names = Vec::new();
    #[cfg(feature = "engine-ocrs")]
    names.push("ocrs");
    #[cfg(feature = "engine-tesseract")]
    names.push("tesseract");
    names
}

/// Registry of initialized OCR engines
pub struct EngineRegistry {
    engines: Vec<Arc<dyn OcrEngine>>,
    default_engine: String,
}

impl EngineRegistry {
    /// Initialize the requested engine, or every compiled engine when none is named
    pub fn new(config: &EngineConfig) -> Result<Self, NotesError> {
        let available = compiled_engines();
        if available.is_empty() {
            return Err(NotesError::Initialization(
                "No OCR engines available. Build with --features engine-ocrs or --features engine-tesseract".to_string()
            ));
        }

        let wanted: Vec<&str> = match config.name.as_deref() {
            Some(name) if available.contains(&name) => vec![name],
            Some(name) => {
                return Err(NotesError::Initialization(format!(
                    "OCR engine '{}' is not available (compiled: {})",
                    name,
                    available.join(", ")
                )))
            }
            None => available,
        };

        let mut engines: Vec<Arc<dyn OcrEngine>> = Vec::new();
        for name in &wanted {
            tracing::info!("Initializing {} engine...", name);
            engines.push(init_engine(name, config)?);
        }

        Ok(Self {
            engines,
            default_engine: wanted[0].to_string(),
        })
    }

    /// Build a registry around already-constructed engines; the first is the default
    pub fn from_engines(engines: Vec<Arc<dyn OcrEngine>>) -> Result<Self, NotesError> {
        let default_engine = engines
            .first()
            .map(|e| e.name().to_string())
            .ok_or_else(|| NotesError::Initialization("No OCR engines given".to_string()))?;
        Ok(Self {
            engines,
            default_engine,
        })
    }

    /// Get an engine by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.iter().find(|e| e.name() == name).cloned()
    }

    /// Get the default engine
    pub fn default_engine(&self) -> Arc<dyn OcrEngine> {
        // Construction guarantees at least one engine
        self.get(&self.default_engine)
            .unwrap_or_else(|| self.engines[0].clone())
    }

    /// List all initialized engine names
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }
}

#[allow(unused_variables)]
fn init_engine(name: &str, config: &EngineConfig) -> Result<Arc<dyn OcrEngine>, NotesError> {
    match name {
        #[cfg(feature = "engine-ocrs")]
        "ocrs" => Ok(Arc::new(ocrs::OcrsEngine::new(config)?)),
        #[cfg(feature = "engine-tesseract")]
        "tesseract" => Ok(Arc::new(tesseract::TesseractEngine::new(config)?)),
        other => Err(NotesError::Initialization(format!(
            "Unknown OCR engine '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use image::DynamicImage;

    struct Named(&'static str);

    impl OcrEngine for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "named stub"
        }

        fn recognize(&self, _: &DynamicImage, _: Language) -> Result<Vec<String>, NotesError> {
            Ok(vec![])
        }

        fn supported_languages(&self) -> Vec<Language> {
            vec![Language::English]
        }
    }

    #[test]
    fn test_from_engines_first_is_default() {
        let registry =
            EngineRegistry::from_engines(vec![Arc::new(Named("a")), Arc::new(Named("b"))])
                .unwrap();
        assert_eq!(registry.default_engine().name(), "a");
        assert_eq!(registry.list(), vec!["a", "b"]);
        assert!(registry.get("b").is_some());
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn test_from_engines_rejects_empty() {
        assert!(EngineRegistry::from_engines(vec![]).is_err());
    }

    #[test]
    fn test_unknown_engine_name_rejected() {
        let config = EngineConfig {
            name: Some("no-such-engine".to_string()),
            tessdata_path: None,
        };
        assert!(matches!(
            EngineRegistry::new(&config),
            Err(NotesError::Initialization(_))
        ));
    }

    #[test]
    fn test_check_language() {
        let engine = Named("a");
        assert!(engine.check_language(Language::English).is_ok());
        assert!(matches!(
            engine.check_language(Language::Tamil),
            Err(NotesError::OcrFailure { .. })
        ));
    }
}
