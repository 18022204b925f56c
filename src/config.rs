//! Scanner configuration.
//!
//! Loaded from a JSON file at startup. Every field has a default so a partial
//! or missing file still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ocr::cache::DEFAULT_CAPACITY;
use crate::scan::ScanSettings;

/// UI languages whose candy label puts the candy word before the species.
const CANDY_WORD_FIRST_LANGUAGES: &[&str] = &["fr", "es", "it"];

/// Complete scanner configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Reference screenshot width; taken from the first screenshot when unset
    pub screen_width: Option<u32>,
    /// Reference screenshot height; taken from the first screenshot when unset
    pub screen_height: Option<u32>,
    /// Name reported for a female nidoran
    pub nidoran_female: String,
    /// Name reported for a male nidoran
    pub nidoran_male: String,
    /// Read the candy amount label too
    pub candy_amount_enabled: bool,
    /// Game UI language (ISO 639-1)
    pub language: String,
    /// Overrides the language-based candy word order
    pub candy_word_first: Option<bool>,
    /// Tesseract language tag
    pub ocr_language: String,
    /// Trained data directory override
    pub tessdata_dir: Option<PathBuf>,
    /// Tesseract executable override
    pub tesseract_path: Option<PathBuf>,
    /// Number of recognized strings kept across scans
    pub cache_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            screen_width: None,
            screen_height: None,
            nidoran_female: "Nidoran♀".to_string(),
            nidoran_male: "Nidoran♂".to_string(),
            candy_amount_enabled: false,
            language: "en".to_string(),
            candy_word_first: None,
            ocr_language: "eng".to_string(),
            tessdata_dir: None,
            tesseract_path: None,
            cache_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// True if candy labels in `language` read "<candy> <species>".
pub fn is_candy_word_first(language: &str) -> bool {
    let code = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    CANDY_WORD_FIRST_LANGUAGES.contains(&code.as_str())
}

impl ScannerConfig {
    pub fn candy_word_first(&self) -> bool {
        self.candy_word_first
            .unwrap_or_else(|| is_candy_word_first(&self.language))
    }

    /// Builds pipeline settings. `fallback_size` is used when the config does
    /// not pin a screen size.
    pub fn scan_settings(&self, fallback_size: (u32, u32)) -> ScanSettings {
        ScanSettings {
            width: self.screen_width.unwrap_or(fallback_size.0),
            height: self.screen_height.unwrap_or(fallback_size.1),
            nidoran_female: self.nidoran_female.clone(),
            nidoran_male: self.nidoran_male.clone(),
            candy_amount_enabled: self.candy_amount_enabled,
            candy_word_first: self.candy_word_first(),
            cache_capacity: self.cache_capacity,
        }
    }
}

/// Loads configuration from `path`, or returns defaults when the file is
/// missing or invalid.
pub fn load_config(path: &Path) -> ScannerConfig {
    tracing::info!("Looking for config at: {}", path.display());

    if !path.exists() {
        tracing::info!("{} not found. Using default config.", path.display());
        return ScannerConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Config loaded from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                ScannerConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
            ScannerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_candy_word_order_by_language() {
        assert!(is_candy_word_first("fr"));
        assert!(is_candy_word_first("es-MX"));
        assert!(is_candy_word_first("it_IT"));
        assert!(!is_candy_word_first("en"));
        assert!(!is_candy_word_first("de"));
        assert!(!is_candy_word_first(""));
    }

    #[test]
    fn test_explicit_override_wins() {
        let config = ScannerConfig {
            language: "fr".to_string(),
            candy_word_first: Some(false),
            ..Default::default()
        };
        assert!(!config.candy_word_first());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "language": "es", "candy_amount_enabled": true }"#).unwrap();

        let config = load_config(&path);
        assert!(config.candy_amount_enabled);
        assert!(config.candy_word_first());
        assert_eq!(config.ocr_language, "eng");
        assert_eq!(config.cache_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_invalid_or_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(load_config(&path).language, "en");

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path).nidoran_male, "Nidoran♂");
    }

    #[test]
    fn test_scan_settings_size() {
        let mut config = ScannerConfig::default();
        let settings = config.scan_settings((720, 1280));
        assert_eq!((settings.width, settings.height), (720, 1280));

        config.screen_width = Some(1080);
        config.screen_height = Some(1920);
        let settings = config.scan_settings((720, 1280));
        assert_eq!((settings.width, settings.height), (1080, 1920));
    }
}
