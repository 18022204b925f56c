//! Pokémon GO creature detail screenshot scanner.
//!
//! Reads species name, candy name, HP, CP, candy amount, evolution cost and
//! level from one screenshot using proportional crops, color filtering,
//! Tesseract and a set of empirically tuned corrections.

pub mod batch;
pub mod config;
pub mod ocr;
pub mod paths;
pub mod preview;
pub mod scan;

pub use config::{load_config, ScannerConfig};
pub use ocr::{TesseractEngine, TextRecognizer};
pub use scan::{EvolutionCost, ScanPipeline, ScanResult, ScanSettings};
