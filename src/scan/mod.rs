//! Screenshot-level scanning of the creature detail view.
//!
//! Text fields go crop -> color filter -> cache lookup -> OCR -> correction.
//! Level and nidoran gender are read straight from pixels.

pub mod evolution;
pub mod gender;
pub mod level;
pub mod pipeline;
pub mod regions;
pub mod result;

#[cfg(test)]
pub(crate) mod testing;

pub use evolution::EvolutionCost;
pub use level::LevelArc;
pub use pipeline::{ScanPipeline, ScanSettings};
pub use regions::{PixelRect, ScreenLayout, ScreenRegion};
pub use result::ScanResult;
