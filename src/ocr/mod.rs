pub mod cache;
pub mod correct;
pub mod engine;
pub mod preprocess;
pub mod setup;

pub use cache::ResultCache;
pub use correct::{letters_to_nums, nums_to_letters};
pub use engine::{TesseractEngine, TextRecognizer};
pub use preprocess::{hash_image, is_only_white, ColorFilter};
pub use setup::ensure_tessdata;
