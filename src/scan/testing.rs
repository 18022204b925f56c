//! In-memory recognizer for tests.

use anyhow::{anyhow, bail, Result};
use image::RgbaImage;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ocr::engine::TextRecognizer;

/// Returns scripted answers in order and records every image it was given.
pub struct ScriptedRecognizer {
    answers: VecDeque<String>,
    images: Vec<RgbaImage>,
    calls: usize,
    released: Arc<AtomicBool>,
}

impl ScriptedRecognizer {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            images: Vec::new(),
            calls: 0,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of `text` calls served.
    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn last_image(&self) -> Option<&RgbaImage> {
        self.images.last()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Shared release flag, still readable after the recognizer has been
    /// moved into a pipeline or a worker.
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl TextRecognizer for ScriptedRecognizer {
    fn set_image(&mut self, image: &RgbaImage) -> Result<()> {
        if self.is_released() {
            bail!("recognizer released");
        }
        self.images.push(image.clone());
        Ok(())
    }

    fn text(&mut self) -> Result<String> {
        if self.is_released() {
            bail!("recognizer released");
        }
        self.calls += 1;
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("no scripted answer left for call {}", self.calls))
    }

    fn release(&mut self) -> Result<()> {
        if self.released.swap(true, Ordering::SeqCst) {
            bail!("recognizer already released");
        }
        Ok(())
    }
}
