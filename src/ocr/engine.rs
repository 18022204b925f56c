use anyhow::{anyhow, bail, Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};

/// Characters Tesseract may emit: Latin letters, digits, the HP separator and
/// the two gender glyphs.
pub const CHAR_WHITELIST: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789/♀♂";

/// Tesseract page segmentation mode 7: treat the image as a single text line.
pub const PSM_SINGLE_LINE: u8 = 7;

/// A stateful text recognizer: load an image, then read its text.
///
/// Every method takes `&mut self`, so one recognizer can only serve one
/// request at a time. After [`release`](Self::release) all calls fail.
pub trait TextRecognizer {
    /// Replaces the image the next [`text`](Self::text) call reads.
    fn set_image(&mut self, image: &RgbaImage) -> Result<()>;

    /// Recognizes the current image.
    fn text(&mut self) -> Result<String>;

    /// Frees the engine. Calling anything afterwards is a programming error.
    fn release(&mut self) -> Result<()>;
}

/// Recognizer backed by the `tesseract` command-line executable.
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata: PathBuf,
    language: String,
    current: Option<NamedTempFile>,
    released: bool,
}

impl TesseractEngine {
    /// Locates Tesseract and its trained data, overriding either location when
    /// a path is given.
    pub fn init(
        executable: Option<&Path>,
        tessdata: Option<&Path>,
        language: &str,
    ) -> Result<Self> {
        let executable = match executable {
            Some(path) => path.to_path_buf(),
            None => find_tesseract_executable()?,
        };
        let tessdata = match tessdata {
            Some(path) => path.to_path_buf(),
            None => find_tessdata_dir(language)?,
        };

        tracing::info!(
            "Tesseract engine ready: {} (tessdata {}, lang {})",
            executable.display(),
            tessdata.display(),
            language
        );

        Ok(Self {
            executable,
            tessdata,
            language: language.to_string(),
            current: None,
            released: false,
        })
    }

    fn ensure_live(&self) -> Result<()> {
        if self.released {
            tracing::error!("Tesseract engine used after release");
            bail!("Tesseract engine has been released");
        }
        Ok(())
    }
}

impl TextRecognizer for TesseractEngine {
    fn set_image(&mut self, image: &RgbaImage) -> Result<()> {
        self.ensure_live()?;

        let file = NamedTempFile::with_suffix(".png")?;
        image
            .save(file.path())
            .context("Failed to write OCR input image")?;
        self.current = Some(file);
        Ok(())
    }

    fn text(&mut self) -> Result<String> {
        self.ensure_live()?;
        let input = self
            .current
            .as_ref()
            .ok_or_else(|| anyhow!("No image set before text recognition"))?;

        let output = Command::new(&self.executable)
            .arg(input.path())
            .arg("stdout")
            .arg("--tessdata-dir")
            .arg(&self.tessdata)
            .arg("-l")
            .arg(&self.language)
            .arg("--psm")
            .arg(PSM_SINGLE_LINE.to_string())
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", CHAR_WHITELIST))
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn release(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.current = None;
        self.released = true;
        tracing::info!("Tesseract engine released");
        Ok(())
    }
}
