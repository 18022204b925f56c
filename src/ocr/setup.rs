use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::paths;

const TESSDATA_REPO: &str = "https://github.com/tesseract-ocr/tessdata/raw/main";

const COMMON_EXECUTABLES: &[&str] = &[
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
];

const COMMON_TESSDATA_DIRS: &[&str] = &[
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4.00/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    "/opt/homebrew/share/tessdata",
    r"C:\Program Files\Tesseract-OCR\tessdata",
    r"C:\Program Files (x86)\Tesseract-OCR\tessdata",
];

fn traineddata_name(language: &str) -> String {
    format!("{}.traineddata", language)
}

fn has_traineddata(dir: &Path, language: &str) -> bool {
    dir.join(traineddata_name(language)).exists()
}

/// Makes sure `<language>.traineddata` is available, downloading it into the
/// per-user tessdata directory when no other copy is found.
pub fn ensure_tessdata(language: &str) -> Result<PathBuf> {
    if let Ok(dir) = find_tessdata_dir(language) {
        tracing::info!("Trained data for '{}' found at: {}", language, dir.display());
        return Ok(dir);
    }

    let tessdata_dir = paths::get_tessdata_dir();
    fs::create_dir_all(&tessdata_dir)
        .with_context(|| format!("Failed to create {}", tessdata_dir.display()))?;
    download_tessdata(&tessdata_dir, language)?;

    Ok(tessdata_dir)
}

/// Downloads trained data for one language from the tessdata repository.
fn download_tessdata(tessdata_dir: &Path, language: &str) -> Result<()> {
    let file_name = traineddata_name(language);
    let url = format!("{}/{}", TESSDATA_REPO, file_name);
    let target = tessdata_dir.join(&file_name);

    tracing::info!("Downloading {}...", file_name);

    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let response = client
        .get(&url)
        .header("User-Agent", "pogo-scan")
        .send()?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "Failed to download {}: HTTP {}",
            file_name,
            response.status()
        ));
    }

    let bytes = response.bytes()?;
    let mut file = fs::File::create(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;
    file.write_all(&bytes)?;

    tracing::info!("Downloaded {} ({} bytes)", file_name, bytes.len());

    Ok(())
}

/// Finds the Tesseract executable on `PATH` or in a common install location.
pub fn find_tesseract_executable() -> Result<PathBuf> {
    if let Ok(output) = std::process::Command::new("tesseract")
        .arg("--version")
        .output()
    {
        if output.status.success() {
            return Ok(PathBuf::from("tesseract"));
        }
    }

    COMMON_EXECUTABLES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .ok_or_else(|| anyhow!("Tesseract not found. Please install Tesseract-OCR."))
}

/// Finds a tessdata directory holding trained data for `language`.
///
/// Search order: the per-user data directory, `TESSDATA_PREFIX` (with and
/// without a trailing `tessdata`), then common system locations.
pub fn find_tessdata_dir(language: &str) -> Result<PathBuf> {
    let local = paths::get_tessdata_dir();
    if has_traineddata(&local, language) {
        return Ok(local);
    }

    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        let p = PathBuf::from(&prefix);
        if has_traineddata(&p, language) {
            return Ok(p);
        }
        let p = p.join("tessdata");
        if has_traineddata(&p, language) {
            return Ok(p);
        }
    }

    COMMON_TESSDATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|p| has_traineddata(p, language))
        .ok_or_else(|| {
            anyhow!(
                "tessdata directory not found. Please ensure {} is available (try `pogo-scan setup`).",
                traineddata_name(language)
            )
        })
}
