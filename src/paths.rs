use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the per-user data directory: `<local data dir>/pogo-scan/`
pub fn get_data_dir() -> &'static PathBuf {
    DATA_DIR.get_or_init(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pogo-scan")
    })
}

/// Returns the logs directory: `<data dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Returns the downloaded trained data directory: `<data dir>/tessdata/`
pub fn get_tessdata_dir() -> PathBuf {
    get_data_dir().join("tessdata")
}

/// Returns the default config path: `config.json` next to the executable.
pub fn get_default_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("config.json")))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}
