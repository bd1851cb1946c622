//! Opens a URL in a local Chrome window on the machine running the server.
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::error::AppError;

const CHROME_LOCATIONS: [&str; 6] = [
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
];

/// The configured browser if set, otherwise the first known Chrome install that exists.
pub fn locate(configured: Option<&Path>) -> Option<PathBuf> {
    match configured {
        Some(path) => path.exists().then(|| path.to_path_buf()),
        None => CHROME_LOCATIONS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()),
    }
}

pub fn launch(configured: Option<&Path>, url: Option<&str>) -> Result<(), AppError> {
    let url = url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest("URL is required".to_string()))?;

    let browser =
        locate(configured).ok_or_else(|| AppError::NotFound("Chrome not found".to_string()))?;

    Command::new(&browser)
        .arg("--new-window")
        .arg(url)
        .spawn()
        .map_err(|e| AppError::InternalError(e.into()))?;

    info!("Launched {} for {url}", browser.display());
    Ok(())
}
