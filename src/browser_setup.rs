//! Chromium discovery and launch for the scraping backend

use anyhow::{Context, Result};
use chromiumoxide::Handler;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, trace, warn};

use crate::config::ScraperConfig;
use crate::utils::constants::CHROME_USER_AGENT;

/// Environment variable pointing at a Chrome/Chromium binary
pub const CHROMIUM_PATH_ENV: &str = "CHROMIUM_PATH";

/// Platform install locations checked after `CHROMIUM_PATH`
fn candidate_paths() -> Vec<PathBuf> {
    if cfg!(target_os = "windows") {
        let mut roots: Vec<PathBuf> = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|var| std::env::var_os(var).map(PathBuf::from))
            .collect();
        roots.push(PathBuf::from(r"C:\Program Files"));
        roots
            .into_iter()
            .flat_map(|root| {
                [
                    root.join(r"Google\Chrome\Application\chrome.exe"),
                    root.join(r"Chromium\Application\chrome.exe"),
                ]
            })
            .collect()
    } else if cfg!(target_os = "macos") {
        let mut paths: Vec<PathBuf> = [
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
            paths.push(home.join("Applications/Chromium.app/Contents/MacOS/Chromium"));
        }
        paths
    } else {
        [
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
        .iter()
        .map(PathBuf::from)
        .collect()
    }
}

/// Find a Chrome/Chromium executable on this machine
///
/// Order: `CHROMIUM_PATH`, well-known install paths, then `which` on Unix.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CHROMIUM_PATH_ENV).map(PathBuf::from) {
        if path.exists() {
            info!("Using browser from {}: {}", CHROMIUM_PATH_ENV, path.display());
            return Ok(path);
        }
        warn!(
            "{} points to non-existent file: {}",
            CHROMIUM_PATH_ENV,
            path.display()
        );
    }

    if let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) {
        info!("Found browser at: {}", path.display());
        return Ok(path);
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which': {}", found);
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Download a managed Chromium build into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("kodegen")
        .join("searxng")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create browser cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!("Downloaded Chromium to: {}", revision.folder_path.display());

    Ok(revision.executable_path)
}

/// Chromium command-line flags derived from the scraper configuration
#[must_use]
pub fn launch_args(config: &ScraperConfig) -> Vec<String> {
    let mut args = vec![
        format!("--user-agent={CHROME_USER_AGENT}"),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-notifications".to_string(),
        "--disable-extensions".to_string(),
        "--disable-popup-blocking".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-breakpad".to_string(),
        "--disable-hang-monitor".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--no-sandbox".to_string(),
        "--password-store=basic".to_string(),
        "--use-mock-keychain".to_string(),
        "--hide-scrollbars".to_string(),
        "--mute-audio".to_string(),
    ];

    if config.ignore_https_errors() {
        args.push("--ignore-certificate-errors".to_string());
    }
    if !config.enable_gpu() {
        args.push("--disable-gpu".to_string());
        args.push("--disable-software-rasterizer".to_string());
    }
    if config.block_resources() {
        args.push("--blink-settings=imagesEnabled=false".to_string());
        args.push("--disable-remote-fonts".to_string());
    }

    args
}

/// Find or download Chromium and launch it with the scraper configuration
///
/// Returns the browser, its tracked CDP handler task and the profile
/// directory, which must be removed after the browser exits.
pub async fn launch_browser(config: &ScraperConfig) -> Result<(Browser, JoinHandle<()>, PathBuf)> {
    let chrome_path = match find_browser_executable() {
        Ok(path) => path,
        Err(e) => {
            warn!("{}. Falling back to managed download.", e);
            download_managed_browser().await?
        }
    };

    let user_data_dir =
        std::env::temp_dir().join(format!("kodegen_searxng_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let (browser, mut handler) = match start_browser(config, chrome_path, &user_data_dir).await {
        Ok(launched) => launched,
        Err(e) => {
            discard_profile_dir(&user_data_dir);
            return Err(e);
        }
    };

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // chromiumoxide cannot deserialize some newer CDP events; those are noise
                if message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response")
                {
                    trace!("Suppressed benign CDP serialization error: {}", message);
                } else {
                    error!("Browser handler error: {:?}", e);
                }
            }
        }
        info!("Browser event handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}

/// Build the launch configuration and start the browser process
async fn start_browser(
    config: &ScraperConfig,
    chrome_path: PathBuf,
    user_data_dir: &Path,
) -> Result<(Browser, Handler)> {
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.to_path_buf())
        .chrome_executable(chrome_path);

    builder = if config.headless() {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    for arg in launch_args(config) {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching browser (headless: {})", config.headless());
    Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")
}

/// Remove a profile directory left behind by a launch that never produced a browser
fn discard_profile_dir(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed unused browser profile {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "Failed to remove browser profile {}: {}. Manual cleanup may be required.",
            path.display(),
            e
        ),
    }
}
