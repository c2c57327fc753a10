//! Headless browser printing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Prints HTML pages to PDF. One instance serves one batch.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>>;

    /// Release the underlying engine. Safe to call when nothing was started.
    async fn close(&self);
}

/// Creates a renderer session for a batch.
///
/// `scratch_dir` lives inside the batch workspace and is removed with it.
pub trait RendererFactory: Send + Sync {
    fn session(&self, scratch_dir: &Path) -> Box<dyn PageRenderer>;
}

#[derive(Debug, Clone, Default)]
pub struct ChromiumRendererFactory {
    executable: Option<PathBuf>,
}

impl ChromiumRendererFactory {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }
}

impl RendererFactory for ChromiumRendererFactory {
    fn session(&self, scratch_dir: &Path) -> Box<dyn PageRenderer> {
        Box::new(ChromiumRenderer {
            executable: self.executable.clone(),
            profile_dir: scratch_dir.join("chromium-profile"),
            browser: Mutex::new(None),
        })
    }
}

struct LaunchedBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Launches Chromium on first use and reuses it for every page of the batch.
pub struct ChromiumRenderer {
    executable: Option<PathBuf>,
    profile_dir: PathBuf,
    browser: Mutex<Option<LaunchedBrowser>>,
}

impl ChromiumRenderer {
    async fn launch(&self) -> Result<LaunchedBrowser> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .user_data_dir(&self.profile_dir);
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid browser configuration: {}", e))?;

        tracing::info!(profile = %self.profile_dir.display(), "Launching headless browser");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("Failed to launch browser")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(LaunchedBrowser { browser, handler })
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            *guard = Some(self.launch().await?);
        }
        let launched = guard
            .as_ref()
            .context("browser not available after launch")?;

        let page = launched
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to open page")?;

        let printed = async {
            page.set_content(html).await?;
            page.pdf(PrintToPdfParams {
                print_background: Some(true),
                prefer_css_page_size: Some(true),
                ..Default::default()
            })
            .await
        }
        .await;

        if let Err(e) = page.close().await {
            tracing::debug!(error = %e, "Failed to close page");
        }

        printed.context("Failed to print page to PDF")
    }

    async fn close(&self) {
        let Some(mut launched) = self.browser.lock().await.take() else {
            return;
        };

        if let Err(e) = launched.browser.close().await {
            tracing::warn!(error = %e, "Failed to close browser");
        }
        if let Err(e) = launched.browser.wait().await {
            tracing::warn!(error = %e, "Failed to wait for browser exit");
        }
        launched.handler.abort();
        tracing::debug!("Headless browser closed");
    }
}
