use std::time::{Duration, Instant};

use chromiumoxide::browser::{Browser, BrowserConfigBuilder};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::auth::AuthSession;
use crate::error::{Error, Result};
use crate::page::{fingerprint, CrawledPage};

/// Owns the single OS-level browser process shared by every worker. Each
/// worker opens its own `Page` (a fresh tab/context) against it so that
/// cookies set for one authenticated crawl can be replayed without the
/// workers stepping on each other's navigation state.
pub struct BrowserHandle {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserHandle {
    pub async fn launch(headless: bool) -> Result<Self> {
        let mut builder = BrowserConfigBuilder::default();
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(|e| Error::Launch(e.to_string()))?;
        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| Error::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser handler event error");
                }
            }
        });
        Ok(Self { browser, handler_task })
    }

    /// Opens a fresh page and, if an authenticated session was established,
    /// replays its cookies onto it before any navigation happens.
    pub async fn new_worker_page(&self, auth: Option<&AuthSession>) -> Result<Page> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| Error::Launch(e.to_string()))?;
        if let Some(session) = auth {
            for cookie in &session.cookies {
                if let Err(e) = page.evaluate(format!("document.cookie = {cookie:?};")).await {
                    tracing::warn!(error = %e, "failed to replay cookie onto worker page");
                }
            }
        }
        Ok(page)
    }

    pub async fn shutdown(self) {
        self.handler_task.abort();
        let _ = self.handler_task.await;
    }
}

/// Navigates to `url`, waits for the network-idle navigation event, then
/// dwells briefly so single-page-application hydration has a chance to
/// finish before extraction, and finally pulls HTML, screenshot, and
/// outbound links.
#[tracing::instrument(skip(page), fields(%url))]
pub async fn crawl_one_page(
    page: &Page,
    url: &str,
    depth: u32,
    page_load_timeout: Duration,
    spa_dwell: Duration,
    capture_screenshot: bool,
) -> Result<(CrawledPage, Vec<String>)> {
    let started = Instant::now();

    tokio::time::timeout(page_load_timeout, page.goto(url))
        .await
        .map_err(|_| Error::Navigation { url: url.to_string(), reason: "timed out".to_string() })?
        .map_err(|e| Error::Navigation { url: url.to_string(), reason: e.to_string() })?;

    tokio::time::timeout(page_load_timeout, page.wait_for_navigation())
        .await
        .map_err(|_| Error::Navigation { url: url.to_string(), reason: "timed out waiting for load".to_string() })?
        .map_err(|e| Error::Navigation { url: url.to_string(), reason: e.to_string() })?;

    tokio::time::sleep(spa_dwell).await;

    let html = page.content().await.map_err(|e| Error::Extraction { url: url.to_string(), reason: e.to_string() })?;
    let title = extract_title(page).await.unwrap_or_default();
    let links = extract_links(page).await?;

    let screenshot = if capture_screenshot {
        let params = CaptureScreenshotParams { format: Some(CaptureScreenshotFormat::Png), capture_beyond_viewport: Some(true), ..Default::default() };
        match page.screenshot(params).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(error = %e, %url, "screenshot capture failed, continuing without one");
                None
            }
        }
    } else {
        None
    };

    let crawled = CrawledPage {
        url: url.to_string(),
        title,
        dom_fingerprint: fingerprint(&html),
        html,
        screenshot,
        load_latency: started.elapsed(),
        depth,
        discovered_at: chrono::Utc::now(),
    };
    Ok((crawled, links))
}

async fn extract_title(page: &Page) -> Result<String> {
    let result = page.evaluate("document.title").await.map_err(|e| Error::Extraction { url: "<current page>".to_string(), reason: e.to_string() })?;
    Ok(result.into_value().unwrap_or_default())
}

async fn extract_links(page: &Page) -> Result<Vec<String>> {
    const SCRIPT: &str = "Array.from(document.querySelectorAll('a[href]')).map(a => a.getAttribute('href'))";
    let result = page.evaluate(SCRIPT).await.map_err(|e| Error::Extraction { url: "<current page>".to_string(), reason: e.to_string() })?;
    let hrefs: Vec<String> = result.into_value().unwrap_or_default();
    Ok(hrefs)
}

pub fn page_timeout_budget(max_duration: Duration, elapsed: Duration) -> Option<Duration> {
    max_duration.checked_sub(elapsed)
}
