//! Breadth-first browser crawler. Discovers same-origin pages starting from
//! a seed URL, replaying an optional authenticated session into every
//! worker, and hands the raw page data (HTML, screenshot, DOM fingerprint)
//! up to the orchestrator for agent analysis.

pub mod auth;
pub mod browser;
pub mod business_flow;
pub mod config;
pub mod error;
pub mod frontier;
pub mod page;
pub mod same_origin;

pub use auth::AuthSession;
pub use business_flow::heuristic_flows;
pub use config::{AuthConfig, CrawlConfig};
pub use error::{Error, Result};
pub use page::CrawledPage;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use aq_crypto::Cipher;
use futures::FutureExt;
use tokio::sync::Mutex as AsyncMutex;
use url::Url;

use browser::BrowserHandle;
use frontier::{wait_for_quiescence, Frontier};

/// Runs one crawl to completion and returns every page reached, in the
/// order workers finished processing them (not necessarily BFS order,
/// since workers race).
#[tracing::instrument(skip(config, cipher), fields(start_url = %config.start_url))]
pub async fn crawl(config: CrawlConfig, cipher: &Cipher) -> Result<Vec<CrawledPage>> {
    let seed = Url::parse(&config.start_url).map_err(|_| Error::InvalidUrl(config.start_url.clone()))?;
    let browser = BrowserHandle::launch(config.headless).await?;

    let auth_session = if let Some(auth_config) = &config.auth {
        let auth_page = browser.new_worker_page(None).await?;
        let session = auth::establish(&auth_page, cipher, auth_config).await?;
        Some(session)
    } else {
        None
    };

    let frontier = Frontier::new(seed.clone());
    let pages = Arc::new(AsyncMutex::new(Vec::new()));
    let in_flight = Arc::new(AtomicUsize::new(0));
    let deadline = Instant::now() + config.max_duration;

    let mut workers = Vec::with_capacity(config.worker_count);
    for worker_id in 0..config.worker_count {
        let frontier = Arc::clone(&frontier);
        let pages = Arc::clone(&pages);
        let in_flight = Arc::clone(&in_flight);
        let auth_session = auth_session.clone();
        let page_handle = browser.new_worker_page(auth_session.as_ref()).await?;
        let config = config.clone();
        let seed = seed.clone();

        workers.push(tokio::spawn(async move {
            worker_loop(worker_id, page_handle, frontier, pages, in_flight, config, seed, deadline).await;
        }));
    }

    let idle_check = {
        let in_flight = Arc::clone(&in_flight);
        move || in_flight.load(Ordering::Acquire) == 0
    };
    wait_for_quiescence(&frontier, Duration::from_millis(200), idle_check).await;

    for worker in workers {
        let _ = worker.await;
    }

    browser.shutdown().await;

    let pages = Arc::try_unwrap(pages).map(AsyncMutex::into_inner).unwrap_or_default();
    Ok(pages)
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    page: chromiumoxide::Page,
    frontier: Arc<Frontier>,
    pages: Arc<AsyncMutex<Vec<CrawledPage>>>,
    in_flight: Arc<AtomicUsize>,
    config: CrawlConfig,
    seed: Url,
    deadline: Instant,
) {
    loop {
        if Instant::now() >= deadline || frontier.is_closed() {
            return;
        }
        if pages.lock().await.len() >= config.max_pages {
            frontier.close();
            return;
        }

        let Some(item) = frontier.pop().await else {
            tokio::time::sleep(Duration::from_millis(50)).await;
            continue;
        };
        in_flight.fetch_add(1, Ordering::AcqRel);

        let result = std::panic::AssertUnwindSafe(browser::crawl_one_page(
            &page,
            item.url.as_str(),
            item.depth,
            config.page_load_timeout,
            config.spa_dwell,
            config.capture_screenshots,
        ))
        .catch_unwind()
        .await;

        match result {
            Ok(Ok((crawled, raw_links))) => {
                if item.depth < config.max_depth {
                    let discovered = same_origin::filter_links(&seed, &raw_links, config.same_origin_only);
                    for link in discovered {
                        frontier.push(link, item.depth + 1, item.url.to_string()).await;
                    }
                }
                pages.lock().await.push(crawled);
            }
            Ok(Err(e)) => {
                tracing::warn!(worker_id, url = %item.url, error = %e, "page crawl failed");
            }
            Err(_) => {
                tracing::warn!(worker_id, url = %item.url, "worker recovered from a panic during page crawl");
            }
        }

        in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_informative() {
        let err = Error::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("not a url"));
    }
}
