use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::sync::Mutex;
use tokio::time::interval;
use url::Url;

/// One unit of crawl work: a URL to visit, its depth from the seed, and the
/// URL that discovered it (`None` for the seed itself).
#[derive(Debug, Clone)]
pub struct FrontierItem {
    pub url: Url,
    pub depth: u32,
    pub parent: Option<String>,
}

/// Shared BFS frontier. Backed by a mutex-guarded deque rather than an
/// mpsc channel so workers can both push (new links) and pop without the
/// channel's single-consumer-per-receiver restriction; a `DashSet` visited
/// set keeps membership checks lock-free.
pub struct Frontier {
    queue: Mutex<std::collections::VecDeque<FrontierItem>>,
    visited: DashSet<String>,
    closed: AtomicBool,
    dispatched: AtomicUsize,
}

impl Frontier {
    pub fn new(seed: Url) -> Arc<Self> {
        let frontier = Arc::new(Self {
            queue: Mutex::new(std::collections::VecDeque::new()),
            visited: DashSet::new(),
            closed: AtomicBool::new(false),
            dispatched: AtomicUsize::new(0),
        });
        let key = super::same_origin::normalize_for_dedup(&seed);
        frontier.visited.insert(key);
        frontier.queue.try_lock().expect("fresh mutex is uncontended").push_back(FrontierItem { url: seed, depth: 0, parent: None });
        frontier
    }

    /// Enqueues a link if it hasn't been seen before. Returns `true` if it
    /// was newly added.
    pub async fn push(&self, url: Url, depth: u32, parent: String) -> bool {
        if self.closed.load(Ordering::Acquire) {
            return false;
        }
        let key = super::same_origin::normalize_for_dedup(&url);
        if !self.visited.insert(key) {
            return false;
        }
        self.queue.lock().await.push_back(FrontierItem { url, depth, parent: Some(parent) });
        true
    }

    pub async fn pop(&self) -> Option<FrontierItem> {
        let item = self.queue.lock().await.pop_front();
        if item.is_some() {
            self.dispatched.fetch_add(1, Ordering::AcqRel);
        }
        item
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Waits until the frontier has been empty for three consecutive ticks, or
/// until `workers_idle` reports every worker has nothing in flight —
/// whichever is sooner. Guards against a false "done" read between one
/// worker draining the queue and that same worker enqueueing new links.
pub async fn wait_for_quiescence(frontier: &Frontier, poll_interval: Duration, workers_idle: impl Fn() -> bool) {
    let mut ticker = interval(poll_interval);
    let mut empty_ticks = 0u32;
    loop {
        ticker.tick().await;
        if frontier.len().await == 0 && workers_idle() {
            empty_ticks += 1;
            if empty_ticks >= 3 {
                frontier.close();
                return;
            }
        } else {
            empty_ticks = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_is_pre_enqueued_and_marked_visited() {
        let frontier = Frontier::new(Url::parse("https://x.com/").unwrap());
        assert_eq!(frontier.visited_count(), 1);
        let item = frontier.pop().await.unwrap();
        assert_eq!(item.depth, 0);
        assert!(item.parent.is_none());
    }

    #[tokio::test]
    async fn push_deduplicates_by_normalized_url() {
        let frontier = Frontier::new(Url::parse("https://x.com/").unwrap());
        let added = frontier.push(Url::parse("https://x.com/page").unwrap(), 1, "https://x.com/".to_string()).await;
        assert!(added);
        let duplicate = frontier.push(Url::parse("https://x.com/page?utm=1").unwrap(), 1, "https://x.com/".to_string()).await;
        assert!(!duplicate);
    }

    #[tokio::test]
    async fn closed_frontier_rejects_new_pushes() {
        let frontier = Frontier::new(Url::parse("https://x.com/").unwrap());
        frontier.close();
        let added = frontier.push(Url::parse("https://x.com/other").unwrap(), 1, "https://x.com/".to_string()).await;
        assert!(!added);
    }

    #[tokio::test]
    async fn quiescence_fires_after_three_empty_ticks() {
        let frontier = Frontier::new(Url::parse("https://x.com/").unwrap());
        frontier.pop().await;
        wait_for_quiescence(&frontier, Duration::from_millis(5), || true).await;
        assert!(frontier.is_closed());
    }
}
