//! Breadth-first crawl frontier
//!
//! Tracks which pages the deep crawl still has to visit. URLs are keyed by
//! their canonical form, so `/Dealers/` and `/dealers` are one page. The
//! page budget counts every URL handed out by [`Frontier::next`], whether
//! or not its fetch later succeeds.

use crate::url::canonicalize_parsed;
use std::collections::{HashSet, VecDeque};
use url::Url;

#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<Url>,
    queued: HashSet<String>,
    visited: usize,
    max_pages: usize,
}

impl Frontier {
    /// Creates an empty frontier that hands out at most `max_pages` URLs
    pub fn new(max_pages: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: HashSet::new(),
            visited: 0,
            max_pages,
        }
    }

    /// Queues a URL unless it was queued before
    ///
    /// Returns true if the URL was added.
    pub fn push(&mut self, url: Url) -> bool {
        let Ok(key) = canonicalize_parsed(url.clone()) else {
            return false;
        };

        if !self.queued.insert(key) {
            return false;
        }

        self.queue.push_back(url);
        true
    }

    /// Marks a URL as already handled without queueing it
    pub fn mark_seen(&mut self, url: &Url) {
        if let Ok(key) = canonicalize_parsed(url.clone()) {
            self.queued.insert(key);
        }
    }

    /// Returns the next URL to visit, or None once the queue is empty or
    /// the page budget is spent
    pub fn next(&mut self) -> Option<Url> {
        if self.visited >= self.max_pages {
            return None;
        }

        let url = self.queue.pop_front()?;
        self.visited += 1;
        Some(url)
    }

    /// Counts a page visited outside the queue (e.g. a pre-fetched homepage)
    pub fn record_visit(&mut self) {
        self.visited += 1;
    }

    pub fn visited(&self) -> usize {
        self.visited
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
