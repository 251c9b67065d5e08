//! Frontier for managing the crawl queue and page budget
//!
//! This module handles:
//! - FIFO queue management for URLs to crawl
//! - The visited set (a URL is enqueued at most once per run)
//! - The page budget (pages saved plus pages in flight never exceed it)
//! - Waking idle workers when new work arrives or the crawl winds down

use crate::state::EngineState;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use url::Url;

/// A URL queued for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The normalized URL to fetch
    pub url: Url,

    /// Link distance from the root (root = 0)
    pub depth: u32,
}

impl CrawlTarget {
    pub fn new(url: Url, depth: u32) -> Self {
        Self { url, depth }
    }

    /// A target discovered on this page
    pub fn child(&self, url: Url) -> Self {
        Self::new(url, self.depth + 1)
    }
}

/// Result of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Added to the back of the queue
    Enqueued,
    /// Already enqueued or processed in this run
    AlreadySeen,
    /// Pages saved plus pages in flight already reach the budget
    BudgetExhausted,
    /// The crawl is no longer accepting work
    Closed,
}

/// Counts from folding one page's links into the frontier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Completion {
    pub enqueued: usize,
    pub already_seen: usize,
    pub over_budget: usize,
    /// Links offered after the crawl stopped accepting work
    pub closed: usize,
}

#[derive(Debug)]
struct FrontierState {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    discovered: Vec<String>,
    in_flight: usize,
    saved: usize,
    engine: EngineState,
}

/// Shared crawl frontier
///
/// All bookkeeping (queue, visited set, in-flight count and page counter)
/// sits behind one mutex, so membership tests, budget checks and inserts are
/// a single atomic step. Idle workers park on a `Notify` until a completion
/// adds work or the crawl stops.
#[derive(Debug)]
pub struct Frontier {
    max_pages: usize,
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    /// Creates an empty frontier that will save at most `max_pages` pages
    pub fn new(max_pages: usize) -> Self {
        Self {
            max_pages,
            state: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                visited: HashSet::new(),
                discovered: Vec::new(),
                in_flight: 0,
                saved: 0,
                engine: EngineState::Running,
            }),
            notify: Notify::new(),
        }
    }

    /// Adds the root URL at depth 0
    pub fn seed(&self, root: Url) -> EnqueueOutcome {
        self.try_enqueue(CrawlTarget::new(root, 0))
    }

    /// Offers a single target to the frontier
    pub fn try_enqueue(&self, target: CrawlTarget) -> EnqueueOutcome {
        let outcome = {
            let mut state = self.lock();
            self.enqueue_locked(&mut state, target)
        };

        if outcome == EnqueueOutcome::Enqueued {
            self.notify.notify_waiters();
        }
        outcome
    }

    /// Waits for the next target to fetch
    ///
    /// Returns `None` once no more work will be handed out: the queue is
    /// empty with nothing in flight, the budget is reached, the frontier was
    /// closed, or `cancel` fired. Waits while the queue is empty but other
    /// targets are in flight, and while in-flight targets reserve the whole
    /// remaining budget.
    ///
    /// Every `Some` must be paired with exactly one call to [`Frontier::complete`].
    pub async fn next(&self, cancel: &CancellationToken) -> Option<CrawlTarget> {
        loop {
            // Registered before the state check so a wakeup between the check
            // and the await is not lost
            let notified = self.notify.notified();

            {
                let mut state = self.lock();

                if !state.engine.accepts_work() {
                    return None;
                }

                if cancel.is_cancelled() || state.saved >= self.max_pages {
                    self.drain_locked(&mut state);
                    return None;
                }

                if state.saved + state.in_flight < self.max_pages {
                    if let Some(target) = state.queue.pop_front() {
                        state.in_flight += 1;
                        return Some(target);
                    }
                }

                if state.queue.is_empty() && state.in_flight == 0 {
                    self.drain_locked(&mut state);
                    return None;
                }
            }

            tokio::select! {
                _ = notified => {}
                _ = cancel.cancelled() => {}
            }
        }
    }

    /// Finishes an in-flight target
    ///
    /// Releases the in-flight slot, counts the page if it was saved, and
    /// enqueues the page's in-scope links, all under one lock.
    pub fn complete<I>(&self, saved: bool, links: I) -> Completion
    where
        I: IntoIterator<Item = CrawlTarget>,
    {
        let mut completion = Completion::default();

        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
            if saved {
                state.saved += 1;
            }

            for link in links {
                match self.enqueue_locked(&mut state, link) {
                    EnqueueOutcome::Enqueued => completion.enqueued += 1,
                    EnqueueOutcome::AlreadySeen => completion.already_seen += 1,
                    EnqueueOutcome::BudgetExhausted => completion.over_budget += 1,
                    EnqueueOutcome::Closed => completion.closed += 1,
                }
            }
        }

        self.notify.notify_waiters();
        completion
    }

    /// Stops handing out work; in-flight targets may still complete
    pub fn close(&self) {
        {
            let mut state = self.lock();
            self.drain_locked(&mut state);
        }
        self.notify.notify_waiters();
    }

    /// Marks the run as finished
    pub fn terminate(&self) {
        {
            let mut state = self.lock();
            state.engine.advance(EngineState::Terminated);
        }
        self.notify.notify_waiters();
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Pages saved so far
    pub fn pages_saved(&self) -> usize {
        self.lock().saved
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of queued targets
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().queue.is_empty()
    }

    pub fn engine_state(&self) -> EngineState {
        self.lock().engine
    }

    /// Returns true if `url` was enqueued in this run
    pub fn is_visited(&self, url: &Url) -> bool {
        self.lock().visited.contains(url.as_str())
    }

    /// Records `url` as seen without queueing it
    ///
    /// Used for the final URL of a redirect, so a later link to it is not
    /// fetched a second time. Returns false if it was already seen.
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.as_str().to_string())
    }

    /// Every enqueued URL in discovery order
    pub fn discovered(&self) -> Vec<String> {
        self.lock().discovered.clone()
    }

    fn enqueue_locked(&self, state: &mut FrontierState, target: CrawlTarget) -> EnqueueOutcome {
        if !state.engine.accepts_work() {
            return EnqueueOutcome::Closed;
        }
        if state.visited.contains(target.url.as_str()) {
            return EnqueueOutcome::AlreadySeen;
        }
        if state.saved + state.in_flight >= self.max_pages {
            return EnqueueOutcome::BudgetExhausted;
        }

        let key = target.url.as_str().to_string();
        state.visited.insert(key.clone());
        state.discovered.push(key);
        state.queue.push_back(target);
        EnqueueOutcome::Enqueued
    }

    fn drain_locked(&self, state: &mut FrontierState) {
        state.engine.advance(EngineState::Draining);
        self.notify.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
