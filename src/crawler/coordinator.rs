//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of the
//! crawling process, including:
//! - Seeding the frontier and running the worker pool
//! - Coordinating fetching, text extraction, persistence and link extraction
//! - Classifying discovered links and feeding them back to the frontier
//! - Handling the run deadline and stop signal
//! - Building the final report

use crate::config::{validate, Config};
use crate::crawler::fetcher::{FetchError, FetchedPage, HttpFetcher, PageFetcher};
use crate::crawler::parser::{HtmlLinkExtractor, LinkExtractor};
use crate::crawler::scheduler::{Completion, CrawlTarget, EnqueueOutcome, Frontier};
use crate::output::{
    CrawlEvent, CrawlReport, CrawlStatistics, FailureReason, MarkdownExtractor, PageFailure,
    ProgressSink, SavedPage, TextExtractor, TracingProgress,
};
use crate::state::TargetState;
use crate::storage::{open_output, FilenameGenerator, Persistence};
use crate::url::{normalize, normalize_root, Classification, CrawlScope, NormalizePolicy};
use crate::CrawlError;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Outcome of processing one crawl target
///
/// Local to the worker that produced it, then folded into the run statistics.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub url: Url,
    pub depth: u32,
    pub state: TargetState,
    pub failure: Option<FailureReason>,
    /// Extracted text (empty unless the page had enough content)
    pub text: String,
    /// Filename the text was written to
    pub filename: Option<String>,
    /// In-scope links found on the page, normalized
    pub links: Vec<Url>,
    /// True if the fetch succeeded
    pub fetched: bool,
    /// Retry attempts made for this page
    pub retries: usize,
    /// Normalized final URL when the fetch was redirected
    pub final_url: Option<Url>,
    /// Links that normalized to a URL
    pub links_seen: usize,
    /// Classification of every link kept out of the frontier
    pub rejected: Vec<Classification>,
}

impl CrawlResult {
    fn new(target: &CrawlTarget, state: TargetState) -> Self {
        Self {
            url: target.url.clone(),
            depth: target.depth,
            state,
            failure: None,
            text: String::new(),
            filename: None,
            links: Vec::new(),
            fetched: false,
            retries: 0,
            final_url: None,
            links_seen: 0,
            rejected: Vec::new(),
        }
    }

    fn failed(target: &CrawlTarget, reason: FailureReason) -> Self {
        let mut result = Self::new(target, TargetState::Failed);
        result.failure = Some(reason);
        result
    }
}

/// Per-run accumulation of results
#[derive(Debug, Default)]
struct Ledger {
    statistics: CrawlStatistics,
    saved: Vec<SavedPage>,
    failures: Vec<PageFailure>,
    root_failure: Option<FetchError>,
}

impl Ledger {
    fn record(&mut self, result: &CrawlResult, completion: Completion) {
        let stats = &mut self.statistics;
        stats.record_page(result.state);
        if result.fetched {
            stats.pages_fetched += 1;
        }
        stats.retries += result.retries;
        stats.links_seen += result.links_seen;
        stats.links_enqueued += completion.enqueued;
        for classification in &result.rejected {
            stats.record_rejected(*classification);
        }

        if let Some(filename) = &result.filename {
            if result.state.is_success() {
                self.saved.push(SavedPage {
                    url: result.url.to_string(),
                    filename: filename.clone(),
                });
            }
        }

        if let Some(reason) = &result.failure {
            self.failures.push(PageFailure {
                url: result.url.to_string(),
                reason: reason.to_string(),
            });
            if result.depth == 0 {
                if let FailureReason::Fetch(err) = reason {
                    self.root_failure = Some(err.clone());
                }
            }
        }
    }
}

/// Everything a worker needs, shared by all workers of one run
struct WorkerContext {
    /// Widened at most once, when the root redirects to another host
    scope: RwLock<CrawlScope>,
    policy: NormalizePolicy,
    retries: u32,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn Persistence>,
    names: Arc<FilenameGenerator>,
    progress: Arc<dyn ProgressSink>,
    links: Arc<dyn LinkExtractor>,
    text: Arc<dyn TextExtractor>,
    cancel: CancellationToken,
    ledger: Mutex<Ledger>,
}

/// Text and links pulled out of a fetched page
struct Analysis {
    text: String,
    links: Vec<Url>,
    links_seen: usize,
    rejected: Vec<Classification>,
}

impl WorkerContext {
    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch → extract → save for one target
    async fn process(&self, target: &CrawlTarget) -> CrawlResult {
        let (fetched, retries) = self.fetch_with_retries(&target.url).await;

        let page = match fetched {
            Ok(page) => page,
            Err(err) => {
                let reason = FailureReason::Fetch(err);
                self.progress.emit(CrawlEvent::PageFailed {
                    url: target.url.clone(),
                    reason: reason.clone(),
                });
                let mut result = CrawlResult::failed(target, reason);
                result.retries = retries;
                return result;
            }
        };

        if self.cancel.is_cancelled() {
            tracing::debug!("Discarding {} fetched after stop", target.url);
            let mut result = CrawlResult::new(target, TargetState::Skipped);
            result.fetched = true;
            result.retries = retries;
            return result;
        }

        self.progress.emit(CrawlEvent::PageFetched {
            url: target.url.clone(),
        });

        let final_url =
            normalize(&page.url, page.url.as_str(), &self.policy).filter(|u| *u != target.url);
        if let Some(redirected) = &final_url {
            tracing::debug!("{} redirected to {}", target.url, redirected);
            if target.depth == 0 {
                self.admit_root_redirect(redirected);
            }
        }

        let analysis = self.analyze(&page);

        let mut result = CrawlResult::new(target, TargetState::Skipped);
        result.fetched = true;
        result.retries = retries;
        result.final_url = final_url;
        result.links = analysis.links;
        result.links_seen = analysis.links_seen;
        result.rejected = analysis.rejected;

        if analysis.text.is_empty() {
            tracing::debug!("No substantial text on {}, not saving", target.url);
            return result;
        }

        if self.cancel.is_cancelled() {
            tracing::debug!("Not saving {} after stop", target.url);
            return result;
        }

        let filename = self.names.filename_for(&target.url);
        match self.store.save(&filename, &analysis.text).await {
            Ok(()) => {
                self.progress.emit(CrawlEvent::PageSaved {
                    url: target.url.clone(),
                    filename: filename.clone(),
                });
                result.state = TargetState::Succeeded;
                result.filename = Some(filename);
            }
            Err(e) => {
                let reason = FailureReason::Persistence(e.to_string());
                self.progress.emit(CrawlEvent::PageFailed {
                    url: target.url.clone(),
                    reason: reason.clone(),
                });
                result.state = TargetState::Failed;
                result.failure = Some(reason);
            }
        }

        result.text = analysis.text;
        result
    }

    async fn fetch_with_retries(&self, url: &Url) -> (Result<FetchedPage, FetchError>, usize) {
        let mut retries = 0;
        loop {
            match self.fetcher.fetch(url).await {
                Err(err)
                    if err.is_retryable()
                        && retries < self.retries as usize
                        && !self.cancel.is_cancelled() =>
                {
                    retries += 1;
                    tracing::debug!("Retrying {} after {} (attempt {})", url, err, retries + 1);
                }
                other => return (other, retries),
            }
        }
    }

    /// Keeps links on the host the root redirected to in scope
    fn admit_root_redirect(&self, final_url: &Url) {
        let mut scope = self.scope.write().unwrap_or_else(PoisonError::into_inner);
        if scope.admit_host(final_url) {
            tracing::info!(
                "Root redirected to {}, following links on that host",
                final_url.host_str().unwrap_or_default()
            );
        }
    }

    /// Extracts text and classifies links
    ///
    /// Runs synchronously: scraper documents are not `Send` and must not be
    /// held across an await.
    fn analyze(&self, page: &FetchedPage) -> Analysis {
        let text = self.text.extract_text(&page.body);

        let mut analysis = Analysis {
            text,
            links: Vec::new(),
            links_seen: 0,
            rejected: Vec::new(),
        };
        let scope = self.scope.read().unwrap_or_else(PoisonError::into_inner);

        for raw in self.links.extract(&page.body, &page.url) {
            let Some(link) = normalize(&page.url, &raw, &self.policy) else {
                tracing::debug!("Ignoring unusable link {:?} on {}", raw, page.url);
                continue;
            };
            analysis.links_seen += 1;

            let classification = scope.classify(&link);
            if classification.should_crawl() {
                analysis.links.push(link);
            } else {
                tracing::debug!("Skipping {:?} link {}", classification, link);
                analysis.rejected.push(classification);
            }
        }

        analysis
    }
}

/// Releases a target's in-flight slot if its worker panics
struct InFlightGuard<'a> {
    frontier: &'a Frontier,
    ctx: &'a WorkerContext,
    target: &'a CrawlTarget,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let reason = FailureReason::Panicked(format!("while processing {}", self.target.url));
        let result = CrawlResult::failed(self.target, reason.clone());
        let completion = self.frontier.complete(false, Vec::new());
        self.ctx.ledger().record(&result, completion);
        self.ctx.progress.emit(CrawlEvent::PageFailed {
            url: self.target.url.clone(),
            reason,
        });
    }
}

async fn worker_loop(id: usize, frontier: Arc<Frontier>, ctx: Arc<WorkerContext>) {
    tracing::debug!("Worker {} started", id);

    while let Some(target) = frontier.next(&ctx.cancel).await {
        let mut guard = InFlightGuard {
            frontier: &frontier,
            ctx: &ctx,
            target: &target,
            armed: true,
        };

        let result = ctx.process(&target).await;
        guard.armed = false;

        if let Some(final_url) = &result.final_url {
            frontier.mark_visited(final_url);
        }

        let links = result
            .links
            .iter()
            .map(|link| target.child(link.clone()))
            .collect::<Vec<_>>();
        let completion = frontier.complete(result.state.is_success(), links);

        tracing::debug!(
            "Worker {} finished {} ({}), {} new links",
            id,
            result.url,
            result.state,
            completion.enqueued
        );
        ctx.ledger().record(&result, completion);
    }

    tracing::debug!("Worker {} stopped", id);
}

/// Main crawler structure
///
/// Built from a validated [`Config`]; every collaborator can be swapped out
/// with the `with_*` methods before calling [`Crawler::run`].
pub struct Crawler {
    config: Arc<Config>,
    root: Url,
    scope: CrawlScope,
    policy: NormalizePolicy,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn Persistence>,
    names: Arc<FilenameGenerator>,
    progress: Arc<dyn ProgressSink>,
    links: Arc<dyn LinkExtractor>,
    text: Arc<dyn TextExtractor>,
    cancel: CancellationToken,
}

impl Crawler {
    /// Creates a crawler that writes pages into the configured output
    /// directory
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration, unusable output directory,
    ///   or the HTTP client could not be built
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        validate(&config)?;
        let (store, names) = open_output(&config.output_directory())?;
        tracing::info!("Writing pages to {}", store.path().display());
        Self::assemble(config, Arc::new(store), names)
    }

    /// Creates a crawler that saves pages through `store` instead of the
    /// output directory
    pub fn with_persistence(config: Config, store: Arc<dyn Persistence>) -> Result<Self, CrawlError> {
        validate(&config)?;
        Self::assemble(config, store, FilenameGenerator::new())
    }

    fn assemble(
        config: Config,
        store: Arc<dyn Persistence>,
        names: FilenameGenerator,
    ) -> Result<Self, CrawlError> {
        let policy = NormalizePolicy::from(&config.normalize);
        let root = normalize_root(&config.crawler.root_url, &policy)?;
        let scope = CrawlScope::from_config(&config)?;
        let fetcher = HttpFetcher::new(&config.crawler)?;
        let text = MarkdownExtractor::new(config.output.min_text_length);

        Ok(Self {
            config: Arc::new(config),
            root,
            scope,
            policy,
            fetcher: Arc::new(fetcher),
            store,
            names: Arc::new(names),
            progress: Arc::new(TracingProgress),
            links: Arc::new(HtmlLinkExtractor),
            text: Arc::new(text),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_link_extractor(mut self, links: Arc<dyn LinkExtractor>) -> Self {
        self.links = links;
        self
    }

    pub fn with_text_extractor(mut self, text: Arc<dyn TextExtractor>) -> Self {
        self.text = text;
        self
    }

    /// Replaces the filename generator (for example, one seeded with
    /// reserved names)
    pub fn with_filenames(mut self, names: FilenameGenerator) -> Self {
        self.names = Arc::new(names);
        self
    }

    /// Token that stops the crawl when cancelled
    ///
    /// In-flight pages finish (or time out) but nothing fetched after the
    /// stop is saved.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The normalized root URL
    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the crawl to completion
    ///
    /// This is the core crawling logic that:
    /// 1. Seeds the frontier with the root URL
    /// 2. Starts `concurrency` workers pulling from the frontier
    /// 3. Stops at the run deadline, on the stop signal, when the page budget
    ///    is used up, or when the frontier runs dry
    /// 4. Emits `CrawlComplete` and returns the report
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The crawl ran (individual pages may have failed)
    /// * `Err(CrawlError::RootUnreachable)` - The root page could not be fetched
    pub async fn run(&self) -> Result<CrawlReport, CrawlError> {
        let started_at = Utc::now();
        let crawler = &self.config.crawler;
        let cancel = self.cancel.child_token();

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} workers)",
            self.root,
            crawler.max_pages,
            crawler.concurrency
        );

        let frontier = Arc::new(Frontier::new(crawler.max_pages));
        if frontier.seed(self.root.clone()) != EnqueueOutcome::Enqueued {
            tracing::warn!("Root {} was not enqueued", self.root);
        }

        let ctx = Arc::new(WorkerContext {
            scope: RwLock::new(self.scope.clone()),
            policy: self.policy,
            retries: crawler.retries,
            fetcher: self.fetcher.clone(),
            store: self.store.clone(),
            names: self.names.clone(),
            progress: self.progress.clone(),
            links: self.links.clone(),
            text: self.text.clone(),
            cancel: cancel.clone(),
            ledger: Mutex::new(Ledger::default()),
        });

        let mut workers = JoinSet::new();
        for id in 0..crawler.concurrency.max(1) {
            workers.spawn(worker_loop(id, frontier.clone(), ctx.clone()));
        }

        let deadline = self.config.run_timeout();
        let run_deadline = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(run_deadline);
        let mut deadline_hit = false;

        loop {
            tokio::select! {
                joined = workers.join_next() => match joined {
                    None => break,
                    Some(Ok(())) => {}
                    Some(Err(e)) => tracing::error!("Worker task failed: {}", e),
                },
                _ = &mut run_deadline, if !deadline_hit => {
                    deadline_hit = true;
                    tracing::warn!("Run deadline reached, stopping crawl");
                    cancel.cancel();
                    frontier.close();
                }
            }
        }

        frontier.terminate();
        let pages = frontier.pages_saved();
        self.progress.emit(CrawlEvent::CrawlComplete { pages });

        let ledger = std::mem::take(&mut *ctx.ledger());
        let finished_at = Utc::now();

        tracing::info!(
            "Crawl completed: {} pages saved, {} failed, {} skipped in {:.1}s",
            pages,
            ledger.statistics.pages_failed,
            ledger.statistics.pages_skipped,
            (finished_at - started_at).num_milliseconds() as f64 / 1000.0
        );

        if let Some(err) = ledger.root_failure {
            return Err(CrawlError::RootUnreachable {
                url: self.root.to_string(),
                reason: err.to_string(),
            });
        }

        Ok(CrawlReport {
            root_url: self.root.to_string(),
            started_at,
            finished_at,
            engine_state: frontier.engine_state(),
            cancelled: cancel.is_cancelled(),
            statistics: ledger.statistics,
            saved: ledger.saved,
            failures: ledger.failures,
            discovered: frontier.discovered(),
        })
    }
}
