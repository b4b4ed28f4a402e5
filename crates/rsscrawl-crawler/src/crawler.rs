use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::CrawlerConfig;
use crate::extract;
use crate::feed::{self, RssItem};
use crate::fetch::{Fetched, Fetcher};
use crate::scheduler::Scheduler;
use crate::skip::Skip;
use crate::target::{Kind, Target};
use crate::traits::{Scorer, Sink};
use crate::visited::VisitedSet;

const OPML_SUFFIX: &str = ".opml";
const RSS_CONTENT_TYPE: &str = "text/xml";
const RSS_VERSION: &str = "2.0";
const HTML_CONTENT_TYPE: &str = "text/html";

/// Outcome of a single visit.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// The target was crawled and `submitted` targets were handed to the
    /// scheduler, links repeated on a page or already visited included
    Visited { submitted: usize },
    /// The locator was already seen during this run
    Duplicate,
    Skipped(Skip),
}

type Step<T = usize> = std::result::Result<T, Skip>;

/// Walks OPML -> RSS -> HTML, every visit being a job on the shared scheduler.
pub struct Crawler<F, S, K> {
    scheduler: Scheduler,
    visited: VisitedSet,
    fetcher: F,
    scorer: S,
    sink: K,
    max_depth: usize,
}

impl<F, S, K> Crawler<F, S, K>
where
    F: Fetcher,
    S: Scorer,
    K: Sink,
{
    pub fn new(scheduler: Scheduler, fetcher: F, scorer: S, sink: K, max_depth: usize) -> Arc<Self> {
        Arc::new(Self {
            scheduler,
            visited: VisitedSet::new(),
            fetcher,
            scorer,
            sink,
            max_depth,
        })
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Number of distinct locators seen so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Submits a visit of `target` to the scheduler.
    pub fn crawl(self: &Arc<Self>, target: Target) {
        let crawler = Arc::clone(self);
        self.scheduler
            .submit(async move { crawler.visit(target).await.map(drop) });
    }

    /// Visits `target` and submits whatever it links to.
    ///
    /// Expected failures (bad locator, http error, unexpected document) are
    /// logged and returned as [`Visit::Skipped`]. Only documents the XML
    /// parser rejects, or an unreadable OPML file, are errors.
    pub async fn visit(self: &Arc<Self>, target: Target) -> Result<Visit> {
        if !self.visited.insert(&target.locator) {
            log::debug!("Already visited {}", target.locator);
            return Ok(Visit::Duplicate);
        }

        let kind = target.kind;
        let locator = target.locator.clone();
        log::debug!("Crawling {kind} {locator}");

        let step = match kind {
            Kind::Opml => self.visit_opml(&target.locator).await,
            Kind::Rss => self.visit_rss(&target.locator).await,
            Kind::Html => self.visit_html(target).await,
        }
        .with_context(|| format!("Couldn't crawl {kind} {locator}"))?;

        match step {
            Ok(submitted) => Ok(Visit::Visited { submitted }),
            Err(skip) => {
                if !skip.is_terminal() {
                    log::warn!("Skipping {kind} {locator} got: {skip}");
                }
                Ok(Visit::Skipped(skip))
            }
        }
    }

    async fn visit_opml(self: &Arc<Self>, path: &str) -> Result<Step> {
        if !path.ends_with(OPML_SUFFIX) {
            return Ok(Err(invalid(Kind::Opml, path)));
        }

        let xml = tokio::fs::read_to_string(path).await?;
        let feeds = feed::opml_feeds(&xml)?;
        for url in &feeds {
            self.crawl(Target::rss(url));
        }

        Ok(Ok(feeds.len()))
    }

    async fn visit_rss(self: &Arc<Self>, url: &str) -> Result<Step> {
        if url.is_empty() {
            return Ok(Err(invalid(Kind::Rss, url)));
        }

        let fetched = match self.fetch(url, RSS_CONTENT_TYPE).await {
            Ok(fetched) => fetched,
            Err(skip) => return Ok(Err(skip)),
        };

        let Some(channel) = feed::rss_channel(&fetched.body)? else {
            return Ok(Err(Skip::MissingFeedRoot));
        };
        if channel.version.as_deref() != Some(RSS_VERSION) {
            return Ok(Err(Skip::UnsupportedVersion(channel.version)));
        }

        let mut submitted = 0;
        for item in channel.items {
            match item {
                RssItem {
                    title: Some(title),
                    link: Some(link),
                } => {
                    self.crawl(Target::html(link, title, 0));
                    submitted += 1;
                }
                RssItem { title: None, .. } => log::warn!("Skipping item without title in {url}"),
                RssItem { link: None, .. } => log::warn!("Skipping item without link in {url}"),
            }
        }

        Ok(Ok(submitted))
    }

    async fn visit_html(self: &Arc<Self>, target: Target) -> Result<Step> {
        let Target {
            locator: url,
            label,
            depth,
            ..
        } = target;

        if depth >= self.max_depth {
            return Ok(Err(Skip::MaxDepth(depth)));
        }
        if url.is_empty() {
            return Ok(Err(invalid(Kind::Html, &url)));
        }

        let fetched = match self.fetch(&url, HTML_CONTENT_TYPE).await {
            Ok(fetched) => fetched,
            Err(skip) => return Ok(Err(skip)),
        };

        let page = extract::extract(&url, &fetched.body);
        let score = self.scorer.score(&page.text);
        let title = if label.is_empty() { page.title } else { label };
        self.sink.record(&title, &url, score);

        let submitted = page.links.len();
        for link in page.links {
            self.crawl(Target::html(link.url, link.text, depth + 1));
        }

        Ok(Ok(submitted))
    }

    async fn fetch(&self, url: &str, content_type: &'static str) -> Step<Fetched> {
        let fetched = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Skip::Transport(format!("{e:#}")))?;

        if fetched.is_error() {
            Err(Skip::Status(fetched.status))
        } else if !fetched.has_content_type(content_type) {
            Err(Skip::ContentType {
                expected: content_type,
                actual: fetched.content_type,
            })
        } else {
            Ok(fetched)
        }
    }
}

fn invalid(kind: Kind, locator: &str) -> Skip {
    Skip::InvalidLocator {
        kind,
        locator: locator.to_string(),
    }
}

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub visited: usize,
}

/// Crawls everything reachable from the `seed` OPML file, then flushes `sink`.
pub async fn crawl_feeds<F, S, K>(
    config: &CrawlerConfig,
    seed: impl AsRef<Path>,
    fetcher: F,
    scorer: S,
    sink: K,
) -> Result<RunSummary>
where
    F: Fetcher,
    S: Scorer,
    K: Sink,
{
    let seed = seed.as_ref();
    anyhow::ensure!(seed.is_file(), "Seed OPML {} is not a file", seed.display());

    let scheduler = Scheduler::new(config.concurrency_limit);
    log::info!(
        "Crawling {} with up to {} concurrent visits",
        seed.display(),
        scheduler.limit()
    );
    let crawler = Crawler::new(scheduler.clone(), fetcher, scorer, sink, config.max_depth);

    crawler.crawl(Target::opml(seed.to_string_lossy()));
    scheduler.wait_idle().await?;

    let summary = RunSummary {
        visited: crawler.visited_count(),
    };
    log::info!("Crawl done, visited {} locators", summary.visited);
    crawler.sink().flush()?;

    Ok(summary)
}
