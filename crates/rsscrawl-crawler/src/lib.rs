mod config;
mod crawler;
pub mod extract;
pub mod feed;
mod fetch;
mod scheduler;
mod skip;
mod target;
mod traits;
mod visited;

pub use config::CrawlerConfig;
pub use crawler::{crawl_feeds, Crawler, RunSummary, Visit};
pub use fetch::{Fetched, Fetcher, HttpFetcher};
pub use scheduler::{Job, Scheduler};
pub use skip::Skip;
pub use target::{Kind, Target};
pub use traits::{Scorer, Sink};
pub use visited::VisitedSet;

pub use anyhow;
pub use async_trait::async_trait;
