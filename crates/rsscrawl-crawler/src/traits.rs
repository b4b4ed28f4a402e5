use std::sync::Arc;

use anyhow::Result;

/// Rates the text content of a page, higher is better.
pub trait Scorer: Send + Sync + 'static {
    fn score(&self, text: &str) -> f64;
}

/// Receives one record per crawled page.
///
/// Called concurrently from running visits, batching is up to the sink.
/// [`Sink::flush`] is called once by the run driver after the crawl is idle.
pub trait Sink: Send + Sync + 'static {
    fn record(&self, title: &str, url: &str, score: f64);

    fn flush(&self) -> Result<()>;
}

impl<T: Scorer + ?Sized> Scorer for Arc<T> {
    fn score(&self, text: &str) -> f64 {
        (**self).score(text)
    }
}

impl<T: Sink + ?Sized> Sink for Arc<T> {
    fn record(&self, title: &str, url: &str, score: f64) {
        (**self).record(title, url, score)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}

impl<T: Sink + ?Sized> Sink for Box<T> {
    fn record(&self, title: &str, url: &str, score: f64) {
        (**self).record(title, url, score)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}
