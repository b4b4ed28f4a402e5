use std::fmt;
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use rsscrawl_crawler::Sink;
use serde::Serialize;

use crate::csv_writer::CsvWriterConfig;

pub const BATCH_SIZE: usize = 100;

/// One crawled page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawledRecord {
    pub name: String,
    pub url: String,
    pub score: f64,
}

impl CrawledRecord {
    /// Returns `None` without an url, the name falls back to the url.
    pub fn new(name: &str, url: &str, score: f64) -> Option<Self> {
        if url.is_empty() {
            return None;
        }
        let name = if name.is_empty() { url } else { name };
        Some(Self {
            name: name.to_string(),
            url: url.to_string(),
            score,
        })
    }
}

impl fmt::Display for CrawledRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crawled record: name = {}; url = {}; score = {:.6};",
            self.name, self.url, self.score
        )
    }
}

#[derive(Debug, Default)]
struct Records(Mutex<Vec<CrawledRecord>>);

impl Records {
    fn lock(&self) -> MutexGuard<'_, Vec<CrawledRecord>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, title: &str, url: &str, score: f64) {
        if let Some(record) = CrawledRecord::new(title, url, score) {
            self.lock().push(record);
        }
    }

    /// Best scores first.
    fn ranked(&self) -> Vec<CrawledRecord> {
        let mut records = self.lock().clone();
        records.sort_by(|a, b| b.score.total_cmp(&a.score));
        records
    }
}

/// Logs records in batches of `batch_size`.
#[derive(Debug)]
pub struct LogStore {
    batch_size: usize,
    pending: Records,
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(BATCH_SIZE)
    }
}

impl LogStore {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: Records::default(),
        }
    }

    /// Records not logged yet.
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    fn log_batch(batch: Vec<CrawledRecord>) {
        for record in batch {
            log::info!("{record}");
        }
    }
}

impl Sink for LogStore {
    fn record(&self, title: &str, url: &str, score: f64) {
        let Some(record) = CrawledRecord::new(title, url, score) else {
            return;
        };
        let mut pending = self.pending.lock();
        pending.push(record);
        if pending.len() >= self.batch_size {
            let batch = std::mem::take(&mut *pending);
            drop(pending);
            Self::log_batch(batch);
        }
    }

    fn flush(&self) -> Result<()> {
        let batch = std::mem::take(&mut *self.pending.lock());
        Self::log_batch(batch);
        Ok(())
    }
}

/// Writes every record to an html table, best scores first.
#[derive(Debug)]
pub struct HtmlReport {
    path: PathBuf,
    records: Records,
}

impl HtmlReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Records::default(),
        }
    }

    pub fn render(records: &[CrawledRecord]) -> String {
        let mut rows = String::new();
        for record in records {
            write!(
                rows,
                r#"<tr><td><a href="{}" target="_blank">{}</a></td><td>{}</td></tr>"#,
                escape(&record.url),
                escape(&record.name),
                record.score
            )
            .ok();
        }

        format!(
            "<html><head><style>tr:nth-child(odd) {{background: #dddddd}}</style></head>\
             <body><table><thead><tr><th>doc</th><th>score</th></tr></thead>\
             <tbody>{rows}</tbody></table></body></html>"
        )
    }
}

impl Sink for HtmlReport {
    fn record(&self, title: &str, url: &str, score: f64) {
        self.records.push(title, url, score);
    }

    fn flush(&self) -> Result<()> {
        let records = self.records.ranked();
        fs_err::write(&self.path, Self::render(&records))?;
        log::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Writes every record as csv, best scores first, to a file or stdout.
#[derive(Debug)]
pub struct CsvReport {
    path: Option<PathBuf>,
    config: CsvWriterConfig,
    records: Records,
}

impl CsvReport {
    pub fn new(path: Option<PathBuf>, config: CsvWriterConfig) -> Self {
        Self {
            path,
            config,
            records: Records::default(),
        }
    }

    fn write_to<W: io::Write>(&self, wtr: W, records: &[CrawledRecord]) -> Result<()> {
        let mut wtr = self.config.writer(wtr);
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl Sink for CsvReport {
    fn record(&self, title: &str, url: &str, score: f64) {
        self.records.push(title, url, score);
    }

    fn flush(&self) -> Result<()> {
        let records = self.records.ranked();
        match &self.path {
            Some(path) => self.write_to(fs_err::File::create(path)?, &records),
            None => self.write_to(io::stdout(), &records),
        }
    }
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_defaults() {
        assert_eq!(CrawledRecord::new("t", "", 1.0), None);
        let record = CrawledRecord::new("", "http://x/a", 1.5).unwrap();
        assert_eq!(record.name, "http://x/a");
        assert_eq!(
            record.to_string(),
            "Crawled record: name = http://x/a; url = http://x/a; score = 1.500000;"
        );
    }

    #[test]
    fn log_store_batches() {
        let store = LogStore::new(2);
        store.record("a", "http://x/a", 1.0);
        assert_eq!(store.pending(), 1);
        store.record("b", "http://x/b", 1.0);
        assert_eq!(store.pending(), 0);
        store.record("c", "http://x/c", 1.0);
        store.record("no url", "", 1.0);
        assert_eq!(store.pending(), 1);
        store.flush().unwrap();
        assert_eq!(store.pending(), 0);
    }

    #[test]
    fn html_rows_are_escaped() {
        let records = vec![CrawledRecord::new("A <b> & c", "http://x/?a=1&b=2", 2.0).unwrap()];
        let html = HtmlReport::render(&records);
        assert!(html.contains(
            r#"<tr><td><a href="http://x/?a=1&amp;b=2" target="_blank">A &lt;b&gt; &amp; c</a></td><td>2</td></tr>"#
        ));
        assert!(html.starts_with("<html>"));
        assert!(html.ends_with("</html>"));
    }
}
