mod csv_writer;
mod score;
mod store;

use std::path::PathBuf;

use rsscrawl_crawler::Sink;

pub use csv_writer::{CsvTerminator, CsvWriterConfig};
pub use score::WordEntropyScore;
pub use store::{CrawledRecord, CsvReport, HtmlReport, LogStore, BATCH_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    /// Html table sorted by score
    #[default]
    Html,
    /// Csv rows sorted by score
    Csv,
    /// Log records in batches
    Log,
}

/// Builds the sink for `format`, csv goes to stdout without `output`.
pub fn open_sink(
    format: OutputFormat,
    output: Option<PathBuf>,
    csv_config: CsvWriterConfig,
) -> anyhow::Result<Box<dyn Sink>> {
    let sink: Box<dyn Sink> = match format {
        OutputFormat::Html => {
            let path = output.ok_or_else(|| anyhow::anyhow!("Html output requires a file"))?;
            Box::new(HtmlReport::new(path))
        }
        OutputFormat::Csv => Box::new(CsvReport::new(output, csv_config)),
        OutputFormat::Log => Box::new(LogStore::default()),
    };
    Ok(sink)
}
