use std::fs::{self, File};
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use rsscrawl_crawler::{crawl_feeds, extract, CrawlerConfig, Fetcher, HttpFetcher, Scorer};
use rsscrawl_store::{open_sink, CsvWriterConfig, OutputFormat, WordEntropyScore};
use tokio::runtime;

const DEFAULT_LOG_FILTER: &str = "rsscrawl_crawler=info,rsscrawl_store=info";

/// OPML -> RSS -> HTML crawler
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "crawl")]
    Crawl(CrawlArgs),
    #[command(name = "page")]
    Page(PageArgs),
    #[command(hide = true)]
    Completion,
}

/// Crawl the feeds of an OPML file and rank the pages they link to
#[derive(Debug, clap::Args)]
pub struct CrawlArgs {
    /// Path to the OPML file listing the feeds
    pub seed: PathBuf,
    /// Headerless `word,entropy` csv used to score pages
    #[arg(long, short, default_value = "word_entropy.csv")]
    pub entropy: PathBuf,
    /// Path to the output file, csv is printed to stdout when missing
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Output format
    #[arg(value_enum, long, short, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
    /// Optional default crawler yaml configuration file
    #[arg(env = "RSSCRAWL_CONFIG", long)]
    pub crawler_config: Option<PathBuf>,
    /// Optional csv writer yaml configuration file
    #[arg(env = "RSSCRAWL_CSV_CONFIG", long)]
    pub csv_config: Option<PathBuf>,
    /// Override csv writer's delimiter
    #[arg(long)]
    pub csv_delimiter: Option<char>,
    /// Override crawler's user agent
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Override crawler's maximum number of concurrent visits
    #[arg(long)]
    pub concurrency_limit: Option<NonZeroUsize>,
    /// Override crawler's maximum html link depth
    #[arg(long)]
    pub max_depth: Option<usize>,
    /// When quiet no logs are outputted
    #[arg(long, short)]
    pub quiet: bool,
}

impl TryFrom<&CrawlArgs> for CrawlerConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(file) = args.crawler_config.as_ref().map(File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            CrawlerConfig::default()
        };
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = user_agent.to_string();
        }
        if let Some(concurrency_limit) = args.concurrency_limit {
            conf.concurrency_limit = concurrency_limit;
        }
        if let Some(max_depth) = args.max_depth {
            conf.max_depth = max_depth;
        }
        Ok(conf)
    }
}

impl TryFrom<&CrawlArgs> for CsvWriterConfig {
    type Error = anyhow::Error;

    fn try_from(args: &CrawlArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(file) = args.csv_config.as_ref().map(File::open) {
            serde_yaml::from_reader(file?)?
        } else {
            CsvWriterConfig::default()
        };
        if let Some(delimiter) = args.csv_delimiter {
            anyhow::ensure!(delimiter.is_ascii(), "Csv delimiter {delimiter:?} is not ascii");
            conf.delimiter = delimiter;
        }
        Ok(conf)
    }
}

pub fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let crawler_conf: CrawlerConfig = (&args).try_into()?;
    let csv_conf: CsvWriterConfig = (&args).try_into()?;
    let output = match (args.format, args.output) {
        (OutputFormat::Html, None) => Some(PathBuf::from("crawled_result.html")),
        (_, output) => output,
    };

    let fetcher = HttpFetcher::new(&crawler_conf.user_agent)?;
    let scorer = WordEntropyScore::from_path(&args.entropy)?;
    let sink = open_sink(args.format, output, csv_conf)?;

    let rt = runtime::Builder::new_multi_thread().enable_all().build()?;
    let summary = rt.block_on(crawl_feeds(
        &crawler_conf,
        &args.seed,
        fetcher,
        scorer,
        sink,
    ))?;
    log::info!("Visited {} locators from {}", summary.visited, args.seed.display());

    Ok(())
}

/// Extract and score a single html page, then print the result to stdout
#[derive(Debug, clap::Args)]
#[command(group = clap::ArgGroup::new("source").required(true))]
pub struct PageArgs {
    /// A local html page
    #[arg(group = "source", long)]
    pub file: Option<PathBuf>,
    /// A distant html page
    #[arg(group = "source", long)]
    pub url: Option<String>,
    /// Headerless `word,entropy` csv used to score the page
    #[arg(long, short, default_value = "word_entropy.csv")]
    pub entropy: PathBuf,
    /// Custom user agent to download the page
    #[arg(long, conflicts_with = "file", default_value = "rsscrawl")]
    pub ua: String,
}

pub fn page(args: PageArgs) -> anyhow::Result<()> {
    let (html, url) = if let Some(url) = args.url {
        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let fetched = rt.block_on(HttpFetcher::new(&args.ua)?.fetch(&url))?;
        anyhow::ensure!(!fetched.is_error(), "Got status {} for {url}", fetched.status);
        (fetched.body, url)
    } else if let Some(path) = args.file {
        let html = fs::read_to_string(&path)?;
        (html, path.display().to_string())
    } else {
        anyhow::bail!("Missing `url` or `file`");
    };

    let scorer = WordEntropyScore::from_path(&args.entropy)?;
    let page = extract::extract(&url, &html);

    println!("title: {}", page.title);
    println!("score: {}", scorer.score(&page.text));
    for link in page.links {
        println!("link: {} {}", link.url, link.text);
    }

    Ok(())
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match args.cmd {
        SubCommand::Crawl(args) => {
            if !args.quiet {
                init_logger();
            }
            crawl(args)
        }
        SubCommand::Page(args) => {
            init_logger();
            page(args)
        }
        SubCommand::Completion => {
            generate(Shell::Bash, &mut Args::command(), "rsscrawl", &mut io::stdout());
            Ok(())
        }
    }
}
