use std::fs;

use rsscrawl_crawler::Sink;
use rsscrawl_store::{open_sink, CsvReport, CsvWriterConfig, HtmlReport, OutputFormat};

#[test]
fn html_report_ranks_by_score() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.html");

    let report = HtmlReport::new(&path);
    report.record("low", "http://x/low", 1.0);
    report.record("", "http://x/untitled", 3.0);
    report.record("dropped", "", 9.0);
    report.flush().unwrap();

    let html = fs::read_to_string(&path).unwrap();
    let untitled = html.find("http://x/untitled</a>").unwrap();
    let low = html.find(">low</a>").unwrap();
    assert!(untitled < low);
    assert!(!html.contains("dropped"));
}

#[test]
fn csv_report_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");

    let report = CsvReport::new(Some(path.clone()), CsvWriterConfig::default());
    report.record("First, with comma", "http://x/a", 0.5);
    report.record("Second", "http://x/b", 2.0);
    report.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "name,url,score\nSecond,http://x/b,2.0\n\"First, with comma\",http://x/a,0.5\n"
    );
}

#[test]
fn html_sink_needs_output() {
    assert!(open_sink(OutputFormat::Html, None, CsvWriterConfig::default()).is_err());
    assert!(open_sink(OutputFormat::Csv, None, CsvWriterConfig::default()).is_ok());

    let sink = open_sink(OutputFormat::Log, None, CsvWriterConfig::default()).unwrap();
    sink.record("t", "http://x/a", 1.0);
    sink.flush().unwrap();
}
