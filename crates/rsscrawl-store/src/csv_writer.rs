use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvWriterConfig {
    #[serde(default = "default_csv_delimiter")]
    pub delimiter: char,
    /// Escape quotes with this char instead of doubling them
    #[serde(default)]
    pub escape: Option<char>,
    #[serde(default = "default_csv_terminator")]
    pub terminator: CsvTerminator,
    #[serde(default = "default_csv_headers")]
    pub headers: bool,
}

impl Default for CsvWriterConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            escape: None,
            terminator: CsvTerminator::Any('\n'),
            headers: true,
        }
    }
}

fn default_csv_delimiter() -> char {
    CsvWriterConfig::default().delimiter
}

fn default_csv_terminator() -> CsvTerminator {
    CsvWriterConfig::default().terminator
}

fn default_csv_headers() -> bool {
    CsvWriterConfig::default().headers
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvTerminator {
    CRLF,
    Any(char),
}

impl From<CsvTerminator> for csv::Terminator {
    fn from(source: CsvTerminator) -> Self {
        match source {
            CsvTerminator::CRLF => Self::CRLF,
            CsvTerminator::Any(c) => Self::Any(c as u8),
        }
    }
}

impl CsvWriterConfig {
    pub fn writer<W: io::Write>(&self, wtr: W) -> csv::Writer<W> {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter as u8)
            .terminator(self.terminator.into())
            .has_headers(self.headers);
        match self.escape {
            Some(escape) => builder.double_quote(false).escape(escape as u8),
            None => builder.double_quote(true),
        };
        builder.from_writer(wtr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(config: &CsvWriterConfig) -> String {
        let mut wtr = config.writer(vec![]);
        wtr.write_record(["a \"quoted\" word", "b"]).unwrap();
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn default_doubles_quotes() {
        assert_eq!(
            write(&CsvWriterConfig::default()),
            "\"a \"\"quoted\"\" word\",b\n"
        );
    }

    #[test]
    fn custom_delimiter_escape_terminator() {
        let config = CsvWriterConfig {
            delimiter: ';',
            escape: Some('\\'),
            terminator: CsvTerminator::CRLF,
            headers: false,
        };
        assert_eq!(write(&config), "\"a \\\"quoted\\\" word\";b\r\n");
    }
}
