use std::collections::HashMap;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use rsscrawl_crawler::Scorer;

/// Scores text by the entropy of the words it contains.
///
/// Each distinct word contributes its entropy times its number of
/// occurrences, unknown words contribute nothing.
#[derive(Debug, Clone, Default)]
pub struct WordEntropyScore {
    entropy: HashMap<String, f64>,
}

impl WordEntropyScore {
    /// Loads a headerless `word,entropy` csv file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = fs_err::File::open(path)?;
        Self::from_reader(file).with_context(|| format!("Invalid entropy file {}", path.display()))
    }

    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let mut entropy = HashMap::new();
        for record in rdr.deserialize() {
            let (word, value): (String, f64) = record?;
            entropy.insert(word, value);
        }

        Ok(Self { entropy })
    }

    pub fn len(&self) -> usize {
        self.entropy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entropy.is_empty()
    }
}

impl FromIterator<(String, f64)> for WordEntropyScore {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entropy: iter.into_iter().collect(),
        }
    }
}

impl Scorer for WordEntropyScore {
    fn score(&self, text: &str) -> f64 {
        let mut counts = HashMap::<String, usize>::new();
        for word in text.split_whitespace() {
            *counts.entry(normalize(word)).or_default() += 1;
        }

        counts
            .iter()
            .map(|(word, &count)| count as f64 * self.entropy.get(word).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Lowercases `word` and keeps only ascii letters and apostrophes.
fn normalize(word: &str) -> String {
    word.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || *c == '\'')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> WordEntropyScore {
        WordEntropyScore::from_reader("rust,2.5\ncrab, 1.0\ndon't,0.5\n".as_bytes()).unwrap()
    }

    #[test]
    fn normalized_words() {
        assert_eq!(normalize("Rust!"), "rust");
        assert_eq!(normalize("DON'T"), "don't");
        assert_eq!(normalize("42"), "");
        assert_eq!(normalize("Café"), "caf");
        assert_eq!(normalize("a b"), "ab");
    }

    #[test]
    fn weighted_by_occurrences() {
        let scorer = scorer();
        assert_eq!(scorer.len(), 3);
        assert_eq!(scorer.score("Rust rust, crab."), 6.0);
        assert_eq!(scorer.score("Don't panic"), 0.5);
        assert_eq!(scorer.score(""), 0.0);
        assert_eq!(scorer.score("unknown words only"), 0.0);
    }

    #[test]
    fn from_entries() {
        let scorer: WordEntropyScore = [("hello".to_string(), 1.5)].into_iter().collect();
        assert_eq!(scorer.score("hello HELLO world"), 3.0);
    }

    #[test]
    fn invalid_entropy() {
        assert!(WordEntropyScore::from_reader("rust,high\n".as_bytes()).is_err());
    }
}
