use std::fmt;

/// The kind of document a locator points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A local outline file listing feed subscriptions
    Opml,
    /// A remote RSS 2.0 feed
    Rss,
    /// A remote html page
    Html,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Opml => "opml",
            Self::Rss => "rss",
            Self::Html => "html",
        };
        f.write_str(s)
    }
}

/// One crawl target, a path or url along with how it was discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub locator: String,
    pub kind: Kind,
    /// Human readable title, possibly empty
    pub label: String,
    /// Html to html hops from the feed item, only meaningful for [`Kind::Html`]
    pub depth: usize,
}

impl Target {
    pub fn opml(path: impl Into<String>) -> Self {
        Self {
            locator: path.into(),
            kind: Kind::Opml,
            label: String::new(),
            depth: 0,
        }
    }

    pub fn rss(url: impl Into<String>) -> Self {
        Self {
            locator: url.into(),
            kind: Kind::Rss,
            label: String::new(),
            depth: 0,
        }
    }

    pub fn html(url: impl Into<String>, label: impl Into<String>, depth: usize) -> Self {
        Self {
            locator: url.into(),
            kind: Kind::Html,
            label: label.into(),
            depth,
        }
    }
}
