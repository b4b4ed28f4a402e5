use crate::target::Kind;

/// Why a visit stopped early without failing.
///
/// These are expected outcomes of crawling the open web. They are logged and
/// the branch is dropped, siblings are not affected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Skip {
    #[error("invalid {kind} locator {locator:?}")]
    InvalidLocator { kind: Kind, locator: String },

    #[error("status {0}")]
    Status(u16),

    #[error("content type {actual:?}, expected {expected}")]
    ContentType {
        expected: &'static str,
        actual: Option<String>,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no rss element")]
    MissingFeedRoot,

    #[error("unsupported rss version {0:?}")]
    UnsupportedVersion(Option<String>),

    #[error("depth {0} reached")]
    MaxDepth(usize),
}

impl Skip {
    /// Whether the skip is the normal end of a branch rather than a problem.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::MaxDepth(_))
    }
}
