use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// The maximum number of visits in flight at once
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: NonZeroUsize,

    /// Html pages reached at this many hops from a feed item are not fetched
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            concurrency_limit: default_concurrency_limit(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_user_agent() -> String {
    String::from("rsscrawl")
}

fn default_concurrency_limit() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN)
}

fn default_max_depth() -> usize {
    1
}
