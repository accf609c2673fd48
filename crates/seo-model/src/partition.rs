use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only view of the normalized crawl a rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Every deduplicated row.
    All,
    /// Rows whose content type carries the HTML marker.
    Html,
}

impl Partition {
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
