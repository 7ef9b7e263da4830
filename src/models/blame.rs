//! Blame data transfer objects.
//!
//! A single blamed line together with the commit that last touched it.

use serde::{Deserialize, Serialize};

use super::Commit;

/// Blame information for a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLine {
    /// Line number in the blamed (working) file, zero-based
    pub line: u32,
    /// Line number in the blamed commit's version of the file, zero-based
    pub original_line: u32,
    /// Commit that last modified this line
    pub commit: Commit,
}
