//! Value types returned by the git data service and consumed by the
//! resolver, explorer and commands. Serialized as camelCase JSON.
//!
//! - `commit`: Commit, CommitKind, FileStatus, LogResult
//! - `blame`: BlameLine
//! - `branch`: Branch
//! - `diff`: RenderedDiff, DiffHunk, DiffLine
//! - `repository`: RepositoryInfo

pub mod blame;
pub mod branch;
pub mod commit;
pub mod diff;
pub mod repository;

pub use blame::*;
pub use branch::*;
pub use commit::*;
pub use diff::*;
pub use repository::*;
