pub mod blame;
pub mod cache;
pub mod diff;
pub mod history;
pub mod repository;
pub mod resolver;
pub mod service;
pub mod uri;

pub use cache::LogDetail;
pub use diff::GitDiffRenderer;
pub use repository::GitRepository;
pub use resolver::{BlameResolver, BlameTarget};
pub use service::{GitDataSource, GitService};
pub use uri::RevisionUri;
