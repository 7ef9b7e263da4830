//! Revision addressing.
//!
//! A `RevisionUri` names one file in one repository at one revision, plus the
//! line offset of the view it came from. Revision views are encoded as
//!
//! ```text
//! revlens:src/main.rs?path=src%2Fmain.rs&repo=%2Fhome%2Fme%2Fproj&sha=abc123&offset=2
//! ```
//!
//! The text before `?` is only a label; everything needed to decode the uri
//! lives in the query. Plain paths and `file://` urls decode as working-copy
//! uris with no offset.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::git::service::GitDataSource;
use crate::models::Commit;

pub const SCHEME: &str = "revlens";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionUri {
    /// Path relative to `repo_path`, or absolute when the file is not in a repository
    pub file_path: String,
    pub repo_path: Option<String>,
    /// Empty for the working copy
    #[serde(default)]
    pub sha: String,
    /// Lines the view is shifted by relative to the real file
    #[serde(default)]
    pub offset: u32,
}

/// What an editor-visible location points at before repository lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Revision(RevisionUri),
    File(PathBuf),
}

impl RevisionUri {
    pub fn working(repo_path: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            repo_path: Some(repo_path.into()),
            sha: String::new(),
            offset: 0,
        }
    }

    pub fn for_commit(commit: &Commit) -> Self {
        Self {
            file_path: commit.file_name.clone(),
            repo_path: Some(commit.repo_path.clone()),
            sha: commit.sha.clone(),
            offset: 0,
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn is_working(&self) -> bool {
        self.sha.is_empty()
    }

    pub fn absolute_path(&self) -> PathBuf {
        match &self.repo_path {
            Some(repo) => Path::new(repo).join(&self.file_path),
            None => PathBuf::from(&self.file_path),
        }
    }

    /// Translates a view line into blame coordinates. `None` when the line
    /// lies above the start of the real file.
    pub fn blame_line(&self, line: u32) -> Option<u32> {
        line.checked_sub(self.offset)
    }

    /// Translates a blame line back into view coordinates.
    pub fn view_line(&self, blame_line: u32) -> u32 {
        blame_line + self.offset
    }

    pub fn to_uri_string(&self) -> Result<String> {
        let mut url = Url::parse(&format!("{SCHEME}:{}", self.file_path.replace('\\', "/")))
            .map_err(|e| AppError::InvalidUri(format!("{}: {e}", self.file_path)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("path", &self.file_path);
            if let Some(repo) = &self.repo_path {
                query.append_pair("repo", repo);
            }
            query.append_pair("sha", &self.sha);
            query.append_pair("offset", &self.offset.to_string());
        }
        Ok(url.to_string())
    }

    /// Decodes a `revlens:` uri without touching the filesystem.
    pub fn parse(uri: &str) -> Result<Self> {
        match Self::locate(uri)? {
            Location::Revision(revision) => Ok(revision),
            Location::File(path) => Err(AppError::InvalidUri(format!(
                "{} is not a {SCHEME} uri",
                path.display()
            ))),
        }
    }

    /// Resolves any editor-visible location. File locations are looked up
    /// against the repository that contains them; a file outside every
    /// repository keeps its absolute path and no `repo_path`.
    pub async fn from_uri(uri: &str, git: &dyn GitDataSource) -> Result<Self> {
        let path = match Self::locate(uri)? {
            Location::Revision(revision) => return Ok(revision),
            Location::File(path) => path,
        };

        let Some(repo_path) = git.repo_path_for_file(&path).await? else {
            return Ok(Self {
                file_path: path.to_string_lossy().to_string(),
                repo_path: None,
                sha: String::new(),
                offset: 0,
            });
        };

        let file_path = relative_to(&path, Path::new(&repo_path));
        Ok(Self::working(repo_path, file_path))
    }

    fn locate(uri: &str) -> Result<Location> {
        if uri.trim().is_empty() {
            return Err(AppError::InvalidUri("empty uri".to_string()));
        }

        let url = match Url::parse(uri) {
            // Single letter schemes are Windows drive letters.
            Ok(url) if url.scheme().len() > 1 => url,
            _ => return Ok(Location::File(PathBuf::from(uri))),
        };

        match url.scheme() {
            "file" => url
                .to_file_path()
                .map(Location::File)
                .map_err(|_| AppError::InvalidUri(uri.to_string())),
            SCHEME => {
                let mut file_path = None;
                let mut repo_path = None;
                let mut sha = String::new();
                let mut offset = 0;
                for (key, value) in url.query_pairs() {
                    match key.as_ref() {
                        "path" => file_path = Some(value.into_owned()),
                        "repo" => repo_path = Some(value.into_owned()),
                        "sha" => sha = value.into_owned(),
                        "offset" => {
                            offset = value
                                .parse()
                                .map_err(|_| AppError::InvalidUri(format!("bad offset in {uri}")))?
                        }
                        _ => {}
                    }
                }
                let file_path = file_path
                    .ok_or_else(|| AppError::InvalidUri(format!("missing path in {uri}")))?;
                Ok(Location::Revision(Self {
                    file_path,
                    repo_path,
                    sha,
                    offset,
                }))
            }
            other => Err(AppError::InvalidUri(format!("unsupported scheme {other}"))),
        }
    }
}

/// `path` relative to `root` with forward slashes, as git stores it.
pub fn relative_to(path: &Path, root: &Path) -> String {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let relative = canonical
        .strip_prefix(root)
        .or_else(|_| path.strip_prefix(root))
        .unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revision_uri_survives_encoding() {
        let uri = RevisionUri {
            file_path: "src/some file.rs".into(),
            repo_path: Some("/home/me/proj".into()),
            sha: "abc123".into(),
            offset: 3,
        };
        let encoded = uri.to_uri_string().unwrap();
        assert!(encoded.starts_with("revlens:"));
        assert_eq!(RevisionUri::parse(&encoded).unwrap(), uri);
    }

    #[test]
    fn blame_line_subtracts_offset() {
        let uri = RevisionUri::working("/repo", "a.rs").with_offset(2);
        assert_eq!(uri.blame_line(5), Some(3));
        assert_eq!(uri.blame_line(2), Some(0));
        assert_eq!(uri.blame_line(1), None);
        assert_eq!(uri.view_line(3), 5);
    }

    #[test]
    fn plain_paths_are_file_locations() {
        assert_eq!(
            RevisionUri::locate("/tmp/x.rs").unwrap(),
            Location::File(PathBuf::from("/tmp/x.rs"))
        );
        assert_eq!(
            RevisionUri::locate("file:///tmp/x.rs").unwrap(),
            Location::File(PathBuf::from("/tmp/x.rs"))
        );
    }

    #[test]
    fn parse_rejects_plain_paths_and_unknown_schemes() {
        assert!(matches!(RevisionUri::parse("/tmp/x.rs"), Err(AppError::InvalidUri(_))));
        assert!(matches!(
            RevisionUri::parse("https://example.com/x"),
            Err(AppError::InvalidUri(_))
        ));
        assert!(matches!(RevisionUri::parse(""), Err(AppError::InvalidUri(_))));
    }

    #[test]
    fn parse_requires_path_and_numeric_offset() {
        assert!(RevisionUri::parse("revlens:x?sha=abc").is_err());
        assert!(RevisionUri::parse("revlens:x?path=x&offset=-1").is_err());
        let uri = RevisionUri::parse("revlens:x?path=x").unwrap();
        assert!(uri.is_working());
        assert_eq!(uri.offset, 0);
        assert_eq!(uri.repo_path, None);
    }

    #[test]
    fn relative_to_uses_forward_slashes() {
        let rel = relative_to(Path::new("/repo/src/lib.rs"), Path::new("/repo"));
        assert_eq!(rel, "src/lib.rs");
    }
}
