// SPDX-License-Identifier: AGPL-3.0-or-later
//! File-name search for File Manager Kit
//!
//! Walks a directory tree once, matching file names (never directory names)
//! against a case-insensitive pattern, and stops as soon as the result cap
//! is reached. Entries that cannot be read or stat'ed are skipped.

use chrono::{DateTime, Utc};
use fmk_core::FmkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Default maximum number of results
pub const DEFAULT_LIMIT: usize = 100;

/// Search errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search path not found: {0}")]
    RootNotFound(String),

    #[error("Search task failed: {0}")]
    Task(String),
}

impl From<SearchError> for FmkError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::RootNotFound(path) => FmkError::NotFound(path),
            SearchError::Task(msg) => FmkError::Io(std::io::Error::new(std::io::ErrorKind::Other, msg)),
        }
    }
}

/// One matching file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Search query options
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Pattern matched against file names
    pub pattern: String,
    /// Directory the walk starts from
    pub root: PathBuf,
    /// Maximum number of results
    pub limit: usize,
    /// Interpret the pattern as a simple glob (`*.txt`, `name.*`, `*`)
    pub glob: bool,
}

impl SearchQuery {
    pub fn new(pattern: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            pattern: pattern.into(),
            root: root.into(),
            limit: DEFAULT_LIMIT,
            glob: false,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_glob(mut self, glob: bool) -> Self {
        self.glob = glob;
        self
    }
}

/// Results of one walk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub count: usize,
    pub search_path: PathBuf,
    /// The walk stopped at the limit with entries left unvisited. Those
    /// entries were not matched, so further results may or may not exist.
    pub truncated: bool,
}

/// Case-insensitive file-name matcher
#[derive(Debug, Clone)]
pub enum NameMatcher {
    Substring(String),
    Glob(String),
}

impl NameMatcher {
    pub fn new(pattern: &str, glob: bool) -> Self {
        let pattern = pattern.to_lowercase();
        if glob {
            NameMatcher::Glob(pattern)
        } else {
            NameMatcher::Substring(pattern)
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Substring(pattern) => name.to_lowercase().contains(pattern.as_str()),
            NameMatcher::Glob(pattern) => matches_glob(pattern, name),
        }
    }
}

/// Glob-style pattern matching
pub fn matches_glob(pattern: &str, name: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let name = name.to_lowercase();

    if pattern == "*" {
        return true;
    }

    if let Some(suffix) = pattern.strip_prefix("*.") {
        return name.ends_with(&format!(".{}", suffix));
    }

    if let Some(prefix) = pattern.strip_suffix(".*") {
        return name.starts_with(&format!("{}.", prefix));
    }

    name.contains(&pattern)
}

/// Walk `query.root` on the current thread
pub fn search_blocking(query: &SearchQuery) -> Result<SearchOutcome, SearchError> {
    if !query.root.exists() {
        return Err(SearchError::RootNotFound(query.root.display().to_string()));
    }

    let matcher = NameMatcher::new(&query.pattern, query.glob);
    let mut results = Vec::new();
    let mut truncated = false;

    let walker = WalkDir::new(&query.root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        if results.len() >= query.limit {
            truncated = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !matcher.matches(&name) {
            continue;
        }

        if let Some(result) = stat_match(entry.path(), &name) {
            results.push(result);
        }
    }

    tracing::debug!(
        "Search for {:?} under {} found {} result(s)",
        query.pattern,
        query.root.display(),
        results.len()
    );

    Ok(SearchOutcome {
        count: results.len(),
        results,
        search_path: query.root.clone(),
        truncated,
    })
}

/// Walk `query.root` on the blocking thread pool
pub async fn search(query: SearchQuery) -> Result<SearchOutcome, SearchError> {
    tokio::task::spawn_blocking(move || search_blocking(&query))
        .await
        .map_err(|e| SearchError::Task(e.to_string()))?
}

fn stat_match(path: &Path, name: &str) -> Option<SearchResult> {
    // Follows symlinks; links to directories are not files
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            tracing::debug!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };
    if meta.is_dir() {
        return None;
    }
    Some(SearchResult {
        name: name.to_string(),
        path: path.to_path_buf(),
        size: meta.len(),
        modified: meta.modified().ok().map(DateTime::<Utc>::from),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("docs/notes")).unwrap();
        fs::create_dir_all(root.join("report_dir")).unwrap();
        fs::write(root.join("Report.txt"), "a").unwrap();
        fs::write(root.join("docs/annual_report.md"), "bb").unwrap();
        fs::write(root.join("docs/notes/misc.txt"), "ccc").unwrap();
        fs::write(root.join("report_dir/data.csv"), "d").unwrap();
        dir
    }

    #[test]
    fn test_matches_glob() {
        assert!(matches_glob("*", "anything.txt"));
        assert!(matches_glob("*.txt", "file.txt"));
        assert!(matches_glob("*.TXT", "file.txt"));
        assert!(!matches_glob("*.txt", "file.pdf"));
        assert!(matches_glob("file.*", "file.txt"));
        assert!(!matches_glob("file.*", "filet.txt"));
        assert!(matches_glob("test", "my_test_file.txt"));
    }

    #[test]
    fn test_substring_matcher_case_insensitive() {
        let matcher = NameMatcher::new("REPORT", false);
        assert!(matcher.matches("annual_report.md"));
        assert!(!matcher.matches("misc.txt"));
    }

    #[test]
    fn test_search_matches_files_only() {
        let dir = tree();
        let outcome = search_blocking(&SearchQuery::new("report", dir.path())).unwrap();
        let mut names: Vec<_> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Report.txt", "annual_report.md"]);
        assert_eq!(outcome.count, 2);
        assert!(!outcome.truncated);
    }

    #[test]
    fn test_search_descends_into_non_matching_directories() {
        let dir = tree();
        let outcome = search_blocking(&SearchQuery::new("misc", dir.path())).unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.results[0].size, 3);
        assert!(outcome.results[0].path.ends_with("docs/notes/misc.txt"));
    }

    #[test]
    fn test_search_glob() {
        let dir = tree();
        let query = SearchQuery::new("*.txt", dir.path()).with_glob(true);
        let outcome = search_blocking(&query).unwrap();
        assert_eq!(outcome.count, 2);
    }

    #[test]
    fn test_search_cap() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..30 {
            fs::write(dir.path().join(format!("file{i}.log")), "").unwrap();
        }
        let query = SearchQuery::new("file", dir.path()).with_limit(10);
        let outcome = search_blocking(&query).unwrap();
        assert_eq!(outcome.count, 10);
        assert!(outcome.truncated);
    }

    #[test]
    fn test_search_truncation_means_walk_stopped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_match.txt"), "").unwrap();
        fs::write(dir.path().join("b_other.txt"), "").unwrap();

        let query = SearchQuery::new("match", dir.path()).with_limit(1);
        let outcome = search_blocking(&query).unwrap();
        assert_eq!(outcome.count, 1);
        assert!(outcome.truncated);

        let query = SearchQuery::new("match", dir.path()).with_limit(2);
        assert!(!search_blocking(&query).unwrap().truncated);
    }

    #[cfg(unix)]
    #[test]
    fn test_search_skips_entries_that_fail_to_stat() {
        let dir = tree();
        std::os::unix::fs::symlink(dir.path().join("gone.txt"), dir.path().join("report_link.txt"))
            .unwrap();

        let outcome = search_blocking(&SearchQuery::new("report", dir.path())).unwrap();
        let mut names: Vec<_> = outcome.results.iter().map(|r| r.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Report.txt", "annual_report.md"]);
    }

    #[test]
    fn test_search_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = search_blocking(&SearchQuery::new("x", dir.path().join("gone"))).unwrap_err();
        assert!(matches!(err, SearchError::RootNotFound(_)));
        assert!(FmkError::from(err).is_not_found());
    }

    #[tokio::test]
    async fn test_search_async() {
        let dir = tree();
        let outcome = search(SearchQuery::new("data", dir.path())).await.unwrap();
        assert_eq!(outcome.count, 1);
    }
}
