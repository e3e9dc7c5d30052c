//! Absolute project paths and the relative-path algebra used to resolve
//! descriptor references such as `../../common/`.
//!
//! Paths are plain `/`-separated strings that always end in a separator.
//! A [`TrackedPath`] additionally remembers how many times it may still be
//! ascended; asking for more is an error rather than a silent clamp at the
//! filesystem root.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::errors::{Error, Result};

const SEPARATOR: char = '/';

/// Canonical absolute directory of a project, always `/`-terminated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        ProjectPath(with_trailing_separator(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory name without the trailing separator, for display.
    pub fn file_name(&self) -> &str {
        self.0
            .trim_end_matches(SEPARATOR)
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or_default()
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ProjectPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectPath {
    fn from(path: &str) -> Self {
        ProjectPath::new(path)
    }
}

impl From<String> for ProjectPath {
    fn from(path: String) -> Self {
        ProjectPath::new(path)
    }
}

/// An absolute path plus the number of ascensions it still permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPath {
    path: String,
    depth: usize,
}

impl TrackedPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let mut tracked = TrackedPath {
            path: String::new(),
            depth: 0,
        };
        tracked.set(path.as_ref());
        tracked
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn into_string(self) -> String {
        self.path
    }

    /// Replace the path. Depth is the segment count below the root.
    pub fn set(&mut self, path: &str) {
        let path = with_trailing_separator(path);
        self.depth = path.matches(SEPARATOR).count().saturating_sub(1);
        self.path = path;
    }

    /// Resolve `relative` against this path in place.
    ///
    /// Absolute input replaces the path. Otherwise leading `./` are dropped,
    /// each leading `../` ascends once, and the remainder is appended.
    /// Depth grows by exactly one per append, however many segments the
    /// remainder has.
    pub fn append(&mut self, relative: &str) -> Result<()> {
        let relative = with_trailing_separator(relative);
        if is_absolute(&relative) {
            self.set(&relative);
            return Ok(());
        }

        let (ascents, rest) = split_ascents(&relative, !self.path.is_empty());
        self.check_ascents(ascents)?;

        for _ in 0..ascents {
            self.ascend()?;
        }

        self.path.push_str(rest);
        self.depth += 1;
        Ok(())
    }

    /// The path [`append`](Self::append) would produce, without changing `self`.
    pub fn appended(&self, relative: &str) -> Result<String> {
        let relative = with_trailing_separator(relative);
        if is_absolute(&relative) {
            return Ok(relative);
        }

        let (ascents, rest) = split_ascents(&relative, !self.path.is_empty());
        self.check_ascents(ascents)?;

        let mut path = self.path.clone();
        for _ in 0..ascents {
            path = ascended(&path);
        }
        path.push_str(rest);
        Ok(path)
    }

    /// Drop the last segment. Fails without change once depth is zero.
    pub fn ascend(&mut self) -> Result<()> {
        self.check_ascents(1)?;

        match last_separator(&self.path) {
            Some(index) => {
                self.path.truncate(index + 1);
                self.depth -= 1;
            }
            None => {
                self.path.clear();
                self.depth = 0;
            }
        }
        Ok(())
    }

    fn check_ascents(&self, requested: usize) -> Result<()> {
        if requested > self.depth {
            return Err(Error::PathAscension {
                path: self.path.clone(),
                requested,
                depth: self.depth,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TrackedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// `path` with its last segment removed; empty when no separator remains.
pub fn ascended(path: &str) -> String {
    match last_separator(path) {
        Some(index) => path[..=index].to_string(),
        None => String::new(),
    }
}

/// Append a separator unless one is already there.
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{}{}", path, SEPARATOR)
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Index of the separator before the last segment, ignoring a trailing one.
fn last_separator(path: &str) -> Option<usize> {
    match path.strip_suffix(SEPARATOR) {
        Some(stripped) => stripped.rfind(SEPARATOR),
        None => path.rfind(SEPARATOR),
    }
}

/// Count and strip leading `../`, dropping `./` along the way.
fn split_ascents(relative: &str, strip: bool) -> (usize, &str) {
    let mut rest = relative;
    let mut ascents = 0;

    if !strip {
        return (0, rest);
    }

    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            ascents += 1;
            rest = stripped;
        } else {
            return (ascents, rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_computes_depth() {
        let path = TrackedPath::new("/work/lib");
        assert_eq!(path.as_str(), "/work/lib/");
        assert_eq!(path.depth(), 2);

        assert_eq!(TrackedPath::new("/").depth(), 0);
        assert_eq!(TrackedPath::new("/a/b/c/").depth(), 3);
    }

    #[test]
    fn test_append_relative() {
        let mut path = TrackedPath::new("/work/app/");
        path.append("../lib").unwrap();
        assert_eq!(path.as_str(), "/work/lib/");
        assert_eq!(path.depth(), 2);

        path.append("./src/include").unwrap();
        assert_eq!(path.as_str(), "/work/lib/src/include/");
        // one per append, not one per segment
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn test_append_absolute_replaces() {
        let mut path = TrackedPath::new("/work/app/");
        path.append("/opt/shared").unwrap();
        assert_eq!(path.as_str(), "/opt/shared/");
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn test_append_parent_then_ascend_matches_ascend_then_append() {
        let mut direct = TrackedPath::new("/a/b/c/");
        direct.append("../../x").unwrap();

        let mut stepwise = TrackedPath::new("/a/b/c/");
        stepwise.ascend().unwrap();
        stepwise.ascend().unwrap();
        stepwise.append("x").unwrap();

        assert_eq!(direct, stepwise);
        assert_eq!(direct.as_str(), "/a/x/");
    }

    #[test]
    fn test_ascension_beyond_depth_fails() {
        let mut path = TrackedPath::new("/work/");
        let err = path.append("../../x").unwrap_err();
        assert!(matches!(
            err,
            Error::PathAscension {
                requested: 2,
                depth: 1,
                ..
            }
        ));
        // rejected, not truncated
        assert_eq!(path.as_str(), "/work/");

        path.ascend().unwrap();
        assert_eq!(path.as_str(), "/");
        assert!(matches!(path.ascend(), Err(Error::PathAscension { .. })));
        assert_eq!(path.as_str(), "/");
    }

    #[test]
    fn test_appended_does_not_mutate() {
        for relative in ["../lib", "./x/y", "../../z/", "/abs/dir", "plain"] {
            let original = TrackedPath::new("/work/apps/app/");
            let pure = original.appended(relative).unwrap();

            let mut mutated = original.clone();
            mutated.append(relative).unwrap();

            assert_eq!(pure, mutated.as_str(), "appending {relative}");
            assert_eq!(original.as_str(), "/work/apps/app/");
        }
    }

    #[test]
    fn test_appended_rejects_over_ascension() {
        let path = TrackedPath::new("/work/");
        assert!(path.appended("../../elsewhere").is_err());
    }

    #[test]
    fn test_ascended() {
        assert_eq!(ascended("/work/lib/"), "/work/");
        assert_eq!(ascended("/work/lib"), "/work/");
        assert_eq!(ascended("/"), "");
        assert_eq!(ascended("lib"), "");
    }

    #[test]
    fn test_ascend_without_separator_clears() {
        let mut path = TrackedPath::new("/");
        path.append("./").unwrap();
        assert_eq!(path.depth(), 1);

        path.ascend().unwrap();
        assert_eq!(path.as_str(), "");
        assert_eq!(path.depth(), 0);
    }

    #[test]
    fn test_hidden_directory_is_not_a_marker() {
        let mut path = TrackedPath::new("/work/");
        path.append(".config").unwrap();
        assert_eq!(path.as_str(), "/work/.config/");
    }

    #[test]
    fn test_project_path_normalizes() {
        assert_eq!(ProjectPath::new("/work/lib"), ProjectPath::new("/work/lib/"));
        assert_eq!(ProjectPath::new("/work/lib").file_name(), "lib");
    }
}
