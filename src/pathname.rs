/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Slash-separated path handling.
//!
//! `PathName` borrows the caller's string for iteration; no component
//! tokenizer copies or mutates the input.

use std::fmt::Display;

#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PathName(String);

impl Display for PathName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathName {
    fn from(value: &str) -> Self {
        PathName(value.to_owned())
    }
}

impl From<String> for PathName {
    fn from(value: String) -> Self {
        PathName(value)
    }
}

impl PathName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits into (parent, last-component-name). Panics on the root path;
    /// callers must check `is_root()` first.
    pub fn split(&self) -> (PathName, String) {
        let split_at = self.0.rfind('/').expect("path must start with '/'");
        let (parent, name) = (&self.0[..split_at], &self.0[split_at + 1..]);
        if parent.is_empty() {
            ("/".into(), name.to_owned())
        } else {
            (parent.into(), name.to_owned())
        }
    }

    /// Borrowing iterator over non-empty path components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Well-formedness: starts with '/', non-empty, and (unless root) does
    /// not end with a trailing slash. Empty components ("//") are rejected
    /// defensively.
    pub fn is_valid(&self) -> bool {
        if self.0.is_empty() || !self.0.starts_with('/') {
            return false;
        }
        if !self.is_root() && self.0.ends_with('/') {
            return false;
        }
        !self.0.contains("//")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_single_component() {
        let p: PathName = "/a".into();
        let (parent, name) = p.split();
        assert_eq!(parent.as_str(), "/");
        assert_eq!(name, "a");
    }

    #[test]
    fn splits_nested_component() {
        let p: PathName = "/d/f".into();
        let (parent, name) = p.split();
        assert_eq!(parent.as_str(), "/d");
        assert_eq!(name, "f");
    }

    #[test]
    fn components_iterates_without_empties() {
        let p: PathName = "/d/f".into();
        let parts: Vec<&str> = p.components().collect();
        assert_eq!(parts, vec!["d", "f"]);
    }

    #[test]
    fn root_is_valid_and_special() {
        let p: PathName = "/".into();
        assert!(p.is_valid());
        assert!(p.is_root());
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(!PathName::from("").is_valid());
        assert!(!PathName::from("a").is_valid());
        assert!(!PathName::from("/a/").is_valid());
        assert!(!PathName::from("/a//b").is_valid());
    }
}
