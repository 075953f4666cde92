//! Platform-owned path patterns
//!
//! Patterns live in `.provisioning/system-paths.txt`, one per line:
//! - `*` matches within one path segment
//! - `**` matches across segments
//! - a trailing `/` matches the directory and everything below it
//! - anything else is an exact relative path

use crate::context::PathClassifier;
use crate::error::{Error, Result};
use crate::layout::{SYSTEM_PATHS_FILE, provisioning_dir};
use regex::RegexSet;
use std::fs;
use std::path::Path;

/// Compiled set of system path patterns
#[derive(Debug, Clone)]
pub struct SystemPaths {
    patterns: Vec<String>,
    set: RegexSet,
}

impl SystemPaths {
    /// Compile a list of patterns
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty() && !p.starts_with('#'))
            .collect();

        let regexes: Vec<String> = patterns.iter().map(|p| pattern_to_regex(p)).collect();
        let set = RegexSet::new(&regexes).map_err(|source| Error::Pattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self { patterns, set })
    }

    /// An empty set; nothing is a system path
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: RegexSet::empty(),
        }
    }

    /// Load the patterns recorded under an installation or candidate root
    ///
    /// A missing file yields an empty set.
    pub fn load(root: &Path) -> Result<Self> {
        let path = provisioning_dir(root).join(SYSTEM_PATHS_FILE);
        if !path.exists() {
            log::debug!("No system paths recorded at {}", path.display());
            return Ok(Self::empty());
        }
        let content = fs::read_to_string(&path)?;
        Self::new(content.lines())
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }
}

impl PathClassifier for SystemPaths {
    fn is_system_path(&self, path: &str) -> bool {
        self.matches(path)
    }
}

fn pattern_to_regex(pattern: &str) -> String {
    let (body, dir_prefix) = match pattern.strip_suffix('/') {
        Some(body) => (body, true),
        None => (pattern, false),
    };

    let mut out = String::from("^");
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '*' {
            if chars.peek() == Some(&'*') {
                chars.next();
                out.push_str(".*");
            } else {
                out.push_str("[^/]*");
            }
        } else {
            out.push_str(&regex::escape(&c.to_string()));
        }
    }

    if dir_prefix {
        out.push_str("(/.*)?");
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_exact_pattern() {
        let paths = SystemPaths::new(["bin/run.sh"]).unwrap();
        assert!(paths.matches("bin/run.sh"));
        assert!(!paths.matches("bin/run.sh.bak"));
        assert!(!paths.matches("xbin/run.sh"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let paths = SystemPaths::new(["modules/*.jar"]).unwrap();
        assert!(paths.matches("modules/core.jar"));
        assert!(!paths.matches("modules/sub/core.jar"));
    }

    #[test]
    fn test_double_star_crosses_segments() {
        let paths = SystemPaths::new(["modules/**.jar"]).unwrap();
        assert!(paths.matches("modules/sub/deep/core.jar"));
        assert!(!paths.matches("conf/core.jar"));
    }

    #[test]
    fn test_directory_prefix() {
        let paths = SystemPaths::new(["lib/"]).unwrap();
        assert!(paths.matches("lib"));
        assert!(paths.matches("lib/a/b.so"));
        assert!(!paths.matches("library/b.so"));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let paths = SystemPaths::new(["# platform", "", "  bin/run.sh  "]).unwrap();
        assert_eq!(paths.patterns(), &["bin/run.sh".to_string()]);
    }

    #[test]
    fn test_regex_metacharacters_escaped() {
        let paths = SystemPaths::new(["conf/a+b.(x)"]).unwrap();
        assert!(paths.matches("conf/a+b.(x)"));
        assert!(!paths.matches("conf/aab.(x)"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let paths = SystemPaths::load(tmp.path()).unwrap();
        assert!(paths.is_empty());
        assert!(!paths.is_system_path("anything"));
    }

    #[test]
    fn test_load_from_provisioning_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = provisioning_dir(tmp.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SYSTEM_PATHS_FILE), "bin/\nmodules/*.jar\n").unwrap();

        let paths = SystemPaths::load(tmp.path()).unwrap();
        assert!(paths.is_system_path("bin/standalone.sh"));
        assert!(paths.is_system_path("modules/core.jar"));
        assert!(!paths.is_system_path("conf/server.xml"));
    }
}
