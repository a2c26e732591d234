//! PathAllocator - Where a mirror's clone lives on disk
//!
//! ```text
//! <base_root>/<stamp>_<slug>
//!              │       └─ host + path, separators → "_", only [A-Za-z._-], ≤ 65 chars
//!              └─ time-ordered token from a StampSource
//! ```
//!
//! Pure computation. Whether the path is free on disk is checked by the
//! lifecycle, which asks for a fresh stamp when it is not.

use crate::model::remote_url::ParsedUrl;
use crate::model::stamp::StampToken;

/// Longest slug kept in a directory name
pub const SLUG_MAX_LENGTH: usize = 65;

/// Result of an allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Basename of the URL path without its extension
    pub identifier_suggestion: String,
    /// Absolute path for the bare clone
    pub root_url: String,
}

/// Derives storage paths and identifier suggestions from URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct PathAllocator;

impl PathAllocator {
    pub fn new() -> Self {
        Self
    }

    pub fn allocate(&self, base_root: &str, url: &ParsedUrl, stamp: &StampToken) -> Allocation {
        let base = base_root.trim_end_matches('/');
        let slug = slug(&format!("{}{}", url.host(), url.path()));

        Allocation {
            identifier_suggestion: identifier_suggestion(url.path()),
            root_url: format!("{}/{}_{}", base, stamp, slug),
        }
    }
}

/// `/group/my-repo.git` → `my-repo`
pub fn identifier_suggestion(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', '\\']);
    let base = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed);

    match base.rfind('.') {
        Some(idx) if idx > 0 => base[..idx].to_string(),
        _ => base.to_string(),
    }
}

/// Filesystem-safe rendering of `host + path`.
///
/// Digits are dropped along with every other character outside
/// `[A-Za-z._-]`; the stamp already carries the numeric part of the name.
pub fn slug(host_and_path: &str) -> String {
    let mut collapsed = String::with_capacity(host_and_path.len());
    let mut in_separator = false;
    for c in host_and_path.chars() {
        if c == '/' || c == '\\' {
            if !in_separator {
                collapsed.push('_');
            }
            in_separator = true;
        } else {
            collapsed.push(c);
            in_separator = false;
        }
    }

    collapsed
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || matches!(c, '.' | '_' | '-'))
        .take(SLUG_MAX_LENGTH)
        .collect()
}
