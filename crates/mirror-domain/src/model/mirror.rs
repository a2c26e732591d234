//! MirrorRepository - A read-only local copy of a remote git repository
//!
//! A mirror is an Entity. Its identity is the `identifier`; its `url` and
//! `root_url` never change once it has been persisted.
//!
//! Construction goes through [`MirrorDraft`], which the lifecycle fills in
//! step by step and only turns into a [`MirrorRepository`] once every step
//! has succeeded.

/// Longest identifier accepted by the registry
pub const IDENTIFIER_MAX_LENGTH: usize = 255;

/// `[a-z][a-z0-9_-]*`
pub fn is_valid_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => chars.all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
        }),
        _ => false,
    }
}

/// What a caller hands in to create a mirror
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewMirror {
    pub url: String,
    pub identifier: Option<String>,
}

impl NewMirror {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            identifier: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }
}

/// A mirror that is being created and has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorDraft {
    url: String,
    identifier: String,
    root_url: String,
}

impl MirrorDraft {
    pub fn new(request: NewMirror) -> Self {
        Self {
            url: request.url.trim().to_string(),
            identifier: request.identifier.unwrap_or_default().trim().to_string(),
            root_url: String::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// Fill in the identifier from a suggestion.
    ///
    /// Only applies when no identifier was given and the suggestion matches
    /// the identifier pattern. Returns whether it was applied.
    pub fn suggest_identifier(&mut self, suggestion: &str) -> bool {
        if !self.identifier.is_empty() || !is_valid_identifier(suggestion) {
            return false;
        }
        self.identifier = suggestion.to_string();
        true
    }

    /// Set the storage path. A draft's path can be set once.
    pub fn assign_root_url(&mut self, root_url: impl Into<String>) -> bool {
        if !self.root_url.is_empty() {
            return false;
        }
        self.root_url = root_url.into();
        true
    }

    pub fn into_mirror(self) -> MirrorRepository {
        MirrorRepository {
            url: self.url,
            identifier: self.identifier,
            root_url: self.root_url,
        }
    }
}

/// MirrorRepository - The persisted entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRepository {
    url: String,
    identifier: String,
    root_url: String,
}

impl MirrorRepository {
    /// Human readable type label
    pub const SCM_NAME: &'static str = "Git Mirror";

    /// Rebuild a mirror from stored fields
    pub fn restore(
        url: impl Into<String>,
        identifier: impl Into<String>,
        root_url: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            identifier: identifier.into(),
            root_url: root_url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Local path of the bare clone
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn scm_name(&self) -> &'static str {
        Self::SCM_NAME
    }
}

impl core::fmt::Display for MirrorRepository {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.identifier, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_pattern() {
        assert!(is_valid_identifier("my-repo"));
        assert!(is_valid_identifier("a"));
        assert!(is_valid_identifier("repo_2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("My-Repo"));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("-repo"));
        assert!(!is_valid_identifier("repo.git"));
    }

    #[test]
    fn test_suggestion_only_fills_blank_identifier() {
        let mut draft = MirrorDraft::new(NewMirror::new("https://example.com/a.git"));
        assert!(draft.suggest_identifier("a"));
        assert_eq!(draft.identifier(), "a");

        let mut named = MirrorDraft::new(
            NewMirror::new("https://example.com/a.git").with_identifier("chosen"),
        );
        assert!(!named.suggest_identifier("a"));
        assert_eq!(named.identifier(), "chosen");
    }

    #[test]
    fn test_invalid_suggestion_leaves_identifier_blank() {
        let mut draft = MirrorDraft::new(NewMirror::new("https://example.com/My.Repo.git"));
        assert!(!draft.suggest_identifier("My.Repo"));
        assert_eq!(draft.identifier(), "");
    }

    #[test]
    fn test_root_url_assigned_once() {
        let mut draft = MirrorDraft::new(NewMirror::new("https://example.com/a.git"));
        assert!(draft.assign_root_url("/srv/mirrors/1_a"));
        assert!(!draft.assign_root_url("/srv/mirrors/2_a"));

        let mirror = draft.into_mirror();
        assert_eq!(mirror.root_url(), "/srv/mirrors/1_a");
        assert_eq!(mirror.scm_name(), "Git Mirror");
    }
}
