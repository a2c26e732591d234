//! StampToken - The time-ordered prefix of a mirror's storage directory

/// A non-empty run of ASCII digits, normally `YYYYMMDDhhmmssmmm`.
///
/// Tokens are issued by a [`crate::gateway::storage::StampSource`], which is
/// responsible for never handing out the same token twice in one process.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StampToken(String);

impl StampToken {
    /// Returns `None` unless `token` is all ASCII digits.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(token))
    }

    pub fn from_number(value: u64) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for StampToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
