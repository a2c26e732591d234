//! Remote URL - Parsing and classification of repository URLs
//!
//! Accepted shapes:
//!
//! - `<scheme>://[user@]host[:port]/path` (ssh, git, http, https, file, ...)
//! - `[user@]host:path` (scp-like, treated as ssh)
//! - anything else is a local filesystem path
//!
//! Parsing only fails on malformed syntax. Whether a URL is usable for a
//! mirror is decided by [`ParsedUrl::is_remote`] and the remote checker.

/// Schemes that address a network endpoint.
const REMOTE_SCHEMES: &[&str] = &["ssh", "git", "http", "https", "git+ssh", "ssh+git"];

/// A repository URL split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    raw: String,
    scheme: String,
    user: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
}

impl ParsedUrl {
    /// The input as given, minus surrounding whitespace
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lowercased scheme; `ssh` for scp-like input, `file` for local paths
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Lowercased host, empty for local paths
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// True when the URL points at a network endpoint with a host.
    pub fn is_remote(&self) -> bool {
        !self.host.is_empty() && REMOTE_SCHEMES.contains(&self.scheme.as_str())
    }
}

impl core::fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Errors that can occur while parsing a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    Empty,
    InvalidCharacter { ch: char },
    InvalidScheme { scheme: String },
    InvalidHost { host: String },
    InvalidPort { port: String },
}

impl core::fmt::Display for UrlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UrlError::Empty => write!(f, "url is empty"),
            UrlError::InvalidCharacter { ch } => {
                write!(f, "url contains invalid character {:?}", ch)
            }
            UrlError::InvalidScheme { scheme } => write!(f, "invalid url scheme: '{}'", scheme),
            UrlError::InvalidHost { host } => write!(f, "invalid url host: '{}'", host),
            UrlError::InvalidPort { port } => write!(f, "invalid url port: '{}'", port),
        }
    }
}

impl std::error::Error for UrlError {}

/// Parse a repository URL.
pub fn parse_url(raw: &str) -> Result<ParsedUrl, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }
    if let Some(ch) = trimmed.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(UrlError::InvalidCharacter { ch });
    }

    if let Some((scheme, rest)) = trimmed.split_once("://") {
        return parse_with_scheme(trimmed, scheme, rest);
    }

    if let Some(parsed) = parse_scp_like(trimmed)? {
        return Ok(parsed);
    }

    Ok(ParsedUrl {
        raw: trimmed.to_string(),
        scheme: "file".to_string(),
        user: None,
        host: String::new(),
        port: None,
        path: trimmed.to_string(),
    })
}

fn parse_with_scheme(raw: &str, scheme: &str, rest: &str) -> Result<ParsedUrl, UrlError> {
    if !is_valid_scheme(scheme) {
        return Err(UrlError::InvalidScheme {
            scheme: scheme.to_string(),
        });
    }

    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let (user, host_port) = match authority.rsplit_once('@') {
        Some((user, host_port)) => (Some(user.to_string()), host_port),
        None => (None, authority),
    };

    let (host, port) = split_host_port(host_port)?;

    Ok(ParsedUrl {
        raw: raw.to_string(),
        scheme: scheme.to_ascii_lowercase(),
        user: user.filter(|u| !u.is_empty()),
        host,
        port,
        path: path.to_string(),
    })
}

/// `[user@]host:path`, only when the colon comes before any slash.
fn parse_scp_like(raw: &str) -> Result<Option<ParsedUrl>, UrlError> {
    let Some(colon) = raw.find(':') else {
        return Ok(None);
    };
    if raw[..colon].contains('/') || raw[..colon].contains('\\') {
        return Ok(None);
    }

    let (user, host) = match raw[..colon].rsplit_once('@') {
        Some((user, host)) => (Some(user.to_string()), host),
        None => (None, &raw[..colon]),
    };

    // `C:\repo` or `C:/repo` is a drive letter, not a host.
    if user.is_none() && host.len() == 1 && host.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(None);
    }
    if host.is_empty() || host.starts_with('-') || !host.chars().all(is_host_char) {
        return Err(UrlError::InvalidHost {
            host: host.to_string(),
        });
    }

    let rest = &raw[colon + 1..];
    let path = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{}", rest)
    };

    Ok(Some(ParsedUrl {
        raw: raw.to_string(),
        scheme: "ssh".to_string(),
        user: user.filter(|u| !u.is_empty()),
        host: host.to_ascii_lowercase(),
        port: None,
        path,
    }))
}

fn split_host_port(host_port: &str) -> Result<(String, Option<u16>), UrlError> {
    let (host, port) = if let Some(stripped) = host_port.strip_prefix('[') {
        let Some((inner, after)) = stripped.split_once(']') else {
            return Err(UrlError::InvalidHost {
                host: host_port.to_string(),
            });
        };
        let port = match after {
            "" => None,
            other => match other.strip_prefix(':') {
                Some(port) => Some(port),
                None => {
                    return Err(UrlError::InvalidHost {
                        host: host_port.to_string(),
                    })
                }
            },
        };
        (format!("[{}]", inner), port)
    } else {
        match host_port.split_once(':') {
            Some((host, port)) => (host.to_string(), Some(port)),
            None => (host_port.to_string(), None),
        }
    };

    // A leading dash would be read as an option by git or ssh.
    if host.starts_with('-') || (!host.starts_with('[') && !host.chars().all(is_host_char)) {
        return Err(UrlError::InvalidHost { host });
    }

    let port = match port {
        None | Some("") => None,
        Some(port) => Some(port.parse::<u16>().map_err(|_| UrlError::InvalidPort {
            port: port.to_string(),
        })?),
    };

    Ok((host.to_ascii_lowercase(), port))
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '~' | '%')
}
