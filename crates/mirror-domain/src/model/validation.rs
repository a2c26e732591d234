//! Validation - Field-level rejection messages for mirror creation
//!
//! Creation never fails with a bare string. Each reason is attached to the
//! field it concerns, so callers can render it next to the input.

/// The creation input a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Url,
    Identifier,
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Field::Url => write!(f, "url"),
            Field::Identifier => write!(f, "identifier"),
        }
    }
}

/// Why a creation request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    UrlBlank,
    /// Malformed URL syntax
    InvalidUrl,
    /// Parsed fine, but points at a local path
    NotRemote,
    RemoteUnreachable,
    /// Storage path allocation or `git init` failed
    InitFailed,
    IdentifierBlank,
    IdentifierInvalid,
    IdentifierTaken,
}

/// A single message attached to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub kind: RejectionKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }

    pub fn url(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self::new(Field::Url, kind, message)
    }

    pub fn identifier(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self::new(Field::Identifier, kind, message)
    }
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Every message collected while validating one creation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages attached to `field`, in the order they were added
    pub fn on(&self, field: Field) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has_kind(&self, kind: RejectionKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl core::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
