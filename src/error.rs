use crate::provider::ProviderKind;
use thiserror::Error;

/// Upper bound on raw upstream bodies kept inside errors.
pub(crate) const MAX_ERROR_BODY_BYTES: usize = 512;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "request.messages", "providers.tencent.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "request_validator", "config_loader")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level gateway error.
///
/// Closed set of categories so callers can branch on the variant instead of
/// matching on messages. Provider-level failures are never surfaced alone from
/// a dispatch; they arrive inside [`AggregateFailure`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("No AI providers are available")]
    NoProvidersAvailable,

    #[error("{0}")]
    AllProvidersFailed(AggregateFailure),

    #[error("Dispatch cancelled by caller")]
    Cancelled,

    #[error("Dispatch deadline exceeded")]
    DeadlineExceeded,

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }

    /// True when the caller's context ended the dispatch.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled | Error::DeadlineExceeded)
    }

    /// True for the "show a generic service unavailable message" categories.
    pub fn is_service_unavailable(&self) -> bool {
        matches!(
            self,
            Error::NoProvidersAvailable | Error::AllProvidersFailed(_)
        )
    }

    /// The per-provider failures, in call order, when every provider failed.
    pub fn provider_failures(&self) -> &[AdapterError] {
        match self {
            Error::AllProvidersFailed(aggregate) => aggregate.errors(),
            _ => &[],
        }
    }
}

/// A single failed provider attempt, always tagged with the provider that failed.
#[derive(Debug, Error)]
#[error("{provider}: {kind}")]
pub struct AdapterError {
    pub provider: ProviderKind,
    #[source]
    pub kind: AdapterErrorKind,
}

impl AdapterError {
    pub fn new(provider: ProviderKind, kind: AdapterErrorKind) -> Self {
        Self { provider, kind }
    }

    pub fn transport(provider: ProviderKind, err: crate::transport::TransportError) -> Self {
        Self::new(provider, AdapterErrorKind::Transport(err))
    }

    pub fn status(provider: ProviderKind, status: u16, body: &str) -> Self {
        Self::new(
            provider,
            AdapterErrorKind::Status {
                status,
                body: truncate_body(body),
            },
        )
    }

    pub fn decode(provider: ProviderKind, err: serde_json::Error, body: &str) -> Self {
        Self::new(
            provider,
            AdapterErrorKind::Decode {
                message: err.to_string(),
                body: truncate_body(body),
            },
        )
    }

    pub fn backend(provider: ProviderKind, code: Option<String>, message: impl Into<String>) -> Self {
        Self::new(
            provider,
            AdapterErrorKind::Backend {
                code,
                message: message.into(),
            },
        )
    }

    pub fn empty_choices(provider: ProviderKind) -> Self {
        Self::new(provider, AdapterErrorKind::EmptyChoices)
    }

    /// HTTP status of the failed attempt, when the upstream answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            AdapterErrorKind::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What went wrong inside one provider attempt.
#[derive(Debug, Error)]
pub enum AdapterErrorKind {
    #[error("transport failure: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {message} (body: {body})")]
    Decode { message: String, body: String },

    #[error("backend error{}: {message}", format_code(.code))]
    Backend {
        code: Option<String>,
        message: String,
    },

    #[error("response contained no choices")]
    EmptyChoices,

    #[error("request signing failed: {0}")]
    Signing(String),

    #[error("failed to encode request: {0}")]
    Encode(String),
}

fn format_code(code: &Option<String>) -> String {
    code.as_ref()
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default()
}

/// Every selectable provider was tried and every attempt failed.
///
/// Errors are kept in call order so the first entry is always the
/// highest-precedence provider.
#[derive(Debug)]
pub struct AggregateFailure {
    errors: Vec<AdapterError>,
}

impl AggregateFailure {
    pub fn new(errors: Vec<AdapterError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[AdapterError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<AdapterError> {
        self.errors
    }

    /// Providers in the order they were attempted.
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.errors.iter().map(|e| e.provider).collect()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl std::fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "All {} AI providers failed", self.errors.len())?;
        for (idx, err) in self.errors.iter().enumerate() {
            let sep = if idx == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, err)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateFailure {}

/// Truncate an upstream body for diagnostics without splitting a UTF-8 character.
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
