// ABOUTME: Error types for the extraction pipeline including the ErrorCode enum and ExtractError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing the categories of extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    Ssrf,
    UnknownDomain,
    ContentMissing,
    Session,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Ssrf => "SSRF blocked",
            ErrorCode::UnknownDomain => "no scraper for domain",
            ErrorCode::ContentMissing => "article content not found",
            ErrorCode::Session => "page session error",
        };
        write!(f, "{}", s)
    }
}

/// The error type for extraction operations.
#[derive(Debug, thiserror::Error)]
pub struct ExtractError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kronika: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl ExtractError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create an SSRF error.
    pub fn ssrf(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Ssrf, url, op, source)
    }

    /// Create an UnknownDomain error.
    pub fn unknown_domain(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownDomain, url, op, None)
    }

    /// Create a ContentMissing error.
    pub fn content_missing(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::ContentMissing, url, op, None)
    }

    /// Create a Session error.
    pub fn session(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Session, url, op, source)
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is an SSRF error.
    pub fn is_ssrf(&self) -> bool {
        self.code == ErrorCode::Ssrf
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an UnknownDomain error.
    pub fn is_unknown_domain(&self) -> bool {
        self.code == ErrorCode::UnknownDomain
    }

    /// Returns true if this is a ContentMissing error.
    pub fn is_content_missing(&self) -> bool {
        self.code == ErrorCode::ContentMissing
    }

    /// Returns true if this is a Session error.
    pub fn is_session(&self) -> bool {
        self.code == ErrorCode::Session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_url_code_and_source() {
        let err = ExtractError::fetch(
            "https://galicjaexpress.pl/a",
            "Goto",
            Some(anyhow::anyhow!("HTTP status 503")),
        );
        assert_eq!(
            err.to_string(),
            "kronika: Goto https://galicjaexpress.pl/a: fetch error: HTTP status 503"
        );
        assert!(err.is_fetch());
        assert!(!err.is_timeout());
    }

    #[test]
    fn display_without_source() {
        let err = ExtractError::content_missing("https://example.com", "Extract");
        assert_eq!(
            err.to_string(),
            "kronika: Extract https://example.com: article content not found"
        );
        assert!(err.is_content_missing());
    }
}
