use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, HttpError> {
        let url = url.into();
        let parsed = Self::validate(&url)?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl {
                url: Self::truncate_url(&url),
                reason: "missing host".to_string(),
            })?
            .to_lowercase();

        Ok(Self {
            url: parsed.to_string(),
            host,
        })
    }

    /// Normalized form; used as the cache key.
    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn validate(url: &str) -> Result<Url, HttpError> {
        if url.trim().is_empty() {
            return Err(HttpError::InvalidUrl {
                url: url.to_string(),
                reason: "URL cannot be empty".to_string(),
            });
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("URL exceeds maximum length of {MAX_URL_LENGTH} bytes"),
            });
        }

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
            url: Self::truncate_url(url),
            reason: e.to_string(),
        })?;

        let scheme = parsed.scheme().to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: format!("invalid scheme '{scheme}', only 'http' and 'https' are allowed"),
            });
        }

        if parsed.host_str().is_none() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "URL must have a host".to_string(),
            });
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(HttpError::InvalidUrl {
                url: Self::truncate_url(url),
                reason: "credentials in URL are not allowed".to_string(),
            });
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let mut end = 100;
            while !url.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &url[..end])
        }
    }
}

/// `(offset, limit)` window requested from the reviews endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl PageRequest {
    #[must_use]
    pub const fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }
}

/// Transport failures as reported back by the shell.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum HttpError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("connection failed to {host}: {message}")]
    ConnectionError { host: String, message: String },

    #[error("timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl From<HttpError> for crate::AppError {
    fn from(e: HttpError) -> Self {
        let kind = match &e {
            HttpError::Timeout { .. } => crate::ErrorKind::Timeout,
            HttpError::InvalidUrl { .. } => crate::ErrorKind::Validation,
            HttpError::InvalidResponse { .. } => crate::ErrorKind::Deserialization,
            HttpError::ConnectionError { .. } | HttpError::HttpStatus { .. } => {
                crate::ErrorKind::Network
            }
        };
        crate::AppError::new(kind, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_url() {
        let url = ValidatedUrl::new("https://Images.Example.com/a.jpg").unwrap();
        assert_eq!(url.host(), "images.example.com");
        assert_eq!(url.as_str(), "https://images.example.com/a.jpg");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(ValidatedUrl::new("ftp://files.example.com/a.jpg").is_err());
        assert!(ValidatedUrl::new("javascript:alert(1)").is_err());
        assert!(ValidatedUrl::new("file:///etc/passwd").is_err());
    }

    #[test]
    fn rejects_empty_and_garbage() {
        assert!(matches!(
            ValidatedUrl::new("   "),
            Err(HttpError::InvalidUrl { .. })
        ));
        assert!(ValidatedUrl::new("not a url").is_err());
    }

    #[test]
    fn rejects_credentials() {
        assert!(ValidatedUrl::new("https://user:pw@example.com/a.jpg").is_err());
    }

    #[test]
    fn rejects_overlong_url() {
        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));
        assert!(ValidatedUrl::new(long).is_err());
    }

    #[test]
    fn error_kinds_follow_transport_failure() {
        let timeout: crate::AppError = HttpError::Timeout { timeout_ms: 10 }.into();
        assert_eq!(timeout.kind, crate::ErrorKind::Timeout);

        let status: crate::AppError = HttpError::HttpStatus {
            status: 503,
            message: String::new(),
        }
        .into();
        assert_eq!(status.kind, crate::ErrorKind::Network);
    }

    #[test]
    fn errors_cross_the_shell_boundary_as_json() {
        let err = HttpError::HttpStatus {
            status: 404,
            message: "missing".into(),
        };
        let raw = serde_json::to_string(&err).unwrap();
        assert_eq!(serde_json::from_str::<HttpError>(&raw).unwrap(), err);
    }
}
