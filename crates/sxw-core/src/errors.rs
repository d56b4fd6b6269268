/// Core error type for the storefront.
///
/// Adapter crates map their specific errors into this type so views and
/// handlers can decide consistently what the visitor sees.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("api error: HTTP {status}{}", detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default())]
    Api { status: u16, detail: Option<String> },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("view cancelled")]
    Cancelled,

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Server-supplied `detail` of a rejected API call, if any.
    pub fn api_detail(&self) -> Option<&str> {
        match self {
            Error::Api { detail, .. } => detail.as_deref().filter(|d| !d.trim().is_empty()),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_detail() {
        let e = Error::Api {
            status: 400,
            detail: Some("Invalid key".to_string()),
        };
        assert_eq!(e.to_string(), "api error: HTTP 400: Invalid key");
        assert_eq!(e.api_detail(), Some("Invalid key"));

        let bare = Error::Api {
            status: 502,
            detail: None,
        };
        assert_eq!(bare.to_string(), "api error: HTTP 502");
        assert_eq!(bare.api_detail(), None);
    }

    #[test]
    fn blank_detail_is_not_a_detail() {
        let e = Error::Api {
            status: 400,
            detail: Some("  ".to_string()),
        };
        assert_eq!(e.api_detail(), None);
    }
}
