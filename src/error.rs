use thiserror::Error;

/// FileMaker OData client error types
#[derive(Error, Debug)]
pub enum FmODataError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication resolution failed: {0}")]
    AuthResolution(String),

    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),

    #[error("OData error: {status} - {message}")]
    OData {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for FileMaker OData operations
pub type FmODataResult<T> = Result<T, FmODataError>;

impl FmODataError {
    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an OData error from a status code, extracted message and raw body
    pub fn odata_error(status: u16, message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::OData {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// HTTP status associated with this error, when one is known
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::OData { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this error means the server rejected the credentials.
    ///
    /// The HTTP status decides when it is known; otherwise the rendered
    /// message is searched for "unauthorized", ignoring case.
    pub fn is_unauthorized(&self) -> bool {
        match self.status() {
            Some(status) => status == 401,
            None => self.to_string().to_lowercase().contains("unauthorized"),
        }
    }
}
