use thiserror::Error;

/// Result type for Bravia operations
pub type Result<T> = std::result::Result<T, BraviaError>;

/// Errors that can occur when talking to a Bravia TV
#[derive(Error, Debug)]
pub enum BraviaError {
    /// HTTP transport error (connection refused, timeout, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TV answered with a non-success HTTP status
    #[error("HTTP status {status}: {body}")]
    HttpStatus {
        /// Status code returned by the TV
        status: u16,
        /// Response body, if any
        body: String,
    },

    /// TV rejected the credentials (PIN, PSK or cookie)
    #[error("Authentication failed (HTTP {status})")]
    Authentication {
        /// 401 or 403
        status: u16,
    },

    /// JSON-RPC body carried an `error` member
    #[error("API error {code}: {message}")]
    Api {
        /// Error code reported by the TV
        code: i64,
        /// Error message reported by the TV
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// XML writer/reader error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML document did not match the expected shape
    #[error("XML decode error: {0}")]
    XmlDecode(#[from] quick_xml::DeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unexpected response from the TV
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Remote command name is not in the TV's command table
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Source title is not in the source mapping
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// App name is not in the DIAL app list
    #[error("App not found: {0}")]
    AppNotFound(String),

    /// MAC address could not be parsed
    #[error("Invalid MAC address: {0}")]
    InvalidMac(String),

    /// Wake-on-LAN requested without a configured MAC address
    #[error("No MAC address configured")]
    MissingMac,

    /// Clock or timestamp string could not be parsed
    #[error("Invalid time: {0}")]
    InvalidTime(String),
}

impl BraviaError {
    /// Returns true if the request timed out before the TV answered.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BraviaError::Http(e) if e.is_timeout())
    }

    /// Returns true if the TV rejected the session credentials.
    pub fn is_auth(&self) -> bool {
        match self {
            BraviaError::Authentication { .. } => true,
            BraviaError::Api { code, .. } => *code == 401 || *code == 403,
            _ => false,
        }
    }
}
