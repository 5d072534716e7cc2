//! # Errors
//!
//! Campus uses one typed error for everything a request can fail with.
//! Each variant maps to an [`ErrorKind`], which carries the HTTP status,
//! the error `name` and a kebab-cased `className`. The transport crate
//! decides how to serialize it; [`CampusError::to_json`] gives the default
//! payload shape:
//!
//! ```json
//! { "name": "NotFound", "message": "...", "code": 404, "className": "not-found" }
//! ```

use serde_json::{json, Value};

/// A convenience result type for Campus APIs.
pub type CampusResult<T> = std::result::Result<T, CampusError>;

/// Error class names + status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,       // 400
    NotAuthenticated, // 401
    Forbidden,        // 403
    NotFound,         // 404
    Conflict,         // 409
    Unprocessable,    // 422
    GeneralError,     // 500
    BadGateway,       // 502
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Unprocessable => 422,
            ErrorKind::GeneralError => 500,
            ErrorKind::BadGateway => 502,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Unprocessable => "Unprocessable",
            ErrorKind::GeneralError => "GeneralError",
            ErrorKind::BadGateway => "BadGateway",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::GeneralError => "general-error",
            ErrorKind::BadGateway => "bad-gateway",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CampusError {
    // Auth
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    DuplicateEmail,
    #[error("Password must be at least {min_length} characters.")]
    WeakPassword { min_length: usize },
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    // Lookup
    #[error("Invalid school code. Please check and try again.")]
    InvalidCode,

    /// Insert/update rejected by the backend; the message is shown verbatim.
    #[error("{0}")]
    Write(String),

    /// Transport failure talking to the backend. Detail stays server-side.
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered a read with an error.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("{0}")]
    NotAuthenticated(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Unprocessable { message: String, errors: Value },

    /// The request itself could not be read (malformed body, bad path).
    #[error("{message}")]
    BadRequest { message: String, errors: Option<Value> },

    #[error("Configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Internal(String),
}

impl CampusError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CampusError::InvalidCredentials
            | CampusError::EmailNotConfirmed
            | CampusError::NotAuthenticated(_) => ErrorKind::NotAuthenticated,
            CampusError::DuplicateEmail | CampusError::Conflict(_) => ErrorKind::Conflict,
            CampusError::WeakPassword { .. } | CampusError::Unprocessable { .. } => {
                ErrorKind::Unprocessable
            }
            CampusError::InvalidCode | CampusError::NotFound(_) => ErrorKind::NotFound,
            CampusError::Write(_) | CampusError::BadRequest { .. } => ErrorKind::BadRequest,
            CampusError::Network(_) | CampusError::Backend(_) => ErrorKind::BadGateway,
            CampusError::Forbidden(_) => ErrorKind::Forbidden,
            CampusError::Config(_) | CampusError::Internal(_) => ErrorKind::GeneralError,
        }
    }

    pub fn code(&self) -> u16 {
        self.kind().status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind().class_name()
    }

    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::NotAuthenticated(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest {
            message: msg.into(),
            errors: None,
        }
    }

    pub fn with_errors(self, errors: Value) -> Self {
        match self {
            CampusError::BadRequest { message, .. } => CampusError::BadRequest {
                message,
                errors: Some(errors),
            },
            CampusError::Unprocessable { message, .. } => {
                CampusError::Unprocessable { message, errors }
            }
            other => other,
        }
    }

    /// A single-field validation failure.
    pub fn invalid_field(field: &str, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self::Unprocessable {
            message: msg.clone(),
            errors: json!({ field: [msg] }),
        }
    }

    /// The message a client is allowed to see. Transport and internal
    /// failures are flattened to a generic line.
    pub fn client_message(&self) -> String {
        match self {
            CampusError::Network(_) => {
                "Unable to reach the server. Please try again.".to_string()
            }
            CampusError::Config(_) | CampusError::Internal(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Client-facing JSON payload.
    pub fn to_json(&self) -> Value {
        let mut base = json!({
            "name": self.name(),
            "message": self.client_message(),
            "code": self.code(),
            "className": self.class_name(),
        });

        match self {
            CampusError::Unprocessable { errors, .. }
            | CampusError::BadRequest {
                errors: Some(errors),
                ..
            } => base["errors"] = errors.clone(),
            _ => {}
        }
        base
    }
}

impl From<serde_json::Error> for CampusError {
    fn from(e: serde_json::Error) -> Self {
        CampusError::Internal(format!("malformed record: {e}"))
    }
}
