//! Custom error types for the client

use common::error::WorkflowError;
use common::validation::ValidationErrors;
use thiserror::Error;

/// Custom error type for client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// The backend rejected the bearer token (401)
    #[error("Unauthorized")]
    Unauthorized,

    /// The signed-in user may not perform the request (403)
    #[error("Forbidden")]
    Forbidden,

    /// The requested resource does not exist (404)
    #[error("Not found")]
    NotFound,

    /// Any other unsuccessful status
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not have the expected shape
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A form failed field-local validation
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// The moderation workflow refused the action
    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    /// A secure request was attempted without a signed-in user
    #[error("Not signed in")]
    NotSignedIn,

    /// The same control is already waiting on a request
    #[error("Another request for {0} is still in flight")]
    Busy(String),

    /// Booking was attempted outside the registration window
    #[error("Registration for session {0} is closed")]
    RegistrationClosed(String),

    /// Booking needs a payment gateway and none was configured
    #[error("No booking gateway is configured")]
    NoBookingGateway,

    /// The configured API URL cannot be used as a base for requests
    #[error("Invalid API URL {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The identity provider reported a failure
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// The image host reported a failure
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// A failure annotated with the operation that was attempted
    #[error("Failed to {operation}: {source}")]
    Operation {
        operation: &'static str,
        #[source]
        source: Box<ClientError>,
    },
}

impl ClientError {
    /// The underlying error, without operation annotations
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::Operation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the failure ended the user's session
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.root(), ClientError::Unauthorized | ClientError::NotSignedIn)
    }

    /// Short text for a dismissible notification
    pub fn notification(&self) -> String {
        match self {
            ClientError::Operation { operation, source } => match source.root() {
                ClientError::Status { message, .. } if !message.is_empty() => {
                    format!("Failed to {operation}: {message}")
                }
                ClientError::Validation(errors) => format!("Failed to {operation}: {errors}"),
                ClientError::Workflow(e) => format!("Failed to {operation}: {e}"),
                _ => format!("Failed to {operation}"),
            },
            other => other.to_string(),
        }
    }
}

/// Type alias for client results
pub type ClientResult<T> = Result<T, ClientError>;

/// Attach the attempted operation to an error
pub trait OperationExt<T> {
    fn during(self, operation: &'static str) -> ClientResult<T>;
}

impl<T, E> OperationExt<T> for Result<T, E>
where
    E: Into<ClientError>,
{
    fn during(self, operation: &'static str) -> ClientResult<T> {
        self.map_err(|e| ClientError::Operation {
            operation,
            source: Box::new(e.into()),
        })
    }
}
