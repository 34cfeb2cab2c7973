use reqwest::StatusCode;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Backend returned status {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for showing to the user.
    ///
    /// Validation and backend messages are shown as-is; transport and local
    /// failures fall back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Api { message, .. } | AppError::Unauthorized(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_validation_passthrough() {
        let err = AppError::InvalidInput("Passwords do not match".to_string());
        assert_eq!(err.user_message("Signup failed"), "Passwords do not match");
    }

    #[test]
    fn test_user_message_api_error_uses_backend_message() {
        let err = AppError::Api {
            status: StatusCode::CONFLICT,
            message: "Username or email already exists".to_string(),
        };
        assert_eq!(
            err.user_message("Signup failed"),
            "Username or email already exists"
        );
    }

    #[test]
    fn test_user_message_api_error_without_message_falls_back() {
        let err = AppError::Api {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: String::new(),
        };
        assert_eq!(err.user_message("Signup failed"), "Signup failed");
    }

    #[test]
    fn test_user_message_internal_falls_back() {
        let err = AppError::Internal("boom".to_string());
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
    }

    #[test]
    fn test_user_message_unauthorized() {
        let err = AppError::Unauthorized("Invalid credentials".to_string());
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
        let err = AppError::Unauthorized(String::new());
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(AppError::Unauthorized("expired".to_string()).is_unauthorized());
        assert!(!AppError::NotFound("x".to_string()).is_unauthorized());
    }
}
