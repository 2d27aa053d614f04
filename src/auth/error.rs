use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no active session")]
    NoActiveSession,
    #[error("session store is still initializing")]
    Initializing,
    #[error("new passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least {0} characters long")]
    PasswordTooShort(usize),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SessionError {
    pub fn status(&self) -> StatusCode {
        match self {
            SessionError::InvalidCredentials | SessionError::NoActiveSession => {
                StatusCode::UNAUTHORIZED
            }
            SessionError::Initializing => StatusCode::SERVICE_UNAVAILABLE,
            SessionError::PasswordMismatch
            | SessionError::PasswordTooShort(_)
            | SessionError::Invalid(_) => StatusCode::BAD_REQUEST,
            SessionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SessionError> for (StatusCode, String) {
    fn from(e: SessionError) -> Self {
        (e.status(), e.to_string())
    }
}
