use std::{error::Error, fmt::Display, panic::Location};

use tokio::task::JoinError;

pub type HealthResult<T> = Result<T, HealthError>;

#[derive(Debug)]
pub enum HealthError {
    StaleValue(String, &'static Location<'static>),
    InvalidAck(String, &'static Location<'static>),
    Unreachable(Box<dyn Error + Send + Sync>, &'static Location<'static>),
    Unavailable(String, &'static Location<'static>),
    Tokio(JoinError, &'static Location<'static>),
    Internal(String, &'static Location<'static>),
}

impl HealthError {
    #[track_caller]
    pub fn stale_value(msg: impl Into<String>) -> Self {
        HealthError::StaleValue(msg.into(), Location::caller())
    }

    #[track_caller]
    pub fn invalid_ack(msg: impl Into<String>) -> Self {
        HealthError::InvalidAck(msg.into(), Location::caller())
    }

    #[track_caller]
    pub fn unreachable(err: Box<dyn Error + Send + Sync>) -> Self {
        HealthError::Unreachable(err, Location::caller())
    }

    #[track_caller]
    pub fn unavailable(msg: impl Into<String>) -> Self {
        HealthError::Unavailable(msg.into(), Location::caller())
    }

    #[track_caller]
    pub fn internal(msg: impl Into<String>) -> Self {
        HealthError::Internal(msg.into(), Location::caller())
    }
}

impl Display for HealthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthError::StaleValue(msg, _) => write!(f, "Stale value error: {}", msg),
            HealthError::InvalidAck(msg, _) => write!(f, "Invalid ack error: {}", msg),
            HealthError::Unreachable(err, _) => write!(f, "Peer unreachable: {}", err),
            HealthError::Unavailable(msg, _) => write!(f, "Unavailable: {}", msg),
            HealthError::Tokio(err, _) => write!(f, "Tokio error: {}", err),
            HealthError::Internal(msg, _) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl Error for HealthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HealthError::StaleValue(_, _) => None,
            HealthError::InvalidAck(_, _) => None,
            HealthError::Unreachable(err, _) => Some(err.as_ref()),
            HealthError::Unavailable(_, _) => None,
            HealthError::Tokio(err, _) => Some(err),
            HealthError::Internal(_, _) => None,
        }
    }
}

impl From<JoinError> for HealthError {
    #[track_caller]
    fn from(err: JoinError) -> Self {
        HealthError::Tokio(err, Location::caller())
    }
}
