use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WalkError {
    #[error("location provider error: {0}")]
    Provider(String),
    #[error("location permission denied")]
    PermissionDenied,
    #[error("timer error: {0}")]
    Timer(String),
    #[error("display error: {0}")]
    Display(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("walk actor is no longer running")]
    ActorGone,
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
